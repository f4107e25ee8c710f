use std::net::SocketAddr;

use anyhow::{bail, Result};

#[derive(Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,

    /// Bearer token required on `/jobs` and `/sessions`. `None` disables the gate.
    pub auth_token: Option<String>,

    pub sweep_interval_seconds: u64,
    pub max_body_bytes: usize,
    pub cors_permissive: bool,
}

impl DaemonConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(token) = &self.auth_token {
            if token.trim().is_empty() {
                bail!("auth token must not be blank; omit it to disable authentication");
            }
            // Presented tokens are trimmed, so a padded one could never match.
            if token.trim() != token.as_str() {
                bail!("auth token must not have leading or trailing whitespace");
            }
        }
        if self.sweep_interval_seconds == 0 {
            bail!("sweep interval must be at least one second");
        }
        if self.max_body_bytes == 0 {
            bail!("max body bytes must be greater than zero");
        }
        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            auth_token: None,
            sweep_interval_seconds: 30,
            max_body_bytes: 1024 * 1024,
            cors_permissive: false,
        }
    }
}

// Keep the token out of startup logs.
impl std::fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("listen", &self.listen)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("sweep_interval_seconds", &self.sweep_interval_seconds)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("cors_permissive", &self.cors_permissive)
            .finish()
    }
}
