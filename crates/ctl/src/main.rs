use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use control_plane_core::api::{
    ErrorBody, JobAccepted, JobCreateRequest, JobView, SessionCreateRequest, SessionCreated,
    SessionView,
};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "controlplanectl")]
struct Args {
    /// Base URL of the control plane daemon.
    #[arg(long, env = "CONTROL_PLANE_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Bearer token, if the daemon was started with one.
    #[arg(long, env = "CONTROL_PLANE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    SubmitJob {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        agent: String,
        #[arg(long)]
        policy: String,
        #[arg(long)]
        language: String,
        /// Inline source code.
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,
        /// Read source code from a file.
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    CreateSession {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        agent: String,
        #[arg(long)]
        policy: String,
        #[arg(long)]
        ttl_seconds: i64,
        #[arg(long)]
        id: Option<String>,
    },
    GetJob {
        #[arg(long)]
        id: String,
    },
    GetSession {
        #[arg(long)]
        id: String,
    },
}

struct Client {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl Client {
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base.trim_end_matches('/'), path);
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

/// Decode a success body, or turn the daemon's error body into an error.
async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<T> {
    let status = resp.status();
    if status.is_success() {
        return resp.json().await.context("decode response");
    }
    let bytes = resp.bytes().await.context("read error body")?;
    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(body) => match body.field {
            Some(field) => bail!("{status}: {} ({field})", body.message),
            None => bail!("{status}: {}", body.message),
        },
        Err(_) => bail!("{status}: {}", String::from_utf8_lossy(&bytes)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client {
        http: reqwest::Client::new(),
        base: args.url,
        token: args.token,
    };

    match args.cmd {
        Cmd::SubmitJob {
            tenant,
            agent,
            policy,
            language,
            code,
            file,
            id,
        } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(file)) => tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("read {file}"))?,
                (None, None) => bail!("one of --code or --file is required"),
            };
            let req = JobCreateRequest {
                id,
                tenant_id: Some(tenant),
                agent_id: Some(agent),
                policy_id: Some(policy),
                language: Some(language),
                code: Some(code),
            };
            let resp = client
                .request(reqwest::Method::POST, "/jobs")
                .json(&req)
                .send()
                .await?;
            let accepted: JobAccepted = read(resp).await?;
            println!("{}", serde_json::to_string_pretty(&accepted)?);
        }
        Cmd::CreateSession {
            tenant,
            agent,
            policy,
            ttl_seconds,
            id,
        } => {
            let req = SessionCreateRequest {
                id,
                tenant_id: Some(tenant),
                agent_id: Some(agent),
                policy_id: Some(policy),
                ttl_seconds: Some(ttl_seconds),
            };
            let resp = client
                .request(reqwest::Method::POST, "/sessions")
                .json(&req)
                .send()
                .await?;
            let created: SessionCreated = read(resp).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Cmd::GetJob { id } => {
            let resp = client
                .request(reqwest::Method::GET, &format!("/jobs/{id}"))
                .send()
                .await?;
            let job: JobView = read(resp).await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        Cmd::GetSession { id } => {
            let resp = client
                .request(reqwest::Method::GET, &format!("/sessions/{id}"))
                .send()
                .await?;
            let session: SessionView = read(resp).await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single request with `raw`, then hangs up.
    async fn serve_once(raw: &'static str) -> Client {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            sock.write_all(raw.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        });
        Client {
            http: reqwest::Client::new(),
            base: format!("http://{addr}"),
            token: None,
        }
    }

    #[tokio::test]
    async fn error_body_becomes_error_message() {
        let client = serve_once(concat!(
            "HTTP/1.1 400 Bad Request\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 75\r\n",
            "Connection: close\r\n\r\n",
            r#"{"error":"invalid_input","message":"agentId is required","field":"agentId"}"#,
        ))
        .await;
        let resp = client
            .request(reqwest::Method::GET, "/jobs/x")
            .send()
            .await
            .unwrap();
        let err = read::<JobView>(resp).await.unwrap_err();
        assert_eq!(err.to_string(), "400 Bad Request: agentId is required (agentId)");
    }

    #[tokio::test]
    async fn truncated_error_body_is_reported() {
        let client = serve_once(concat!(
            "HTTP/1.1 500 Internal Server Error\r\n",
            "Content-Length: 100\r\n",
            "Connection: close\r\n\r\n",
            "partial",
        ))
        .await;
        let resp = client
            .request(reqwest::Method::GET, "/jobs/x")
            .send()
            .await
            .unwrap();
        let err = read::<JobView>(resp).await.unwrap_err();
        assert_eq!(err.to_string(), "read error body");
    }
}
