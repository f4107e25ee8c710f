use ulid::Ulid;

/// Generates a new opaque identifier (ULID string).
pub fn new_id() -> String {
    Ulid::new().to_string()
}
