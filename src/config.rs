// src/config.rs
use std::env;

/// Process-wide upload configuration, read once at startup and injected
/// into the app state. Every request sees the same immutable values.
///
/// The token is deliberately an `Option`: its absence must not prevent the
/// server from starting. Requests made without a configured token are
/// answered with a configuration error before any remote call is attempted.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub github_token: Option<String>,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub folder: String,
    /// When true, upstream error detail is echoed back to the client.
    /// Enabled only for `RUST_ENV=development`.
    pub expose_details: bool,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variable lookup is injected so tests never have to mutate the
    /// process-global environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let github_token = lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty());

        Self {
            github_token,
            owner: lookup("GITHUB_USERNAME").unwrap_or_else(|| "rizvenhabibi".to_string()),
            repo: lookup("GITHUB_REPO").unwrap_or_else(|| "pantaupembimbing".to_string()),
            branch: lookup("GITHUB_BRANCH").unwrap_or_else(|| "main".to_string()),
            folder: lookup("GITHUB_FOLDER").unwrap_or_else(|| "uploads".to_string()),
            expose_details: lookup("RUST_ENV").as_deref() == Some("development"),
        }
    }
}
