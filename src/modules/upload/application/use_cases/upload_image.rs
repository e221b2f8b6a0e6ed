use std::sync::Arc;

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::UploadConfig;
use crate::upload::application::ports::outgoing::content_store::{
    CommitFile, ContentStore, ContentStoreError,
};

const DATA_URL_PREFIX: &str = "data:image/";

/// Client-side encoders are inconsistent about trailing `=` padding, so the
/// validity check accepts both padded and unpadded payloads.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const FILENAME_SUFFIX_LEN: usize = 9;
const FILENAME_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCommand {
    pub image: String,
    pub filename: Option<String>,
}

/// Result of a completed upload, returned to the caller verbatim.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Raw-content URL, always derived from configuration. The store's own
    /// `download_url` is not trusted because it is inconsistent upstream.
    pub url: String,
    /// Browsable URL within the repository. Taken from the store's response
    /// when present, otherwise derived.
    pub github_url: String,
    pub view_url: String,
    pub filename: String,
    pub path: String,
    /// Approximate decoded byte size, computed from the encoded length.
    pub size: u64,
    pub upload_date: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No image data provided")]
    MissingImage,

    #[error("Invalid base64 image data")]
    InvalidPayload,

    #[error("Server configuration error: GitHub token not configured")]
    TokenNotConfigured,

    /// The store rejected the write with an HTTP-like status. `message` is
    /// the caller-facing translation; `details` keeps the raw upstream error
    /// for non-production diagnostics.
    #[error("{message}")]
    StoreRejected {
        status: u16,
        message: String,
        details: String,
    },

    /// The write never reached the store (no status available).
    #[error("{message}")]
    StoreUnreachable { message: String, details: String },
}

/// Accepts one base64-encoded image, commits it to the configured
/// repository and branch, and derives the public URLs for the stored file.
///
/// Stateless across requests: configuration is immutable and the store is
/// shared read-only, so concurrent executions need no coordination.
#[derive(Clone)]
pub struct UploadImageUseCase {
    config: UploadConfig,
    store: Arc<dyn ContentStore>,
}

impl UploadImageUseCase {
    pub fn new(config: UploadConfig, store: Arc<dyn ContentStore>) -> Self {
        Self { config, store }
    }

    pub async fn execute(&self, command: UploadCommand) -> Result<UploadReceipt, UploadError> {
        if command.image.is_empty() {
            return Err(UploadError::MissingImage);
        }

        let payload = strip_data_url_prefix(&command.image);
        if BASE64.decode(payload).is_err() {
            return Err(UploadError::InvalidPayload);
        }

        // Must be checked before the remote call: a misconfigured server
        // answers without ever touching the store.
        if self.config.github_token.is_none() {
            error!("GITHUB_TOKEN is not set in environment variables");
            return Err(UploadError::TokenNotConfigured);
        }

        // An empty or blank filename counts as absent, same as a missing
        // field; committing to "<folder>/" would be a broken path.
        let filename = command
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(synthesize_filename);
        let path = format!("{}/{}", self.config.folder, filename);

        info!(
            owner = %self.config.owner,
            repo = %self.config.repo,
            path = %path,
            "Uploading image"
        );

        let message = format!("Upload dokumentasi - {}", Utc::now().format("%Y-%m-%d"));
        let stored = self
            .store
            .put_file(CommitFile {
                path: &path,
                content_base64: payload,
                branch: &self.config.branch,
                message: &message,
            })
            .await
            .map_err(map_store_error)?;

        let url = format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.config.owner, self.config.repo, self.config.branch, path
        );
        // The store's own download_url is inconsistent across providers, so
        // it is advisory only; note the mismatch but never report it.
        if let Some(advisory) = &stored.download_url {
            if advisory != &url {
                debug!(advisory = %advisory, "Ignoring upstream download_url; deriving raw URL");
            }
        }

        let view_url = format!(
            "https://github.com/{}/{}/blob/{}/{}",
            self.config.owner, self.config.repo, self.config.branch, path
        );
        let github_url = stored.html_url.unwrap_or_else(|| view_url.clone());

        info!(url = %url, "Upload successful");

        Ok(UploadReceipt {
            url,
            github_url,
            view_url,
            filename,
            path,
            size: approximate_decoded_size(payload),
            upload_date: Utc::now().to_rfc3339(),
        })
    }
}

/// Client-side encoders often prepend `data:image/<subtype>;base64,`; the
/// store only wants the payload after the first comma.
fn strip_data_url_prefix(image: &str) -> &str {
    if image.starts_with(DATA_URL_PREFIX) {
        match image.split_once(',') {
            Some((_, payload)) => payload,
            None => image,
        }
    } else {
        image
    }
}

/// `img_<unix-millis>_<9 random base36 chars>.jpg`
fn synthesize_filename() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FILENAME_SUFFIX_LEN)
        .map(|_| FILENAME_SUFFIX_CHARS[rng.gen_range(0..FILENAME_SUFFIX_CHARS.len())] as char)
        .collect();

    format!("img_{}_{}.jpg", Utc::now().timestamp_millis(), suffix)
}

/// `ceil(encoded_len * 3 / 4)` — close enough for reporting, and avoids
/// decoding the payload a second time.
fn approximate_decoded_size(payload: &str) -> u64 {
    (payload.len() as u64 * 3).div_ceil(4)
}

fn map_store_error(err: ContentStoreError) -> UploadError {
    let details = err.to_string();

    match err {
        ContentStoreError::Status { status, message } => {
            let message = match status {
                401 => "GitHub token invalid or expired".to_string(),
                403 => "Access denied. Check repository permissions".to_string(),
                404 => "Repository not found".to_string(),
                422 => "File already exists or invalid path".to_string(),
                _ if !message.is_empty() => message,
                _ => format!("GitHub API error: {status}"),
            };
            UploadError::StoreRejected {
                status,
                message,
                details,
            }
        }
        ContentStoreError::Network(message) => {
            let message = if message.is_empty() {
                "Upload failed".to_string()
            } else {
                message
            };
            UploadError::StoreUnreachable { message, details }
        }
    }
}
