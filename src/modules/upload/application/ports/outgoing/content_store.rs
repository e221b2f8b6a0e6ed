use async_trait::async_trait;

// ============================================================================
// Domain Types
// ============================================================================

/// One file write against the remote content store: create or update the
/// file at `path` on `branch` with the given base64 content, committed with
/// `message`. The committer identity is fixed inside the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFile<'a> {
    pub path: &'a str,
    pub content_base64: &'a str,
    pub branch: &'a str,
    pub message: &'a str,
}

/// Metadata reported by the store for the written file.
///
/// Both URLs are advisory. In particular `download_url` is known to be
/// inconsistent across providers and mirrors, so callers derive the raw
/// fetch URL themselves instead of trusting this field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredFile {
    pub html_url: Option<String>,
    pub download_url: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when writing to the remote content store.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ContentStoreError {
    /// The store answered with an HTTP-like status outside the 2xx range.
    #[error("Remote store rejected the write ({status}): {message}")]
    Status { status: u16, message: String },

    /// The request never produced a status (DNS, TLS, timeout, ...).
    #[error("Network problem occurred: {0}")]
    Network(String),
}

// ============================================================================
// Port Interface
// ============================================================================

/// Port for persisting a single file in a remote Git-hosted repository.
///
/// Implementations perform exactly one write attempt per call and surface
/// failures to the caller; nothing is retried here.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put_file(&self, file: CommitFile<'_>) -> Result<StoredFile, ContentStoreError>;
}
