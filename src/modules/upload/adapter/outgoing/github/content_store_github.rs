use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::upload::application::ports::outgoing::content_store::{
    CommitFile, ContentStore, ContentStoreError, StoredFile,
};

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Every commit is attributed to the service itself, never to the caller.
const COMMITTER_NAME: &str = "Monitoring Prakerin App";
const COMMITTER_EMAIL: &str = "noreply@prakerin.app";

/// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = "Prakerin-Monitoring-App/1.0";

fn contents_url(owner: &str, repo: &str, path: &str) -> String {
    format!("{GITHUB_API_BASE}/repos/{owner}/{repo}/contents/{path}")
}

/// Internal seam so the response/error interpretation is testable without
/// standing up an HTTP server. Tests implement this with a fake transport.
#[async_trait]
trait ContentsApi: Send + Sync {
    /// Performs the PUT and returns the upstream status plus raw body text.
    /// Transport failures (no status available) come back as `Err`.
    async fn put_contents(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<(u16, String), String>;
}

/// Production adapter: implements the ContentStore port against the GitHub
/// "create or update file contents" endpoint.
pub struct GithubContentStore {
    api: Box<dyn ContentsApi>,
    token: String,
    owner: String,
    repo: String,
}

impl GithubContentStore {
    pub fn new(owner: String, repo: String, token: String) -> Self {
        Self {
            api: Box::new(ReqwestContentsApi {
                http: reqwest::Client::new(),
            }),
            token,
            owner,
            repo,
        }
    }

    #[cfg(test)]
    fn with_api(api: Box<dyn ContentsApi>, owner: &str, repo: &str, token: &str) -> Self {
        Self {
            api,
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }
}

#[async_trait]
impl ContentStore for GithubContentStore {
    async fn put_file(&self, file: CommitFile<'_>) -> Result<StoredFile, ContentStoreError> {
        let url = contents_url(&self.owner, &self.repo, file.path);
        let body = json!({
            "message": file.message,
            "content": file.content_base64,
            "branch": file.branch,
            "committer": {
                "name": COMMITTER_NAME,
                "email": COMMITTER_EMAIL,
            },
        });

        let (status, text) = self
            .api
            .put_contents(&url, &self.token, body)
            .await
            .map_err(ContentStoreError::Network)?;

        if (200..300).contains(&status) {
            Ok(parse_stored_file(&text))
        } else {
            Err(ContentStoreError::Status {
                status,
                message: upstream_message(&text),
            })
        }
    }
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: Option<ContentInfo>,
}

#[derive(Deserialize)]
struct ContentInfo {
    html_url: Option<String>,
    download_url: Option<String>,
}

/// A success body we cannot parse still counts as a successful write; the
/// caller derives its URLs from configuration anyway.
fn parse_stored_file(body: &str) -> StoredFile {
    let parsed: Option<ContentsResponse> = serde_json::from_str(body).ok();

    match parsed.and_then(|r| r.content) {
        Some(content) => StoredFile {
            html_url: content.html_url,
            download_url: content.download_url,
        },
        None => StoredFile::default(),
    }
}

#[derive(Deserialize)]
struct GithubErrorBody {
    message: Option<String>,
}

/// GitHub error bodies carry a top-level `message`; fall back to the raw
/// body text when the shape is unexpected.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<GithubErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string())
}

// ============================================================================
// Reqwest transport
// ============================================================================

struct ReqwestContentsApi {
    http: reqwest::Client,
}

#[async_trait]
impl ContentsApi for ReqwestContentsApi {
    async fn put_contents(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<(u16, String), String> {
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| e.to_string())?;

        Ok((status, text))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeContentsApi {
        last_call: Mutex<Option<(String, String, serde_json::Value)>>,
        result: Mutex<Result<(u16, String), String>>,
    }

    impl FakeContentsApi {
        fn returning(result: Result<(u16, String), String>) -> Arc<Self> {
            Arc::new(Self {
                last_call: Mutex::new(None),
                result: Mutex::new(result),
            })
        }
    }

    #[async_trait]
    impl ContentsApi for FakeContentsApi {
        async fn put_contents(
            &self,
            url: &str,
            token: &str,
            body: serde_json::Value,
        ) -> Result<(u16, String), String> {
            *self.last_call.lock().unwrap() = Some((url.to_string(), token.to_string(), body));
            self.result.lock().unwrap().clone()
        }
    }

    struct ArcContentsApi(Arc<FakeContentsApi>);

    #[async_trait]
    impl ContentsApi for ArcContentsApi {
        async fn put_contents(
            &self,
            url: &str,
            token: &str,
            body: serde_json::Value,
        ) -> Result<(u16, String), String> {
            self.0.put_contents(url, token, body).await
        }
    }

    fn store_with(fake: Arc<FakeContentsApi>) -> GithubContentStore {
        GithubContentStore::with_api(Box::new(ArcContentsApi(fake)), "o", "r", "ghp_test")
    }

    fn sample_commit<'a>() -> CommitFile<'a> {
        CommitFile {
            path: "uploads/x.jpg",
            content_base64: "QUJD",
            branch: "main",
            message: "Upload dokumentasi - 2026-08-29",
        }
    }

    #[tokio::test]
    async fn test_put_file_targets_contents_endpoint_with_token() {
        let fake = FakeContentsApi::returning(Ok((201, "{}".to_string())));
        let store = store_with(fake.clone());

        store.put_file(sample_commit()).await.unwrap();

        let (url, token, body) = fake.last_call.lock().unwrap().clone().unwrap();
        assert_eq!(url, "https://api.github.com/repos/o/r/contents/uploads/x.jpg");
        assert_eq!(token, "ghp_test");
        assert_eq!(body["message"], "Upload dokumentasi - 2026-08-29");
        assert_eq!(body["content"], "QUJD");
        assert_eq!(body["branch"], "main");
        assert_eq!(body["committer"]["name"], "Monitoring Prakerin App");
        assert_eq!(body["committer"]["email"], "noreply@prakerin.app");
    }

    #[tokio::test]
    async fn test_put_file_parses_content_urls() {
        let body = r#"{
            "content": {
                "html_url": "https://github.com/o/r/blob/main/uploads/x.jpg",
                "download_url": "https://raw.githubusercontent.com/o/r/main/uploads/x.jpg"
            }
        }"#;
        let fake = FakeContentsApi::returning(Ok((201, body.to_string())));
        let store = store_with(fake);

        let stored = store.put_file(sample_commit()).await.unwrap();
        assert_eq!(
            stored.html_url.as_deref(),
            Some("https://github.com/o/r/blob/main/uploads/x.jpg")
        );
        assert_eq!(
            stored.download_url.as_deref(),
            Some("https://raw.githubusercontent.com/o/r/main/uploads/x.jpg")
        );
    }

    #[tokio::test]
    async fn test_put_file_tolerates_unparseable_success_body() {
        let fake = FakeContentsApi::returning(Ok((200, "not json at all".to_string())));
        let store = store_with(fake);

        let stored = store.put_file(sample_commit()).await.unwrap();
        assert_eq!(stored, StoredFile::default());
    }

    #[tokio::test]
    async fn test_put_file_maps_error_status_with_github_message() {
        let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com"}"#;
        let fake = FakeContentsApi::returning(Ok((401, body.to_string())));
        let store = store_with(fake);

        let err = store.put_file(sample_commit()).await.unwrap_err();
        assert_eq!(
            err,
            ContentStoreError::Status {
                status: 401,
                message: "Bad credentials".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_put_file_keeps_raw_body_when_error_shape_unexpected() {
        let fake = FakeContentsApi::returning(Ok((503, "  service unavailable  ".to_string())));
        let store = store_with(fake);

        let err = store.put_file(sample_commit()).await.unwrap_err();
        assert_eq!(
            err,
            ContentStoreError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_put_file_maps_transport_failure_to_network_error() {
        let fake = FakeContentsApi::returning(Err("dns error".to_string()));
        let store = store_with(fake);

        let err = store.put_file(sample_commit()).await.unwrap_err();
        assert_eq!(err, ContentStoreError::Network("dns error".to_string()));
    }
}
