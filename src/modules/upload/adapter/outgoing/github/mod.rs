mod content_store_github;

pub use content_store_github::GithubContentStore;
