// Adapters layer: concrete implementations for external systems (hosting API, local upload storage).

pub mod github;
pub mod upload_store;

pub use github::GitHubClient;
pub use upload_store::LocalUploadStore;
