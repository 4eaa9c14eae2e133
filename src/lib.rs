pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GitHubClient, LocalUploadStore};
pub use api::{router, AppState};
pub use app::SiteService;
pub use config::{AppConfig, CliArgs};
pub use utils::error::{Result, SiteError};
