pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::adapters::github::GitHubClient;
use crate::adapters::upload_store::{LocalUploadStore, UploadLimits};
use crate::app::SiteService;
use crate::config::AppConfig;
use crate::core::HostingApi;
use crate::utils::error::{Result, SiteError};

/// multipart 邊界與表單欄位的額外空間
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// 處理器共用的狀態；主機用戶端在啟動時建立一次
pub struct AppState {
    pub config: AppConfig,
    pub uploads: LocalUploadStore,
    pub sites: Option<SiteService>,
}

impl AppState {
    pub fn new(config: AppConfig, hosting: Option<Arc<dyn HostingApi>>) -> Self {
        let uploads = LocalUploadStore::new(&config.uploads.dir, UploadLimits::from(&config.uploads));
        let sites = hosting.map(|api| SiteService::new(api, &config.hosting, uploads.clone()));

        Self {
            config,
            uploads,
            sites,
        }
    }

    /// 依設定建立 GitHub 用戶端並準備上傳目錄
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let hosting = GitHubClient::from_config(&config.hosting)?.map(|client| Arc::new(client) as Arc<dyn HostingApi>);

        match &hosting {
            Some(_) => tracing::info!(
                "🔗 Publishing to {}/{} on branch {}",
                config.hosting.owner,
                config.hosting.repo,
                config.hosting.branch
            ),
            None => tracing::warn!("⚠️ Hosting not configured; sites will be rendered but not published"),
        }

        let state = Self::new(config, hosting);
        state.uploads.ensure_root().await?;
        Ok(state)
    }

    pub fn is_hosting_configured(&self) -> bool {
        self.sites.is_some()
    }

    pub fn sites(&self) -> Result<&SiteService> {
        self.sites.as_ref().ok_or(SiteError::HostingNotConfigured)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let limits = state.uploads.limits();
    let body_limit = limits.max_files * limits.max_file_size + BODY_LIMIT_SLACK;

    let mut app = Router::new()
        .route("/api/config", get(handlers::get_config))
        .route("/api/upload", post(handlers::upload_photos))
        .route("/api/generate", post(handlers::generate_site))
        .route("/api/preview", post(handlers::preview_site))
        .route("/api/properties", get(handlers::list_properties))
        .route("/api/properties/:slug", delete(handlers::delete_property))
        .route("/health", get(handlers::health))
        .nest_service("/uploads", ServeDir::new(state.uploads.root()));

    if let Some(dir) = &state.config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
