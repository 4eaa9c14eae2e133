//! Form server request handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::adapters::upload_store::{IncomingFile, StoredUpload};
use crate::app::prepare_submission;
use crate::core::template::render_site;
use crate::core::{PublishedSite, SiteSubmission};
use crate::utils::error::{Result, SiteError};

/// 上傳表單中的檔案欄位名稱
const PHOTOS_FIELD: &str = "photos";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub configured: bool,
    pub owner: String,
    pub repo: String,
    pub pages_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<StoredUpload>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub published: bool,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct PropertiesResponse {
    pub success: bool,
    pub properties: Vec<PublishedSite>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub slug: String,
}

fn parse_submission(payload: std::result::Result<Json<SiteSubmission>, JsonRejection>) -> Result<SiteSubmission> {
    payload
        .map(|Json(submission)| submission)
        .map_err(|rejection| SiteError::validation(rejection.body_text(), Vec::new()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let hosting = &state.config.hosting;
    let configured = state.is_hosting_configured();

    Json(ConfigResponse {
        configured,
        owner: hosting.owner.clone(),
        repo: hosting.repo.clone(),
        pages_url: configured.then(|| hosting.pages_url()),
    })
}

/// POST /api/upload - multipart, field `photos`
///
/// The whole batch is checked before anything is written, so a rejected
/// request leaves no files behind.
pub async fn upload_photos(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut incoming = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTOS_FIELD) {
            continue;
        }
        // 超過數量立即拒絕，不再讀取剩餘內容
        state.uploads.check_count(incoming.len() + 1)?;

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        incoming.push(IncomingFile {
            original_name,
            content_type,
            data: data.to_vec(),
        });
    }

    if incoming.is_empty() {
        return Err(SiteError::upload("No photos were uploaded"));
    }

    let files = state.uploads.store_batch(incoming).await?;
    Ok(Json(UploadResponse { success: true, files }))
}

/// POST /api/generate
///
/// Publishes when hosting is configured, otherwise returns the rendered HTML.
pub async fn generate_site(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SiteSubmission>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let submission = parse_submission(payload)?;

    let response = match &state.sites {
        Some(sites) => {
            let site = sites.publish(&submission).await?;
            tracing::info!("✅ Published {} at {}", site.slug, site.url);
            GenerateResponse {
                success: true,
                published: true,
                slug: site.slug,
                url: Some(site.url),
                html: None,
            }
        }
        None => {
            let slug = prepare_submission(&submission)?;
            let html = render_site(&submission)?;
            tracing::info!("📝 Rendered {} without publishing", slug);
            GenerateResponse {
                success: true,
                published: false,
                slug,
                url: None,
                html: Some(html),
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/preview - every field optional, never persisted
pub async fn preview_site(
    payload: std::result::Result<Json<SiteSubmission>, JsonRejection>,
) -> Result<Json<PreviewResponse>> {
    let submission = parse_submission(payload)?.with_preview_defaults();
    let html = render_site(&submission)?;
    Ok(Json(PreviewResponse { success: true, html }))
}

/// GET /api/properties
pub async fn list_properties(State(state): State<Arc<AppState>>) -> Result<Json<PropertiesResponse>> {
    let properties = state.sites()?.list().await?;
    Ok(Json(PropertiesResponse {
        success: true,
        properties,
    }))
}

/// DELETE /api/properties/:slug
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.sites()?.delete(&slug).await?;
    tracing::info!("✅ Deleted site {} ({} file(s))", slug, deleted);
    Ok(Json(DeleteResponse { success: true, slug }))
}
