use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::utils::error::{ErrorCategory, ErrorSeverity, SiteError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_fields: Option<&'a [String]>,
}

impl SiteError {
    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Upload => StatusCode::BAD_REQUEST,
            ErrorCategory::Configuration => match self {
                SiteError::HostingNotConfigured => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ErrorCategory::Hosting if self.is_not_found() => StatusCode::NOT_FOUND,
            ErrorCategory::Hosting => StatusCode::BAD_GATEWAY,
            ErrorCategory::Rendering | ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.severity() >= ErrorSeverity::High {
            tracing::error!("❌ Request failed: {} (Category: {:?})", self, self.category());
        } else {
            tracing::warn!("⚠️ Request rejected: {} (Category: {:?})", self, self.category());
        }

        let error = match self.category() {
            ErrorCategory::System | ErrorCategory::Rendering => "Internal server error".to_string(),
            _ => self.user_friendly_message(),
        };
        let missing_fields = matches!(self, SiteError::ValidationError { .. }).then(|| self.missing_fields());

        let body = ErrorBody {
            success: false,
            error,
            missing_fields,
        };
        (status, Json(body)).into_response()
    }
}
