use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Multipart error: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{message}")]
    ValidationError {
        message: String,
        missing_fields: Vec<String>,
    },

    #[error("Upload rejected: {message}")]
    UploadError { message: String },

    #[error("Hosting is not configured")]
    HostingNotConfigured,

    #[error("Hosting API {operation} failed ({status}): {message}")]
    HostingApiError {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Invalid hosting API response for {operation}: {message}")]
    HostingResponseError { operation: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Upload,
    Hosting,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn validation(message: impl Into<String>, missing_fields: Vec<String>) -> Self {
        SiteError::ValidationError {
            message: message.into(),
            missing_fields,
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        SiteError::UploadError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::InvalidConfigValueError { .. }
            | SiteError::ConfigValidationError { .. }
            | SiteError::HostingNotConfigured => ErrorCategory::Configuration,
            SiteError::ValidationError { .. } => ErrorCategory::Validation,
            SiteError::UploadError { .. } | SiteError::MultipartError(_) => ErrorCategory::Upload,
            SiteError::HttpError(_)
            | SiteError::HostingApiError { .. }
            | SiteError::HostingResponseError { .. } => ErrorCategory::Hosting,
            SiteError::TemplateError(_) => ErrorCategory::Rendering,
            SiteError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if matches!(self, SiteError::HostingNotConfigured) {
            return ErrorSeverity::Low;
        }
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Upload => ErrorSeverity::Low,
            ErrorCategory::Hosting => ErrorSeverity::Medium,
            ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 主機 API 回傳 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, SiteError::HostingApiError { status: 404, .. })
    }

    pub fn missing_fields(&self) -> &[String] {
        match self {
            SiteError::ValidationError { missing_fields, .. } => missing_fields,
            _ => &[],
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SiteError::ValidationError { .. } => "Fill in every required field and submit again",
            SiteError::UploadError { .. } | SiteError::MultipartError(_) => {
                "Upload at most 20 JPEG, PNG, GIF or WebP images of 10 MB or less each"
            }
            SiteError::HostingNotConfigured => {
                "Set GITHUB_TOKEN, GITHUB_OWNER and GITHUB_REPO to enable publishing"
            }
            SiteError::HostingApiError { status: 401, .. }
            | SiteError::HostingApiError { status: 403, .. } => {
                "Check that the hosting token is valid and has write access to the repository"
            }
            SiteError::HostingApiError { status: 404, .. } => {
                "Check the repository, branch and site slug exist"
            }
            SiteError::HostingApiError { .. }
            | SiteError::HostingResponseError { .. }
            | SiteError::HttpError(_) => "Try publishing again in a moment",
            SiteError::InvalidConfigValueError { .. }
            | SiteError::ConfigValidationError { .. } => {
                "Review the configuration file and command-line flags"
            }
            SiteError::TemplateError(_) => "Report this rendering failure together with the submitted form",
            SiteError::IoError(_) => "Check disk space and permissions of the upload directory",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ValidationError { missing_fields, .. } if !missing_fields.is_empty() => {
                format!("Missing required fields: {}", missing_fields.join(", "))
            }
            SiteError::HostingApiError { message, .. } => format!("Publishing failed: {}", message),
            SiteError::HttpError(_) => "Could not reach the hosting service".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
