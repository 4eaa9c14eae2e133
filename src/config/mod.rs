pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use cli::CliArgs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub hosting: HostingConfig,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// 表單前端的靜態檔案目錄（選用）
    pub static_dir: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub pages_url: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: String,
    pub max_files: usize,
    pub max_file_size_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: String::new(),
            repo: String::new(),
            branch: "gh-pages".to_string(),
            pages_url: None,
            api_base_url: "https://api.github.com".to_string(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: "./uploads".to_string(),
            max_files: 20,
            max_file_size_mb: 10,
        }
    }
}

// token 不可出現在日誌中
impl fmt::Debug for HostingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostingConfig")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("pages_url", &self.pages_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn is_set(value: &str) -> bool {
    // 未解析的 ${VAR} 視為未設定
    !value.trim().is_empty() && !value.starts_with("${")
}

impl HostingConfig {
    /// token、owner、repo 皆有值才算設定完成
    pub fn is_configured(&self) -> bool {
        self.token.as_deref().is_some_and(is_set) && is_set(&self.owner) && is_set(&self.repo)
    }

    /// 未指定時依 GitHub Pages 慣例推導
    pub fn pages_url(&self) -> String {
        match self.pages_url.as_deref().filter(|url| is_set(url)) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.github.io/{}", self.owner, self.repo),
        }
    }
}

impl UploadSettings {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl AppConfig {
    /// 載入設定檔（若有）並套用命令列覆寫
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        args.apply_to(&mut config);
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        if let Some(dir) = &self.server.static_dir {
            validate_path("server.static_dir", dir)?;
        }

        validate_path("uploads.dir", &self.uploads.dir)?;
        validate_range("uploads.max_files", self.uploads.max_files, 1, 100)?;
        validate_range("uploads.max_file_size_mb", self.uploads.max_file_size_mb, 1, 100)?;

        validate_url("hosting.api_base_url", &self.hosting.api_base_url)?;
        validate_non_empty_string("hosting.branch", &self.hosting.branch)?;
        if self.hosting.is_configured() {
            validate_url("hosting.pages_url", &self.hosting.pages_url())?;
        }

        Ok(())
    }
}
