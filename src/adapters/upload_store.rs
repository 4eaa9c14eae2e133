use crate::config::UploadSettings;
use crate::core::Storage;
use crate::domain::model::UPLOAD_URL_PREFIX;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::validate_file_extension;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 20,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl From<&UploadSettings> for UploadLimits {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            max_files: settings.max_files,
            max_file_size: settings.max_file_size_bytes(),
        }
    }
}

/// 尚未寫入磁碟的上傳檔案
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    pub path: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub mimetype: String,
}

/// 發佈前暫存使用者照片的本地目錄
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    root: PathBuf,
    limits: UploadLimits,
}

impl LocalUploadStore {
    pub fn new(root: impl Into<PathBuf>, limits: UploadLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn check_count(&self, count: usize) -> Result<()> {
        if count > self.limits.max_files {
            return Err(SiteError::upload(format!(
                "Too many files: at most {} images per upload",
                self.limits.max_files
            )));
        }
        Ok(())
    }

    /// 檢查副檔名、宣告的 content type 與大小，回傳正規化後的副檔名
    pub fn check_file(&self, file: &IncomingFile) -> Result<String> {
        let extension = validate_file_extension("photos", &file.original_name, ALLOWED_EXTENSIONS)
            .map_err(|_| {
                SiteError::upload(format!(
                    "{}: only {} files are allowed",
                    file.original_name,
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        let content_type = file.content_type.as_deref().unwrap_or_default();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(SiteError::upload(format!(
                "{}: content type '{}' is not an allowed image type",
                file.original_name, content_type
            )));
        }

        if file.data.len() > self.limits.max_file_size {
            return Err(SiteError::upload(format!(
                "{}: file exceeds the {} MB limit",
                file.original_name,
                self.limits.max_file_size / (1024 * 1024)
            )));
        }

        Ok(extension)
    }

    /// 整批檢查通過才寫入；寫入途中失敗則移除已寫入的檔案
    pub async fn store_batch(&self, files: Vec<IncomingFile>) -> Result<Vec<StoredUpload>> {
        self.check_count(files.len())?;
        let extensions = files
            .iter()
            .map(|file| self.check_file(file))
            .collect::<Result<Vec<_>>>()?;

        self.ensure_root().await?;

        let mut stored = Vec::with_capacity(files.len());
        for (file, extension) in files.into_iter().zip(extensions) {
            let filename = format!("photo-{}.{}", uuid::Uuid::new_v4().simple(), extension);

            if let Err(e) = self.write_file(&filename, &file.data).await {
                tracing::error!("❌ Failed to write upload {}: {}", filename, e);
                let written: Vec<String> = stored.iter().map(|s: &StoredUpload| s.filename.clone()).collect();
                self.remove_best_effort(&written).await;
                return Err(e);
            }

            stored.push(StoredUpload {
                path: format!("{}{}", UPLOAD_URL_PREFIX, filename),
                filename,
                original_name: file.original_name,
                size: file.data.len(),
                mimetype: file.content_type.unwrap_or_default(),
            });
        }

        tracing::info!("📸 Stored {} upload(s) in {}", stored.len(), self.root.display());
        Ok(stored)
    }

    /// `/uploads/<name>` -> `<name>`；非暫存參照回傳 `None`
    pub fn name_from_reference(reference: &str) -> Option<&str> {
        let name = reference.strip_prefix(UPLOAD_URL_PREFIX)?;
        is_plain_file_name(name).then_some(name)
    }

    /// 刪除失敗只記錄警告，不回傳錯誤
    pub async fn remove_best_effort(&self, names: &[String]) {
        for name in names {
            if let Err(e) = self.remove_file(name).await {
                tracing::warn!("⚠️ Could not remove staged upload {}: {}", name, e);
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(SiteError::upload(format!("Invalid upload reference: {}", name)));
        }
        Ok(self.root.join(name))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

impl Storage for LocalUploadStore {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path)?;
        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let full_path = self.resolve(path)?;
        tokio::fs::remove_file(full_path).await?;
        Ok(())
    }
}
