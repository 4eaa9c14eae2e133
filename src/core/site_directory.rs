use std::sync::Arc;

use crate::core::{EntryKind, HostingApi, PublishedSite};
use crate::utils::error::{Result, SiteError};

/// 儲存庫中放置所有物件網站的頂層目錄
pub const SITES_ROOT: &str = "properties";

pub fn site_path(slug: &str) -> String {
    format!("{}/{}", SITES_ROOT, slug)
}

/// 已發佈網站的瀏覽網址，例如 `https://owner.github.io/repo/properties/<slug>/`
pub fn site_url(pages_url: &str, slug: &str) -> String {
    format!("{}/{}/", pages_url.trim_end_matches('/'), site_path(slug))
}

pub struct SiteDirectory {
    api: Arc<dyn HostingApi>,
    branch: String,
    pages_url: String,
}

impl SiteDirectory {
    pub fn new(api: Arc<dyn HostingApi>, branch: impl Into<String>, pages_url: impl Into<String>) -> Self {
        Self {
            api,
            branch: branch.into(),
            pages_url: pages_url.into(),
        }
    }

    /// 列出 `properties/` 下的子目錄；目錄不存在視為零個網站
    pub async fn list_sites(&self) -> Result<Vec<PublishedSite>> {
        let entries = match self.api.list_directory(SITES_ROOT, &self.branch).await? {
            Some(entries) => entries,
            None => {
                tracing::debug!("{} does not exist on {}", SITES_ROOT, self.branch);
                return Ok(Vec::new());
            }
        };

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Dir)
            .map(|entry| PublishedSite {
                url: site_url(&self.pages_url, &entry.name),
                slug: entry.name,
            })
            .collect())
    }

    /// 逐檔刪除網站目錄下所有檔案
    ///
    /// 每個檔案各自一次刪除呼叫，並非原子操作；中途失敗會留下部分刪除的網站。
    pub async fn delete_site(&self, slug: &str) -> Result<usize> {
        let root = site_path(slug);
        let files = self.collect_files(&root).await?;

        for (path, sha) in &files {
            let message = format!("Delete {}", path);
            self.api.delete_file(path, sha, &message, &self.branch).await?;
            tracing::debug!("Deleted {}", path);
        }

        tracing::info!("🗑️ Deleted {} file(s) under {}", files.len(), root);
        Ok(files.len())
    }

    /// 遞迴展開目錄，回傳 (路徑, blob sha)
    async fn collect_files(&self, root: &str) -> Result<Vec<(String, String)>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_string()];

        while let Some(dir) = pending.pop() {
            let entries = self
                .api
                .list_directory(&dir, &self.branch)
                .await?
                .ok_or_else(|| SiteError::HostingApiError {
                    operation: "list directory".to_string(),
                    status: 404,
                    message: format!("{} not found", dir),
                })?;

            for entry in entries {
                match entry.kind {
                    EntryKind::Dir => pending.push(entry.path),
                    _ => files.push((entry.path, entry.sha)),
                }
            }
        }

        Ok(files)
    }
}
