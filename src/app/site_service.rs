use std::sync::Arc;

use chrono::Utc;

use crate::adapters::upload_store::LocalUploadStore;
use crate::config::HostingConfig;
use crate::core::publisher::CommitPublisher;
use crate::core::site_directory::{site_path, site_url, SiteDirectory};
use crate::core::slug::{build_slug, is_valid_slug};
use crate::core::template::render_site;
use crate::core::{FileChange, HostingApi, PublishedSite, SiteSubmission, Storage};
use crate::utils::error::{Result, SiteError};

/// 發佈一次網站所需的檔案，以及完成後要清除的暫存上傳
#[derive(Debug)]
pub struct SiteBundle {
    pub slug: String,
    pub files: Vec<FileChange>,
    pub staged_uploads: Vec<String>,
}

/// 驗證並算出 slug，不涉及任何網路呼叫
pub fn prepare_submission(submission: &SiteSubmission) -> Result<String> {
    submission.validate()?;

    let slug = build_slug(&submission.property.address, &submission.property.city);
    if slug.is_empty() {
        return Err(SiteError::validation(
            "Address and city must contain letters or digits",
            Vec::new(),
        ));
    }
    Ok(slug)
}

pub struct SiteService {
    api: Arc<dyn HostingApi>,
    branch: String,
    publisher: CommitPublisher,
    directory: SiteDirectory,
    pages_url: String,
    uploads: LocalUploadStore,
}

impl SiteService {
    pub fn new(api: Arc<dyn HostingApi>, hosting: &HostingConfig, uploads: LocalUploadStore) -> Self {
        let pages_url = hosting.pages_url();
        Self {
            publisher: CommitPublisher::new(api.clone(), hosting.branch.clone()),
            directory: SiteDirectory::new(api.clone(), hosting.branch.clone(), pages_url.clone()),
            api,
            branch: hosting.branch.clone(),
            pages_url,
            uploads,
        }
    }

    /// 渲染並以單一 commit 發佈網站，成功後清除已引用的暫存上傳
    ///
    /// 同一個 slug 再次發佈會整個覆寫 index.html；沒有鎖，同時發佈時後寫入者勝出。
    pub async fn publish(&self, submission: &SiteSubmission) -> Result<PublishedSite> {
        let slug = prepare_submission(submission)?;
        let bundle = self.build_bundle(slug, submission).await?;
        let message = format!("Publish {} ({})", bundle.slug, Utc::now().to_rfc3339());

        tracing::info!(
            "🚀 Publishing {} ({} file(s)) to {}",
            bundle.slug,
            bundle.files.len(),
            self.publisher.branch()
        );

        match bundle.files.as_slice() {
            [single] => self.publisher.publish_single_file(single, &message).await?,
            files => {
                self.publisher.publish_files(files, &message).await?;
            }
        }

        self.uploads.remove_best_effort(&bundle.staged_uploads).await;

        Ok(PublishedSite {
            url: site_url(&self.pages_url, &bundle.slug),
            slug: bundle.slug,
        })
    }

    /// 收集暫存圖片、改寫為相對路徑 `images/<name>` 後渲染 index.html
    pub async fn build_bundle(&self, slug: String, submission: &SiteSubmission) -> Result<SiteBundle> {
        let root = site_path(&slug);
        let mut files = Vec::new();
        let mut staged_uploads = Vec::new();

        for reference in submission.staged_upload_refs() {
            let Some(name) = LocalUploadStore::name_from_reference(reference) else {
                continue;
            };
            let path = format!("{}/images/{}", root, name);
            match self.uploads.read_file(name).await {
                Ok(data) => {
                    files.push(FileChange::new(path, data));
                    staged_uploads.push(name.to_string());
                }
                Err(SiteError::IoError(io)) if io.kind() == std::io::ErrorKind::NotFound => {
                    // 前次發佈已提交並清除暫存檔；圖片仍在分支上則沿用
                    if self.api.get_file_sha(&path, &self.branch).await?.is_none() {
                        return Err(SiteError::upload(format!(
                            "Referenced upload no longer exists: {}",
                            reference
                        )));
                    }
                    tracing::warn!("⚠️ {} already cleaned up; keeping published {}", reference, path);
                }
                Err(e) => return Err(e),
            }
        }

        let site = with_relative_images(submission);
        let html = render_site(&site)?;
        files.insert(0, FileChange::new(format!("{}/index.html", root), html));

        Ok(SiteBundle {
            slug,
            files,
            staged_uploads,
        })
    }

    pub async fn list(&self) -> Result<Vec<PublishedSite>> {
        self.directory.list_sites().await
    }

    pub async fn delete(&self, slug: &str) -> Result<usize> {
        if !is_valid_slug(slug) {
            return Err(SiteError::validation(format!("Invalid site slug: {}", slug), Vec::new()));
        }
        self.directory.delete_site(slug).await
    }
}

fn relative_image(reference: &str) -> Option<String> {
    LocalUploadStore::name_from_reference(reference).map(|name| format!("images/{}", name))
}

fn with_relative_images(submission: &SiteSubmission) -> SiteSubmission {
    let mut site = submission.clone();
    for photo in &mut site.photos {
        if let Some(relative) = relative_image(&photo.url) {
            photo.url = relative;
        }
    }
    for contact in [&mut site.realtor, &mut site.loan_officer] {
        if let Some(relative) = contact.photo.as_deref().and_then(relative_image) {
            contact.photo = Some(relative);
        }
    }
    site
}
