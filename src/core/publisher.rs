use std::sync::Arc;

use futures::future::try_join_all;

use crate::core::{FileChange, HostingApi, TreeEntry};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::validate_repo_path;

/// 一次發佈的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit_sha: String,
    pub tree_sha: String,
    pub parent_sha: String,
    pub files: usize,
}

/// 將多個檔案以單一 commit 寫入分支並移動分支指標
///
/// 沒有樂觀鎖：步驟 1 與步驟 6 之間若有其他寫入者移動分支，
/// 最後的指標更新會覆蓋對方的 commit（last write wins）。
pub struct CommitPublisher {
    api: Arc<dyn HostingApi>,
    branch: String,
}

impl CommitPublisher {
    pub fn new(api: Arc<dyn HostingApi>, branch: impl Into<String>) -> Self {
        Self {
            api,
            branch: branch.into(),
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub async fn publish_files(&self, files: &[FileChange], message: &str) -> Result<CommitOutcome> {
        if files.is_empty() {
            return Err(SiteError::validation("Nothing to publish: no files supplied", Vec::new()));
        }
        for file in files {
            validate_repo_path("path", &file.path)?;
        }

        // 1. 分支 -> commit
        let parent_sha = self.api.get_branch_head(&self.branch).await?;
        tracing::debug!("Branch {} is at {}", self.branch, parent_sha);

        // 2. commit -> 根 tree
        let base_tree = self.api.get_commit_tree(&parent_sha).await?;
        tracing::debug!("Base tree {}", base_tree);

        // 3. 每個檔案建立 blob，彼此獨立可並行
        let blob_shas = try_join_all(files.iter().map(|file| self.api.create_blob(&file.content))).await?;
        tracing::debug!("Created {} blobs", blob_shas.len());

        // 4. 在原 tree 上疊加新 blob；未列出的路徑保持不變
        let entries: Vec<TreeEntry> = files
            .iter()
            .zip(blob_shas)
            .map(|(file, sha)| TreeEntry {
                path: file.path.clone(),
                sha,
            })
            .collect();
        let tree_sha = self.api.create_tree(&base_tree, &entries).await?;

        // 5. 以步驟 1 的 commit 為 parent
        let commit_sha = self.api.create_commit(message, &tree_sha, &parent_sha).await?;

        // 6. 移動分支指標
        self.api.update_branch(&self.branch, &commit_sha).await?;

        tracing::info!(
            "📦 Committed {} file(s) to {} as {}",
            files.len(),
            self.branch,
            commit_sha
        );

        Ok(CommitOutcome {
            commit_sha,
            tree_sha,
            parent_sha,
            files: files.len(),
        })
    }

    /// 單檔版本：讀取現有 blob sha（若存在）後以一次 create-or-update 寫入
    pub async fn publish_single_file(&self, file: &FileChange, message: &str) -> Result<()> {
        validate_repo_path("path", &file.path)?;

        let existing_sha = self.api.get_file_sha(&file.path, &self.branch).await?;
        tracing::debug!(
            "{} {} on {}",
            if existing_sha.is_some() { "Updating" } else { "Creating" },
            file.path,
            self.branch
        );

        self.api
            .put_file(&file.path, &file.content, message, &self.branch, existing_sha.as_deref())
            .await?;

        tracing::info!("📄 Wrote {} to {}", file.path, self.branch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContentEntry;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 記錄呼叫順序的假主機，可指定在某一步失敗
    #[derive(Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        files: Mutex<HashMap<String, String>>,
    }

    impl RecordingHost {
        fn failing_on(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Default::default()
            }
        }

        fn record(&self, call: String, step: &str) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on == Some(step) {
                return Err(SiteError::HostingApiError {
                    operation: step.to_string(),
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HostingApi for RecordingHost {
        async fn get_branch_head(&self, branch: &str) -> Result<String> {
            self.record(format!("ref {}", branch), "ref")?;
            Ok("c0".to_string())
        }

        async fn get_commit_tree(&self, commit_sha: &str) -> Result<String> {
            self.record(format!("commit {}", commit_sha), "commit")?;
            Ok("t0".to_string())
        }

        async fn create_blob(&self, content: &[u8]) -> Result<String> {
            let text = String::from_utf8_lossy(content).to_string();
            self.record(format!("blob {}", text), "blob")?;
            Ok(format!("b-{}", text))
        }

        async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String> {
            let paths: Vec<String> = entries.iter().map(|e| format!("{}={}", e.path, e.sha)).collect();
            self.record(format!("tree {} [{}]", base_tree, paths.join(",")), "tree")?;
            Ok("t1".to_string())
        }

        async fn create_commit(&self, message: &str, tree_sha: &str, parent_sha: &str) -> Result<String> {
            self.record(format!("new-commit {} {} {}", message, tree_sha, parent_sha), "new-commit")?;
            Ok("c1".to_string())
        }

        async fn update_branch(&self, branch: &str, commit_sha: &str) -> Result<()> {
            self.record(format!("update {} {}", branch, commit_sha), "update")
        }

        async fn list_directory(&self, _path: &str, _branch: &str) -> Result<Option<Vec<ContentEntry>>> {
            Ok(None)
        }

        async fn get_file_sha(&self, path: &str, _branch: &str) -> Result<Option<String>> {
            self.record(format!("sha {}", path), "sha")?;
            Ok(self.files.lock().unwrap().get(path).cloned())
        }

        async fn put_file(
            &self,
            path: &str,
            _content: &[u8],
            _message: &str,
            branch: &str,
            sha: Option<&str>,
        ) -> Result<()> {
            self.record(format!("put {} {} {:?}", path, branch, sha), "put")
        }

        async fn delete_file(&self, _path: &str, _sha: &str, _message: &str, _branch: &str) -> Result<()> {
            Ok(())
        }
    }

    fn files() -> Vec<FileChange> {
        vec![
            FileChange::new("properties/a/index.html", "html"),
            FileChange::new("properties/a/images/x.jpg", "jpg"),
        ]
    }

    #[tokio::test]
    async fn test_publish_follows_commit_protocol() {
        let host = Arc::new(RecordingHost::default());
        let publisher = CommitPublisher::new(host.clone(), "gh-pages");

        let outcome = publisher.publish_files(&files(), "Publish a").await.unwrap();

        assert_eq!(
            outcome,
            CommitOutcome {
                commit_sha: "c1".to_string(),
                tree_sha: "t1".to_string(),
                parent_sha: "c0".to_string(),
                files: 2,
            }
        );

        let calls = host.calls();
        assert_eq!(calls[0], "ref gh-pages");
        assert_eq!(calls[1], "commit c0");
        assert!(calls[2..4].contains(&"blob html".to_string()));
        assert!(calls[2..4].contains(&"blob jpg".to_string()));
        assert_eq!(
            calls[4],
            "tree t0 [properties/a/index.html=b-html,properties/a/images/x.jpg=b-jpg]"
        );
        assert_eq!(calls[5], "new-commit Publish a t1 c0");
        assert_eq!(calls[6], "update gh-pages c1");
        assert_eq!(calls.len(), 7);
    }

    #[tokio::test]
    async fn test_failure_aborts_before_ref_update() {
        let host = Arc::new(RecordingHost::failing_on("tree"));
        let publisher = CommitPublisher::new(host.clone(), "gh-pages");

        let err = publisher.publish_files(&files(), "Publish a").await.unwrap_err();

        assert!(matches!(err, SiteError::HostingApiError { status: 500, .. }));
        let calls = host.calls();
        assert!(calls.iter().all(|c| !c.starts_with("new-commit") && !c.starts_with("update")));
    }

    #[tokio::test]
    async fn test_rejects_invalid_input_without_network_calls() {
        let host = Arc::new(RecordingHost::default());
        let publisher = CommitPublisher::new(host.clone(), "gh-pages");

        assert!(publisher.publish_files(&[], "empty").await.is_err());
        let escaping = vec![FileChange::new("../outside.html", "x")];
        assert!(publisher.publish_files(&escaping, "escape").await.is_err());
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_file_create_and_update() {
        let host = Arc::new(RecordingHost::default());
        host.files
            .lock()
            .unwrap()
            .insert("properties/b/index.html".to_string(), "old-sha".to_string());
        let publisher = CommitPublisher::new(host.clone(), "gh-pages");

        publisher
            .publish_single_file(&FileChange::new("properties/a/index.html", "new"), "create")
            .await
            .unwrap();
        publisher
            .publish_single_file(&FileChange::new("properties/b/index.html", "newer"), "update")
            .await
            .unwrap();

        let calls = host.calls();
        assert_eq!(calls[1], "put properties/a/index.html gh-pages None");
        assert_eq!(calls[3], "put properties/b/index.html gh-pages Some(\"old-sha\")");
    }
}
