use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 新樹狀結構中的一筆 blob 項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// 儲存庫目錄列表中的一個項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// 遠端版本控制主機（Git Data 與 Contents API）
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// 分支目前指向的 commit
    async fn get_branch_head(&self, branch: &str) -> Result<String>;

    /// commit 的根 tree
    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String>;

    async fn create_blob(&self, content: &[u8]) -> Result<String>;

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String>;

    async fn create_commit(&self, message: &str, tree_sha: &str, parent_sha: &str) -> Result<String>;

    async fn update_branch(&self, branch: &str, commit_sha: &str) -> Result<()>;

    /// 路徑不存在時回傳 `None`
    async fn list_directory(&self, path: &str, branch: &str) -> Result<Option<Vec<ContentEntry>>>;

    async fn get_file_sha(&self, path: &str, branch: &str) -> Result<Option<String>>;

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<()>;

    async fn delete_file(&self, path: &str, sha: &str, message: &str, branch: &str) -> Result<()>;
}
