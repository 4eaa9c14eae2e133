use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::HostingConfig;
use crate::core::{ContentEntry, HostingApi, TreeEntry};
use crate::utils::error::{Result, SiteError};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("property-site-publisher/", env!("CARGO_PKG_VERSION"));

/// 路徑片段中需要跳脫的字元（保留 `/` 作為分隔）
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: GitObject,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<ContentEntry>),
    File(ContentEntry),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub REST API 用戶端（Git Data 與 Contents API）
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        })
    }

    /// 設定不完整時回傳 `None`
    pub fn from_config(config: &HostingConfig) -> Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }
        let token = config.token.clone().unwrap_or_default();
        Self::new(&config.api_base_url, &config.owner, &config.repo, token).map(Some)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            encode_path(&self.owner),
            encode_path(&self.repo),
            path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.repo_url(path);
        tracing::debug!("➡️ {} {}", method, url);

        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// 送出請求，非 2xx 轉為 `HostingApiError`
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("⬅️ {} -> {}", operation, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|parsed| parsed.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });

        Err(SiteError::HostingApiError {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await.map_err(|e| SiteError::HostingResponseError {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }

    /// 讀取內容；404 回傳 `None`
    async fn get_contents(&self, path: &str, branch: &str) -> Result<Option<ContentsResponse>> {
        let request = self
            .request(Method::GET, &format!("contents/{}", encode_path(path)))
            .query(&[("ref", branch)]);

        match self.send_json("get contents", request).await {
            Ok(contents) => Ok(Some(contents)),
            Err(SiteError::HostingApiError { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn get_branch_head(&self, branch: &str) -> Result<String> {
        let request = self.request(Method::GET, &format!("git/ref/heads/{}", encode_path(branch)));
        let reference: RefResponse = self.send_json("get ref", request).await?;
        Ok(reference.object.sha)
    }

    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String> {
        let request = self.request(Method::GET, &format!("git/commits/{}", commit_sha));
        let commit: CommitResponse = self.send_json("get commit", request).await?;
        Ok(commit.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String> {
        let request = self.request(Method::POST, "git/blobs").json(&json!({
            "content": BASE64.encode(content),
            "encoding": "base64",
        }));
        let blob: GitObject = self.send_json("create blob", request).await?;
        Ok(blob.sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String> {
        let tree: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "path": entry.path,
                    "mode": "100644",
                    "type": "blob",
                    "sha": entry.sha,
                })
            })
            .collect();

        let request = self.request(Method::POST, "git/trees").json(&json!({
            "base_tree": base_tree,
            "tree": tree,
        }));
        let created: GitObject = self.send_json("create tree", request).await?;
        Ok(created.sha)
    }

    async fn create_commit(&self, message: &str, tree_sha: &str, parent_sha: &str) -> Result<String> {
        let request = self.request(Method::POST, "git/commits").json(&json!({
            "message": message,
            "tree": tree_sha,
            "parents": [parent_sha],
        }));
        let commit: GitObject = self.send_json("create commit", request).await?;
        Ok(commit.sha)
    }

    async fn update_branch(&self, branch: &str, commit_sha: &str) -> Result<()> {
        // force：不檢查 fast-forward，後寫入者勝出
        let request = self
            .request(Method::PATCH, &format!("git/refs/heads/{}", encode_path(branch)))
            .json(&json!({ "sha": commit_sha, "force": true }));
        self.send("update ref", request).await?;
        Ok(())
    }

    async fn list_directory(&self, path: &str, branch: &str) -> Result<Option<Vec<ContentEntry>>> {
        Ok(self.get_contents(path, branch).await?.map(|contents| match contents {
            ContentsResponse::Directory(entries) => entries,
            ContentsResponse::File(entry) => vec![entry],
        }))
    }

    async fn get_file_sha(&self, path: &str, branch: &str) -> Result<Option<String>> {
        match self.get_contents(path, branch).await? {
            None => Ok(None),
            Some(ContentsResponse::File(entry)) => Ok(Some(entry.sha)),
            Some(ContentsResponse::Directory(_)) => Err(SiteError::HostingResponseError {
                operation: "get contents".to_string(),
                message: format!("{} is a directory", path),
            }),
        }
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content),
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let request = self
            .request(Method::PUT, &format!("contents/{}", encode_path(path)))
            .json(&body);
        self.send("put contents", request).await?;
        Ok(())
    }

    async fn delete_file(&self, path: &str, sha: &str, message: &str, branch: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("contents/{}", encode_path(path)))
            .json(&json!({
                "message": message,
                "sha": sha,
                "branch": branch,
            }));
        self.send("delete contents", request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("properties/123-main-st/index.html"), "properties/123-main-st/index.html");
        assert_eq!(encode_path("feature/my branch"), "feature/my%20branch");
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = HostingConfig::default();
        assert!(GitHubClient::from_config(&config).unwrap().is_none());

        let config = HostingConfig {
            token: Some("ghp_test".to_string()),
            owner: "acme".to_string(),
            repo: "listings".to_string(),
            ..Default::default()
        };
        let client = GitHubClient::from_config(&config).unwrap().unwrap();
        assert_eq!(
            client.repo_url("git/blobs"),
            "https://api.github.com/repos/acme/listings/git/blobs"
        );
    }
}
