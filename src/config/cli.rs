use super::AppConfig;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "property-site-publisher")]
#[command(about = "Form server that renders property sites and publishes them to a static hosting branch")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, env = "SITE_PUBLISHER_CONFIG")]
    pub config: Option<String>,

    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory with the upload form front-end
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Transient storage for uploaded photos
    #[arg(long, env = "UPLOAD_DIR")]
    pub upload_dir: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_OWNER")]
    pub github_owner: Option<String>,

    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// Branch served as the static site
    #[arg(long, env = "GITHUB_BRANCH")]
    pub github_branch: Option<String>,

    /// Base URL of the published sites
    #[arg(long, env = "PAGES_URL")]
    pub pages_url: Option<String>,

    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    /// 命令列（及環境變數）優先於設定檔
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.upload_dir {
            config.uploads.dir = dir.clone();
        }
        if let Some(token) = &self.github_token {
            config.hosting.token = Some(token.clone());
        }
        if let Some(owner) = &self.github_owner {
            config.hosting.owner = owner.clone();
        }
        if let Some(repo) = &self.github_repo {
            config.hosting.repo = repo.clone();
        }
        if let Some(branch) = &self.github_branch {
            config.hosting.branch = branch.clone();
        }
        if let Some(url) = &self.pages_url {
            config.hosting.pages_url = Some(url.clone());
        }
        if let Some(url) = &self.api_url {
            config.hosting.api_base_url = url.clone();
        }
    }
}
