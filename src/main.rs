use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use property_site_publisher::utils::{logger, validation::Validate};
use property_site_publisher::{router, AppConfig, AppState, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting property-site-publisher");

    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let addr = config.bind_address();
    let state = AppState::from_config(config)
        .await
        .context("failed to initialize application state")?;
    let app = router(Arc::new(state));

    tracing::info!("Property Site Publisher listening on http://{}", addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  GET    /api/config           - Hosting configuration status");
    tracing::info!("  POST   /api/upload           - Stage property photos");
    tracing::info!("  POST   /api/generate         - Render and publish a property site");
    tracing::info!("  POST   /api/preview          - Render a preview without publishing");
    tracing::info!("  GET    /api/properties       - List published sites");
    tracing::info!("  DELETE /api/properties/:slug - Delete a published site");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
