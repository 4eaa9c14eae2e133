use clap::Parser;
use property_site_publisher::core::template::render_site;
use property_site_publisher::core::SiteSubmission;
use property_site_publisher::utils::logger;

#[derive(Parser)]
#[command(name = "render-preview")]
#[command(about = "Render a property site from a submission JSON file without publishing")]
struct Args {
    /// Path to the submission JSON (same shape as POST /api/generate)
    input: String,

    /// Write the HTML here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Require every mandatory field instead of filling placeholders
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading submission from: {}", args.input);
    let content = std::fs::read_to_string(&args.input)?;
    let submission: SiteSubmission = serde_json::from_str(&content)?;

    let submission = if args.strict {
        if let Err(e) = submission.validate() {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
        submission
    } else {
        submission.with_preview_defaults()
    };

    let html = render_site(&submission)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &html)?;
            tracing::info!("✅ Preview written to {} ({} bytes)", path, html.len());
        }
        None => println!("{}", html),
    }

    Ok(())
}
