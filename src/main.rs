use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use inbox_triage::config::TriageConfig;
use inbox_triage::context::TriageContext;
use inbox_triage::error::Error;
use inbox_triage::extract::{extract_file, validate_content};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = TriageConfig::from_env().map_err(Error::from)?;

    let source = std::env::args().nth(1);
    if matches!(source.as_deref(), Some("-h" | "--help")) {
        eprintln!("Usage: inbox-triage [FILE.txt|FILE.pdf]");
        eprintln!("  Reads the email from FILE, or from stdin when omitted.");
        return Ok(());
    }

    eprintln!("📬 Inbox Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Profile: {}", config.profile);
    eprintln!(
        "   Zero-shot: {}",
        config
            .zero_shot
            .as_ref()
            .map(|z| z.model.as_str())
            .unwrap_or("disabled")
    );
    eprintln!("   Reply backend: {}\n", config.reply_backend);

    let raw = match source.as_deref() {
        Some(path) => extract_file(Path::new(path))
            .map_err(Error::from)
            .with_context(|| format!("Failed to read {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let text = validate_content(&raw).map_err(Error::from)?;

    let ctx = TriageContext::from_config(&config);
    let outcome = ctx.process(text).await;
    info!(mode = outcome.label(), "Triage complete");

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
