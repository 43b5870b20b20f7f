mod bootstrap;
mod report;

use anyhow::Result;
use cloak_core::settings::Settings;
use cloak_data::dashboard::Dashboard;
use cloak_runtime::data_manager::{FileSource, IngestionManager, DEFAULT_CACHE_TTL_SECS};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Cloak Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Series: {}, Format: {}",
        settings.input.display(),
        settings.series,
        settings.format
    );

    let selection = settings.selection()?;
    let mut manager = IngestionManager::with_dashboard(
        FileSource::new(settings.input.clone()),
        DEFAULT_CACHE_TTL_SECS,
        Dashboard::with_selection(selection),
    );

    manager.refresh(true).await?;
    if let Some(updated) = manager.last_update() {
        tracing::debug!(updated = %updated.to_rfc3339(), "store ready");
    }

    let view = manager.view();
    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&view)?),
        _ => print!("{}", report::render_text(&view)),
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
