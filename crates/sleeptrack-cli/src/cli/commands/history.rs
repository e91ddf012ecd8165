use anyhow::{Context, Result};
use chrono::Local;
use sleeptrack_core::config::Config;
use sleeptrack_core::{SharedStore, format};
use sleeptrack_tui::SessionRuntime;

/// Prints every recorded night, newest first.
pub async fn show(config: Config, store: SharedStore, json: bool) -> Result<()> {
    let mut runtime = SessionRuntime::new(config, store);
    runtime.settle().await;

    let state = runtime.state();
    if let Some(notice) = state.notice.as_ref().filter(|notice| notice.is_error()) {
        anyhow::bail!("{}", notice.message);
    }

    let nights = &state.tracker.nights;
    if json {
        let out = serde_json::to_string_pretty(nights).context("serialize history")?;
        println!("{out}");
    } else if nights.is_empty() {
        println!("No nights recorded yet.");
    } else {
        println!(
            "{}",
            format::format_nights(nights, &state.config.time_format, &Local)
        );
    }
    Ok(())
}
