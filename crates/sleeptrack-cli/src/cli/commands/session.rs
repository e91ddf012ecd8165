//! Tracker commands.
//!
//! Each command drives the same runtime as the terminal UI: build it, let the
//! startup restore land, dispatch one action and wait for the store to settle.

use anyhow::{Result, bail};
use chrono::Local;
use sleeptrack_core::config::Config;
use sleeptrack_core::format::{self, format_hms};
use sleeptrack_core::session::now_millis;
use sleeptrack_core::{SessionId, SharedStore, SleepQuality};
use sleeptrack_tui::{Action, SessionRuntime};

/// A runtime whose startup restore has finished.
async fn ready_runtime(config: Config, store: SharedStore) -> Result<SessionRuntime> {
    let mut runtime = SessionRuntime::new(config, store);
    runtime.settle().await;
    check_notice(&runtime)?;
    Ok(runtime)
}

/// Turns an error notice into a command failure.
fn check_notice(runtime: &SessionRuntime) -> Result<()> {
    if let Some(notice) = &runtime.state().notice
        && notice.is_error()
    {
        bail!("{}", notice.message);
    }
    Ok(())
}

fn timestamp(runtime: &SessionRuntime, millis: i64) -> String {
    format::format_timestamp(millis, &runtime.state().config.time_format, &Local)
}

pub async fn start(config: Config, store: SharedStore) -> Result<()> {
    let mut runtime = ready_runtime(config, store).await?;

    if let Some(current) = &runtime.state().tracker.current {
        println!(
            "Already recording night #{} since {}",
            current.id,
            timestamp(&runtime, current.start_time_millis)
        );
        return Ok(());
    }

    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    check_notice(&runtime)?;

    match &runtime.state().tracker.current {
        Some(current) => {
            println!(
                "Started night #{} at {}",
                current.id,
                timestamp(&runtime, current.start_time_millis)
            );
            Ok(())
        }
        None => bail!("Started a night but could not read it back"),
    }
}

pub async fn stop(config: Config, store: SharedStore, quality: Option<SleepQuality>) -> Result<()> {
    let mut runtime = ready_runtime(config, store).await?;

    if runtime.state().tracker.current.is_none() {
        println!("Not recording.");
        return Ok(());
    }

    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;
    check_notice(&runtime)?;

    let Some(rating) = runtime.state().quality() else {
        bail!("Stopped tracking but the night was not handed over for rating");
    };
    let id = rating.session_id;
    let night = runtime
        .state()
        .tracker
        .nights
        .iter()
        .find(|night| night.id == id)
        .cloned();
    match night {
        Some(night) => println!(
            "Stopped night #{id} after {}",
            format_hms(night.duration_millis())
        ),
        None => println!("Stopped night #{id}"),
    }

    match quality {
        Some(quality) => save_rating(&mut runtime, quality).await,
        None => {
            runtime.dispatch(Action::SkipQuality);
            Ok(())
        }
    }
}

pub async fn rate(
    config: Config,
    store: SharedStore,
    id: SessionId,
    quality: SleepQuality,
) -> Result<()> {
    let mut runtime = ready_runtime(config, store).await?;

    runtime.dispatch(Action::OpenRating { id });
    check_notice(&runtime)?;
    save_rating(&mut runtime, quality).await
}

async fn save_rating(runtime: &mut SessionRuntime, quality: SleepQuality) -> Result<()> {
    runtime.dispatch(Action::SelectQuality(quality));
    runtime.dispatch(Action::SaveQuality);
    runtime.settle().await;
    check_notice(runtime)?;
    if let Some(notice) = &runtime.state().notice {
        println!("{}", notice.message);
    }
    Ok(())
}

pub async fn status(config: Config, store: SharedStore) -> Result<()> {
    let runtime = ready_runtime(config, store).await?;
    let tracker = &runtime.state().tracker;

    match &tracker.current {
        Some(current) => println!(
            "Recording night #{} since {} ({} elapsed)",
            current.id,
            timestamp(&runtime, current.start_time_millis),
            format_hms(now_millis() - current.start_time_millis)
        ),
        None => println!("Not recording."),
    }
    println!("{} night(s) recorded", tracker.nights.len());
    Ok(())
}

pub async fn clear(config: Config, store: SharedStore, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to erase all sleep data without --yes");
    }
    let mut runtime = ready_runtime(config, store).await?;

    runtime.dispatch(Action::ClearHistory);
    runtime.settle().await;
    check_notice(&runtime)?;

    if let Some(notice) = &runtime.state().notice {
        println!("{}", notice.message);
    }
    Ok(())
}
