//! Swim Race - headless host for the race simulation
//!
//! Two modes:
//! - `REPLAY_SCRIPT=path` replays a JSON key script at a fixed step and
//!   prints the outcome as JSON
//! - otherwise runs a live session fed by stdin: every character typed is a
//!   key press (A/D/S/W and J/L/K/I, space restarts a finished race, Q quits).
//!   Lines arrive on Enter, so type one key per line for real stroke timing.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swim_race::config::{HostConfig, SimConfig};
use swim_race::game::{Entrant, Key, Race, RaceSession, SessionHandle, SessionMsg};
use swim_race::replay::ReplayScript;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let host = HostConfig::from_env()?;

    // Initialize tracing
    init_tracing(&host.log_level);

    if let Some(path) = &host.replay_script {
        info!(script = %path.display(), "Starting replay");
        let outcome = ReplayScript::load(path)?.run()?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let sim = SimConfig::from_env()?;
    let race = Race::new(sim, Entrant::default_roster())?;
    let (session, handle) = RaceSession::new(race, host.frame_rate, host.snapshot_every);

    info!(session_id = %handle.id, frame_rate = host.frame_rate, "Starting live session");
    info!("P1: [A]/[D] stroke, [S] kick, [W] breathe || P2: [J]/[L] stroke, [K] kick, [I] breathe");

    let reporter = tokio::spawn(report_results(handle.subscribe()));
    let session_task = tokio::spawn(session.run());

    tokio::select! {
        _ = feed_stdin(handle.clone()) => {
            info!("Input closed, shutting down");
        }
        _ = shutdown_signal() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    handle.shutdown().await;
    let summary = session_task.await?;
    reporter.abort();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!("Session shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Forward stdin characters to the session until EOF or `q`
async fn feed_stdin(handle: SessionHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                return;
            }
        };

        // an empty line stands for the space bar
        if line.is_empty() && !handle.press(Key::RESTART).await {
            return;
        }

        for c in line.chars() {
            if c.eq_ignore_ascii_case(&'q') {
                return;
            }
            if !handle.press(Key::from(c)).await {
                return;
            }
        }
    }
}

/// Print a summary each time a race ends
async fn report_results(mut rx: broadcast::Receiver<SessionMsg>) {
    loop {
        match rx.recv().await {
            Ok(SessionMsg::RaceOver(summary)) => {
                info!(phase = ?summary.phase, race_time = summary.race_time, "Race over, press space to restart");
                match serde_json::to_string(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!(error = %e, "Failed to encode summary"),
                }
            }
            Ok(SessionMsg::Restarted) => info!("Race restarted"),
            Ok(SessionMsg::Snapshot(_)) => {}
            Ok(SessionMsg::Closed(_)) | Err(broadcast::error::RecvError::Closed) => return,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Result reporter lagged behind");
            }
        }
    }
}

/// Ctrl+C handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
