//! Terminal front end: steps the universe on a fixed cadence and renders
//! the latest published generation at its own frame rate.

mod render;
mod telemetry;

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Instant;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use valence_core::DriverConfig;
use valence_world::{ForceReport, GenerationHandoff, Universe};

/// Environment variable naming a JSON config file
const CONFIG_ENV: &str = "VALENCE_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => DriverConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        Err(_) => DriverConfig::default(),
    };
    config.validate()?;

    telemetry::init_telemetry(config.log_json)?;

    info!("Starting Valence");
    info!(
        size = config.universe.size,
        seed = config.universe.seed,
        ticks_per_second = config.ticks_per_second,
        frames_per_second = config.frames_per_second,
        "Configuration loaded"
    );

    let universe = Universe::new(config.universe.clone())?;
    let handoff = GenerationHandoff::new(universe.snapshot());
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let mut ticker = tokio::spawn(run_tick_loop(
        universe,
        handoff.clone(),
        config.clone(),
        cancel.clone(),
    ));
    let renderer = tokio::spawn(run_render_loop(handoff, config, cancel.clone()));

    // Stop on a signal or when the tick loop reaches its limit
    let finished = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut ticker => Some(result),
    };
    cancel.cancel();
    let ticker_result = match finished {
        Some(result) => result,
        None => ticker.await,
    };

    info!("Shutting down");

    let updates = join_count("tick", ticker_result);
    let frames = join_count("render", renderer.await);

    let elapsed = started.elapsed().as_secs_f64();
    let fps = if elapsed > 0.0 { frames as f64 / elapsed } else { 0.0 };
    info!(
        total_frames = frames,
        total_updates = updates,
        fps = format!("{fps:.2}"),
        "Run finished"
    );

    Ok(())
}

fn join_count(name: &str, joined: std::result::Result<Result<u64>, tokio::task::JoinError>) -> u64 {
    match joined {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            error!("{} loop failed: {:#}", name, e);
            0
        }
        Err(e) => {
            error!("{} loop panicked: {}", name, e);
            0
        }
    }
}

/// Step the universe once per tick period and publish each new generation.
/// Returns the number of completed ticks.
async fn run_tick_loop(
    mut universe: Universe,
    handoff: GenerationHandoff,
    config: DriverConfig,
    cancel: CancellationToken,
) -> Result<u64> {
    let period = Duration::from_secs_f64(1.0 / f64::from(config.ticks_per_second));
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut updates = 0u64;
    loop {
        if config.max_ticks.is_some_and(|max| updates >= max) {
            info!(updates, "Tick limit reached");
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let step = tokio::task::spawn_blocking(move || {
            let stats = universe.tick();
            (universe, stats)
        });
        let (stepped, stats) = step.await.context("tick task failed")?;
        universe = stepped;
        updates += 1;

        if config.print_universe_on_update {
            debug!("Generation {}\n{}", stats.generation, ForceReport::new(universe.current()));
        }
        if stats.blocked > 0 {
            debug!(blocked = stats.blocked, "Moves blocked by contention");
        }

        handoff.publish(universe.snapshot());
    }

    Ok(updates)
}

/// Draw the latest published generation at the configured frame rate.
/// Returns the number of frames drawn.
async fn run_render_loop(
    handoff: GenerationHandoff,
    config: DriverConfig,
    cancel: CancellationToken,
) -> Result<u64> {
    let period = Duration::from_secs_f64(1.0 / f64::from(config.frames_per_second));
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut renderer = render::TerminalRenderer::new(config.electron_spin);
    let mut frames = 0u64;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let generation = handoff.latest();
        let frame = renderer.draw(&generation);

        // Clear the screen and home the cursor before each frame
        {
            let mut lock = stdout.lock();
            write!(lock, "\x1b[2J\x1b[H{frame}")?;
            lock.flush()?;
        }
        frames += 1;
    }

    // Leave the last frame visible and move past it
    writeln!(stdout)?;
    Ok(frames)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
