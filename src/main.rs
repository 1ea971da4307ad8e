//! Impostor Arena host - runs a match headlessly
//!
//! This is the main entry point for the headless host. It handles:
//! - Reading JSON-line commands from stdin (input, votes, resets)
//! - Ticking the match at a fixed rate
//! - Writing JSON-line events (HUD, frames, vote prompts, results) to stdout
//!
//! Logs go to stderr so stdout carries protocol only.

use std::io::BufRead;

use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor_arena::config::{Config, LogFormat};
use impostor_arena::game::GameMatch;
use impostor_arena::host::{encode_event, parse_command, HostCommand, HostEvent, HostRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    info!("Starting Impostor Arena host");
    info!(seed = config.seed, tick_rate = config.tick_rate, "Match configuration loaded");

    let game = GameMatch::with_seed(config.match_settings(), config.seed);
    let runner = HostRunner::new(game, config.tick_rate);

    let (command_tx, command_rx) = mpsc::channel::<HostCommand>(256);
    let (event_tx, mut event_rx) = mpsc::channel::<HostEvent>(256);

    spawn_stdin_reader(command_tx, event_tx.clone());

    let run = runner.run(command_rx, event_tx);
    tokio::pin!(run);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            _ = &mut run => break,
            _ = &mut shutdown => break,
            Some(event) = event_rx.recv() => write_event(&mut stdout, &event).await?,
        }
    }

    // Flush whatever the loop produced before stopping
    while let Ok(event) = event_rx.try_recv() {
        write_event(&mut stdout, &event).await?;
    }

    info!("Host shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Stdin is read on a plain thread: a blocking read cannot be cancelled and
/// would otherwise hold up runtime shutdown
fn spawn_stdin_reader(commands: mpsc::Sender<HostCommand>, events: mpsc::Sender<HostEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(command) => {
                    if commands.blocking_send(command).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Malformed command");
                    let event = HostEvent::error("bad_command", e.to_string());
                    if events.blocking_send(event).is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Stdin closed");
    });
}

async fn write_event(stdout: &mut Stdout, event: &HostEvent) -> anyhow::Result<()> {
    let line = encode_event(event)?;
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
