mod config;
mod controller;
mod defaults;
mod engine;
mod persistence;
mod player;
#[cfg(test)]
mod testing;
mod world;

use std::sync::Arc;

use config::ServerConfig;
use engine::ServerEngine;
use spout_api::protocol;
use spout_api::{CommandSource, Engine, Player, World};
use tokio::io::AsyncBufReadExt;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "{} v{} starting ({} ticks per second)",
        config.server.name,
        env!("CARGO_PKG_VERSION"),
        config.server.tick_rate
    );
    info!(
        "World: {} in {}",
        config.world.name,
        config.world.folder.display()
    );

    let engine = match ServerEngine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to start engine: {e}");
            std::process::exit(1);
        }
    };

    info!("{} materials registered", engine.materials().len());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Handle Ctrl+C
    let shutdown_tx_ctrlc = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx_ctrlc.send(true);
    });

    // Console: read commands from stdin
    let console_engine = Arc::clone(&engine);
    let shutdown_tx_console = shutdown_tx.clone();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !handle_console_command(&console_engine, line) {
                let _ = shutdown_tx_console.send(true);
                break;
            }
        }
    });

    engine.run(shutdown_rx).await;

    info!("Saving before shutdown...");
    engine.shutdown();
}

/// Run one console command. Returns `false` when the server should stop.
fn handle_console_command(engine: &ServerEngine, line: &str) -> bool {
    let (command, args) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "stop" => return false,
        "list" => {
            let names: Vec<String> = engine
                .online_players()
                .iter()
                .map(|p| p.name().to_string())
                .collect();
            info!(
                "{} players online in {}: {}",
                names.len(),
                engine.world().name(),
                names.join(", ")
            );
        }
        "save-all" => engine.save_all(),
        "say" if !args.is_empty() => {
            let text = format!("[Server] {args}");
            info!("{text}");
            protocol::execute_with_all_players(engine, |player: &Arc<dyn Player>| {
                player.send_message(&text);
            });
        }
        "kick" if !args.is_empty() => {
            let (name, reason) = args.split_once(' ').unwrap_or((args, ""));
            match engine.player(name) {
                Some(player) => player.kick_with(reason),
                None => warn!("No player named {name} is online"),
            }
        }
        _ => warn!("Unknown command: {line}"),
    }
    true
}
