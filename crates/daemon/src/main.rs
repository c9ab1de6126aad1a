/// Beacon Daemon - rendezvous node
///
/// This daemon runs a beacon that:
/// - Derives a room name from its keypair
/// - Collects its reachable addresses
/// - Announces them to the registry and keeps the registration alive
/// - Discovers the other members of its room over DNS

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use beacon_common::BeaconConfig;
use beacon_core::{Beacon, Identity};

const CONFIG_FILE: &str = "beacon.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("run");

    match command {
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => {
            println!("Beacon Daemon v{}", env!("CARGO_PKG_VERSION"));
        }
        "identity" => print_new_identity()?,
        "once" => run_once().await?,
        "run" => run_loop().await?,
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run with 'help' to see available commands");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn load_config() -> Result<BeaconConfig> {
    let config_path = PathBuf::from(CONFIG_FILE);
    if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        Ok(BeaconConfig::from_file(&config_path)?)
    } else {
        info!("No configuration file found, using defaults");
        Ok(BeaconConfig::default())
    }
}

/// Announce, pull the room and prune stale peers once
async fn cycle(beacon: &Beacon) {
    if let Err(e) = beacon.announce().await {
        warn!("Announce failed: {}", e);
    }

    match beacon.pull_peers().await {
        Ok(report) => {
            for failure in &report.failures {
                warn!("Member {} unresolved: {}", failure.link, failure.error);
            }
        }
        Err(e) => warn!("Room lookup failed: {}", e),
    }

    beacon.prune_stale_peers().await;
}

async fn start_beacon() -> Result<Beacon> {
    let config = load_config()?;
    let beacon = Beacon::new(config)?;

    let report = beacon.collect_addresses().await;
    if report.addresses.is_empty() {
        warn!("No addresses collected; announcing an empty address list");
    }

    Ok(beacon)
}

async fn run_once() -> Result<()> {
    let beacon = start_beacon().await?;
    cycle(&beacon).await;
    print_status(&beacon).await;
    Ok(())
}

async fn run_loop() -> Result<()> {
    let beacon = start_beacon().await?;
    let interval = beacon.config().registry.announce_interval();

    info!(
        "Beacon is running, re-announcing every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle(&beacon).await;
                print_status(&beacon).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

fn print_new_identity() -> Result<()> {
    let identity = Identity::generate()?;
    let room = identity.room_identity();

    println!("Room:           {}", room.name);
    println!("Public Key:     {}", room.public_key);
    println!("Room Signature: {}", room.signature);
    println!();
    print!("{}", identity.private_key_pem()?);
    Ok(())
}

async fn print_status(beacon: &Beacon) {
    let stats = beacon.stats().await;
    let node = beacon.self_node().await;
    let peers = beacon.peers().await;

    println!("\n========================================");
    println!("            Beacon Status");
    println!("========================================");
    println!("Room:       {}", stats.room);
    println!("Addresses:  {}", stats.addresses);
    for address in &node.addresses {
        println!("  {}", address);
    }
    println!("Peers:      {}", stats.peers);
    for (link, peer) in &peers {
        println!("  {} -> {}", link, peer.records.join(", "));
    }
    println!("========================================\n");
}

/// Print help message
fn print_help() {
    println!("Beacon Daemon - rendezvous node");
    println!();
    println!("USAGE:");
    println!("    beacon-daemon [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    run         Announce and discover peers until Ctrl+C (default)");
    println!("    once        Collect, announce and discover a single time");
    println!("    identity    Generate a new identity and print its private key");
    println!("    help        Show this help message");
    println!("    version     Show version information");
    println!();
    println!("CONFIGURATION:");
    println!("    Read from ./{} when present. Set identity.private_key_pem", CONFIG_FILE);
    println!("    to keep the same room across restarts.");
    println!();
    println!("LOGGING:");
    println!("    RUST_LOG=debug beacon-daemon run");
}
