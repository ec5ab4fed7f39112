//! Hub Daemon - chat registry and broadcast server
//!
//! This binary runs the chat hub: it accepts TCP connections, lets
//! each peer negotiate a unique display name, and relays broadcast and
//! private messages between peers.
//!
//! # Usage
//!
//! ```bash
//! # Start the hub (foreground)
//! hubd start
//!
//! # Start the hub (background/daemonized)
//! hubd start -d
//!
//! # Stop the hub
//! hubd stop
//!
//! # Check hub status
//! hubd status
//!
//! # Start on a custom address
//! hubd start --bind 0.0.0.0 --port 9001
//! HUBD_ADDR=0.0.0.0:9001 hubd start
//!
//! # Enable debug logging
//! RUST_LOG=hubd=debug hubd start
//! ```
//!
//! # Signal Handling
//!
//! - SIGTERM/SIGINT: graceful shutdown

use std::env;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hubd::config::{HubConfig, ADDR_ENV_VAR};
use hubd::registry::spawn_registry;
use hubd::server::HubServer;

/// Hub daemon - line-protocol chat server
#[derive(Parser, Debug)]
#[command(name = "hubd", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the hub
    Start {
        /// Run as a background daemon (fork to background)
        #[arg(short = 'd', long)]
        daemon: bool,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Interface to listen on (overrides config file)
        #[arg(long)]
        bind: Option<IpAddr>,

        /// Port to listen on (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop the running hub
    Stop,
    /// Show hub status
    Status,
}

/// Returns the path to the PID file.
fn pid_file_path() -> PathBuf {
    let state_dir = dirs::state_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("hubd");
    state_dir.join("hubd.pid")
}

/// Returns the path to the log file.
fn log_file_path() -> PathBuf {
    let state_dir = dirs::state_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("hubd");
    state_dir.join("hubd.log")
}

/// Reads the PID from the PID file, if it exists.
fn read_pid() -> Option<u32> {
    let path = pid_file_path();
    let mut file = File::open(&path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

/// Writes the current PID to the PID file.
fn write_pid() -> Result<()> {
    let path = pid_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create state directory")?;
    }
    let mut file = File::create(&path).context("Failed to create PID file")?;
    write!(file, "{}", process::id()).context("Failed to write PID")?;
    Ok(())
}

/// Removes the PID file.
fn remove_pid_file() {
    let path = pid_file_path();
    let _ = fs::remove_file(path);
}

/// Checks if a process with the given PID is running.
fn is_process_running(pid: u32) -> bool {
    PathBuf::from(format!("/proc/{}", pid)).exists()
}

/// Checks if the hub is already running.
fn is_hub_running() -> Option<u32> {
    if let Some(pid) = read_pid() {
        if is_process_running(pid) {
            return Some(pid);
        }
        // Stale PID file - remove it
        remove_pid_file();
    }
    None
}

/// Sends SIGTERM to the hub process.
fn stop_hub(pid: u32) -> Result<()> {
    #[cfg(unix)]
    {
        let result = unsafe { libc::kill(pid as i32, libc::SIGTERM) };
        if result != 0 {
            bail!("Failed to send SIGTERM to process {}", pid);
        }
    }
    #[cfg(not(unix))]
    {
        bail!("Stop command is only supported on Unix systems");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default to 'start' if no subcommand given
    let command = args.command.unwrap_or(Command::Start {
        daemon: false,
        config: None,
        bind: None,
        port: None,
    });

    match command {
        Command::Start {
            daemon,
            config,
            bind,
            port,
        } => {
            if let Some(pid) = is_hub_running() {
                eprintln!("Hub is already running (PID {})", pid);
                eprintln!("Use 'hubd stop' to stop it first.");
                process::exit(1);
            }

            let config = HubConfig::resolve(config.as_deref(), bind, port)
                .context("Failed to resolve configuration")?;

            if daemon {
                // Daemonize before starting the tokio runtime
                daemonize()?;
            }

            write_pid()?;

            let result = run_hub(config);

            remove_pid_file();

            result
        }
        Command::Stop => {
            if let Some(pid) = is_hub_running() {
                println!("Stopping hub (PID {})...", pid);
                stop_hub(pid)?;

                // Wait for the process to exit (up to 5 seconds)
                for _ in 0..50 {
                    if !is_process_running(pid) {
                        println!("Hub stopped.");
                        return Ok(());
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }

                eprintln!("Hub did not stop within 5 seconds.");
                process::exit(1);
            } else {
                println!("Hub is not running.");
                Ok(())
            }
        }
        Command::Status => {
            if let Some(pid) = is_hub_running() {
                println!("Hub is running (PID {})", pid);

                if let Ok(addr) = env::var(ADDR_ENV_VAR) {
                    println!("Address: {}", addr);
                }

                Ok(())
            } else {
                println!("Hub is not running.");
                process::exit(1);
            }
        }
    }
}

/// Daemonizes the current process.
fn daemonize() -> Result<()> {
    use daemonize::Daemonize;

    let log_path = log_file_path();

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let stdout = File::create(&log_path).context("Failed to create log file for stdout")?;
    let stderr = File::create(&log_path).context("Failed to create log file for stderr")?;

    let daemonize = Daemonize::new()
        .working_directory("/")
        .stdout(stdout)
        .stderr(stderr);

    daemonize.start().context("Failed to daemonize")?;

    Ok(())
}

/// Runs the hub (async entry point).
#[tokio::main]
async fn run_hub(config: HubConfig) -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hubd=info".parse()?)
                .add_directive("hub_core=info".parse()?)
                .add_directive("hub_protocol=info".parse()?),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        addr = %config.socket_addr(),
        "hub daemon starting"
    );

    // Cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Signal handlers
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    // Spawn the peer registry
    let registry = spawn_registry();
    info!("peer registry started");

    // Bind and run the server
    let server = HubServer::bind(
        config.socket_addr(),
        config.max_line_len,
        registry,
        cancel_token,
    )
    .await?;

    if let Err(e) = server.run().await {
        error!(error = %e, "server error");
        return Err(e.into());
    }

    info!("hub daemon stopped");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
