//! WristRelay desktop daemon entry point.
//!
//! Wires together configuration, the input simulator, the discovery
//! responder, and the session listener, then runs the dispatch loop until
//! Ctrl-C.
//!
//! ```text
//! main()
//!  ├─ load_config() + CLI overrides
//!  ├─ native_simulator()           -- CoreGraphics / SendInput / XTest / dry run
//!  ├─ SessionListener::bind()      -- TCP, one companion at a time
//!  ├─ start_discovery_responder()  -- UDP, answers probes while listening
//!  ├─ console task                 -- `pause` / `resume` / `status` on stdin
//!  └─ DispatchLoop::run()          -- the only place input is simulated
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use relay_desktop::application::dispatch_action::DispatchActionUseCase;
use relay_desktop::application::session_state::StatusSnapshot;
use relay_desktop::daemon::DispatchLoop;
use relay_desktop::infrastructure::input_simulation::native_simulator;
use relay_desktop::infrastructure::network::discovery::{
    start_discovery_responder, DiscoveryConfig,
};
use relay_desktop::infrastructure::network::peers::PeerDirectory;
use relay_desktop::infrastructure::network::session::{SessionHandle, SessionListener};
use relay_desktop::infrastructure::storage::config::{
    config_file_path, load_config, load_config_from, save_config_to, AppConfig,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// WristRelay desktop daemon.
///
/// Accepts gesture and flashcard commands from a companion device and turns
/// them into keyboard, scroll, and media key input.
#[derive(Debug, Parser)]
#[command(
    name = "relay-desktop",
    about = "Relay wearable gestures to simulated keyboard, scroll, and media input",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// TCP port for the command session.
    #[arg(long, env = "RELAY_SESSION_PORT")]
    session_port: Option<u16>,

    /// UDP port for discovery probes.
    #[arg(long, env = "RELAY_DISCOVERY_PORT")]
    discovery_port: Option<u16>,

    /// IP address to bind both sockets to.
    #[arg(long, env = "RELAY_BIND")]
    bind: Option<String>,

    /// Name advertised to companions.
    #[arg(long, env = "RELAY_HOST_NAME")]
    host_name: Option<String>,

    /// Log simulated input instead of posting it.
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration (file plus flags) to the config file
    /// and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides on top.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => load_config().context("failed to load config")?,
        };

        if let Some(port) = self.session_port {
            config.network.session_port = port;
        }
        if let Some(port) = self.discovery_port {
            config.network.discovery_port = port;
        }
        if let Some(bind) = &self.bind {
            config.network.bind_address = bind.clone();
        }
        if let Some(name) = &self.host_name {
            config.desktop.host_name = name.clone();
        }
        if self.dry_run {
            config.desktop.dry_run = true;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// Saves `config` to `--config`, or to the platform config file.
    fn save_effective_config(&self, config: &AppConfig) -> anyhow::Result<PathBuf> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => config_file_path().context("failed to locate config file")?,
        };
        save_config_to(config, &path)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(path)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.write_config {
        let path = cli.save_effective_config(&config)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.desktop.log_level)),
        )
        .init();

    info!("WristRelay desktop starting as {:?}", config.desktop.host_name);

    let simulator =
        native_simulator(config.desktop.dry_run).context("failed to initialise input simulation")?;
    let use_case = DispatchActionUseCase::new(simulator, config.input.scroll_lines);

    let running = Arc::new(AtomicBool::new(true));
    let advertising = Arc::new(AtomicBool::new(true));
    let peers = PeerDirectory::new();

    // ── Session listener ──────────────────────────────────────────────────────
    let bind_ip = config.bind_ip()?;
    let listener = SessionListener::bind(SocketAddr::new(bind_ip, config.network.session_port))
        .await
        .context("failed to start session listener")?;
    let session_port = listener.local_addr().port();
    let (handle, events) = listener.start(peers.clone(), Arc::clone(&advertising));

    // ── Discovery ─────────────────────────────────────────────────────────────
    let mut discovery = start_discovery_responder(
        DiscoveryConfig {
            bind_address: bind_ip,
            discovery_port: config.network.discovery_port,
            host_name: config.desktop.host_name.clone(),
            session_port,
        },
        peers,
        Arc::clone(&running),
        Arc::clone(&advertising),
    )
    .context("failed to start discovery responder")?;
    tokio::spawn(async move {
        while let Some(event) = discovery.events.recv().await {
            info!("discovered by {} ({})", event.device_name, event.peer);
        }
    });

    // ── Dispatch loop ─────────────────────────────────────────────────────────
    let (dispatch, status) = DispatchLoop::new(use_case);
    tokio::spawn(console(spawn_stdin_reader(), handle.clone(), status));

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let shutdown_handle = handle.clone();
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                running_clone.store(false, Ordering::Relaxed);
                shutdown_handle.shutdown().await;
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    info!("ready; waiting for a companion on TCP port {session_port}");
    let final_state = dispatch.run(events).await;

    running.store(false, Ordering::Relaxed);
    info!(
        "WristRelay desktop stopped (last action: {})",
        final_state.last_action().unwrap_or("none")
    );
    Ok(())
}

/// Forwards stdin lines from a plain OS thread.
///
/// Tokio's own stdin runs its blocking read on the runtime's blocking pool,
/// and runtime shutdown waits for that read to finish, so Ctrl-C would hang
/// until the next newline.  A detached thread does not hold up process exit.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("relay-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!("console disabled: failed to spawn stdin thread: {e}");
    }
    rx
}

/// Runs operator commands read from stdin.
///
/// This is the headless stand-in for a menu-bar toggle; when stdin is closed
/// (running as a service) the task simply ends.
async fn console(
    mut lines: mpsc::Receiver<String>,
    handle: SessionHandle,
    status: watch::Receiver<StatusSnapshot>,
) {
    while let Some(line) = lines.recv().await {
        let result = match line.trim() {
            "" => Ok(()),
            "pause" | "stop" => handle.stop_listening().await,
            "resume" | "start" => handle.start_listening().await,
            "status" => {
                let snap = status.borrow().clone();
                match serde_json::to_string(&snap) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!("failed to render status: {e}"),
                }
                Ok(())
            }
            other => {
                warn!("unknown console command {other:?} (try pause, resume, status)");
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("console command failed: {e}");
            break;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use relay_desktop::application::session_state::SessionState;
    use relay_desktop::infrastructure::network::session::SessionEvent;

    #[test]
    fn test_cli_without_flags_overrides_nothing() {
        // Arrange
        let cli = Cli::parse_from(["relay-desktop"]);

        // Assert
        assert!(cli.config.is_none());
        assert!(cli.session_port.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        // Arrange – point at a file that does not exist so defaults load
        let missing = std::env::temp_dir().join("relay-desktop-missing-config.toml");
        let cli = Cli::parse_from([
            "relay-desktop",
            "--config",
            missing.to_str().unwrap(),
            "--session-port",
            "9100",
            "--bind",
            "127.0.0.1",
            "--host-name",
            "desk",
            "--dry-run",
        ]);

        // Act
        let config = cli.resolve_config().unwrap();

        // Assert
        assert_eq!(config.network.session_port, 9100);
        assert_eq!(config.network.discovery_port, 47800);
        assert_eq!(config.network.bind_address, "127.0.0.1");
        assert_eq!(config.desktop.host_name, "desk");
        assert!(config.desktop.dry_run);
    }

    #[test]
    fn test_write_config_saves_effective_settings() {
        // Arrange
        let path = std::env::temp_dir()
            .join(format!("relay-desktop-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let cli = Cli::parse_from([
            "relay-desktop",
            "--config",
            path.to_str().unwrap(),
            "--session-port",
            "9200",
            "--host-name",
            "studio",
            "--write-config",
        ]);
        let config = cli.resolve_config().unwrap();

        // Act
        let written = cli.save_effective_config(&config).unwrap();

        // Assert
        assert!(cli.write_config);
        assert_eq!(written, path);
        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.network.session_port, 9200);
        assert_eq!(reloaded.desktop.host_name, "studio");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_invalid_bind_override_is_rejected() {
        let missing = std::env::temp_dir().join("relay-desktop-missing-config.toml");
        let cli = Cli::parse_from([
            "relay-desktop",
            "--config",
            missing.to_str().unwrap(),
            "--bind",
            "localhost:80",
        ]);

        assert!(cli.resolve_config().is_err());
    }

    #[tokio::test]
    async fn test_console_pause_and_resume_drive_the_listener() {
        // Arrange
        let listener = SessionListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let (handle, mut events) =
            listener.start(PeerDirectory::new(), Arc::new(AtomicBool::new(true)));
        let (_status_tx, status) = watch::channel(SessionState::new().snapshot());
        let (tx, lines) = mpsc::channel(8);
        for line in ["pause", "status", "bogus", "resume", "pause"] {
            tx.send(line.to_string()).await.unwrap();
        }
        drop(tx);

        // Act – returns once the line channel is closed
        console(lines, handle.clone(), status).await;

        // Assert
        let mut changes = Vec::new();
        for _ in 0..3 {
            match events.recv().await {
                Some(SessionEvent::ListeningChanged(on)) => changes.push(on),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(changes, vec![false, true, false]);
        assert!(!handle.is_listening());
    }
}
