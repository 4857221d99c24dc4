//! relay-remote: a command-line companion for the WristRelay desktop.
//!
//! ```text
//! relay-remote send gesture scroll_down scroll_down tap
//! relay-remote --connect 192.168.1.20:47801 send anki_action anki_3
//! relay-remote interactive          # then type: gesture back
//! relay-remote actions
//! ```

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_core::protocol::discovery::DEFAULT_DISCOVERY_PORT;
use relay_core::{RelayCommand, RelayMessage};
use relay_remote::discovery::BROADCAST;
use relay_remote::{discover, RelaySender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// WristRelay companion CLI.
#[derive(Debug, Parser)]
#[command(
    name = "relay-remote",
    about = "Send gesture and flashcard commands to a WristRelay desktop",
    version
)]
struct Cli {
    /// Address the discovery probe is sent to.
    #[arg(long, default_value_t = BROADCAST, env = "RELAY_REMOTE_HOST")]
    host: IpAddr,

    /// UDP discovery port.
    #[arg(long, default_value_t = DEFAULT_DISCOVERY_PORT, env = "RELAY_REMOTE_DISCOVERY_PORT")]
    discovery_port: u16,

    /// How long to wait for a discovery reply, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    timeout_ms: u64,

    /// Skip discovery and connect to this session address directly.
    #[arg(long, env = "RELAY_REMOTE_CONNECT")]
    connect: Option<SocketAddr>,

    /// Device name announced in the discovery probe.
    #[arg(long, default_value = "relay-remote")]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one record per ACTION, all with the same TYPE.
    Send {
        /// `gesture` or `anki_action`.
        #[arg(value_name = "TYPE")]
        kind: String,
        #[arg(required = true)]
        actions: Vec<String>,
    },
    /// Read `TYPE ACTION` lines from stdin and send each one.
    Interactive,
    /// Print every recognised TYPE/ACTION pair.
    Actions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Actions = cli.command {
        for command in RelayCommand::all() {
            let msg = RelayMessage::from(command);
            println!("{} {}", msg.kind, msg.action);
        }
        return Ok(());
    }

    let session_addr = match cli.connect {
        Some(addr) => addr,
        None => {
            let target = SocketAddr::new(cli.host, cli.discovery_port);
            let desk = discover(target, &cli.name, Duration::from_millis(cli.timeout_ms))
                .await
                .with_context(|| format!("discovery via {target} failed"))?;
            info!("found {} at {}", desk.host_name, desk.session_addr);
            desk.session_addr
        }
    };

    let mut sender = RelaySender::connect(session_addr).await?;

    match cli.command {
        Command::Send { kind, actions } => {
            for action in actions {
                send_one(&mut sender, RelayMessage::new(kind.clone(), action)).await?;
            }
        }
        Command::Interactive => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match parse_line(&line) {
                    Some(msg) => send_one(&mut sender, msg).await?,
                    None if line.trim().is_empty() => {}
                    None => warn!("expected `TYPE ACTION`, got {line:?}"),
                }
            }
        }
        Command::Actions => {}
    }

    sender.close().await?;
    Ok(())
}

async fn send_one(sender: &mut RelaySender, msg: RelayMessage) -> anyhow::Result<()> {
    if msg.command().is_none() {
        warn!(
            "{} {} is not a recognised command; the desktop will ignore it",
            msg.kind, msg.action
        );
    }
    sender
        .send(&msg)
        .await
        .with_context(|| format!("failed to send {} {}", msg.kind, msg.action))
}

/// Parses `TYPE ACTION`, ignoring surrounding whitespace.
fn parse_line(line: &str) -> Option<RelayMessage> {
    let mut parts = line.split_whitespace();
    let kind = parts.next()?;
    let action = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(RelayMessage::new(kind, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_accepts_type_and_action() {
        assert_eq!(
            parse_line("  gesture   play_pause "),
            Some(RelayMessage::new("gesture", "play_pause"))
        );
    }

    #[test]
    fn test_parse_line_rejects_wrong_arity() {
        assert_eq!(parse_line("gesture"), None);
        assert_eq!(parse_line("gesture tap extra"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_cli_defaults_probe_broadcast_address() {
        let cli = Cli::parse_from(["relay-remote", "send", "gesture", "tap"]);

        assert_eq!(cli.host, BROADCAST);
        assert_eq!(cli.discovery_port, 47800);
        assert!(cli.connect.is_none());
        assert!(matches!(cli.command, Command::Send { ref actions, .. } if actions == &["tap"]));
    }

    #[test]
    fn test_send_requires_at_least_one_action() {
        let result = Cli::try_parse_from(["relay-remote", "send", "gesture"]);
        assert!(result.is_err());
    }
}
