use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clipmesh_core::RoomCode;
use clipmesh_node::{Clipboard, Node, NodeConfig, NodeEvent};
use clipmesh_relay::RelayService;
use colored::*;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, io};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clipmesh")]
#[command(about = "Sync a text snippet between machines over peer-to-peer data channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a standalone signaling relay.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Start an embedded relay, create a room and join it.
    Host {
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Text file to watch and sync.
        #[arg(short, long, default_value = "clipmesh.txt")]
        file: PathBuf,
    },
    /// Join a room on an existing relay.
    Join {
        /// Six-digit room code.
        code: String,

        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        server: String,

        /// Text file to watch and sync.
        #[arg(short, long, default_value = "clipmesh.txt")]
        file: PathBuf,
    },
}

/// File-backed content source: every poll reads the whole file, every
/// remote update rewrites it. A missing file reads as empty.
struct FileClipboard {
    path: PathBuf,
}

impl Clipboard for FileClipboard {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve { port } => {
            let addr: SocketAddr = ([0, 0, 0, 0], port).into();
            println!("{} {}", "Signaling relay on".green().bold(), addr);
            clipmesh_relay::serve(addr, RelayService::new()).await
        }
        Commands::Host { port, file } => {
            let addr: SocketAddr = ([0, 0, 0, 0], port).into();
            clipmesh_relay::spawn(addr, RelayService::new()).await?;

            let code = RoomCode::generate();
            println!(
                "{} {}",
                "Room code:".green().bold(),
                code.to_string().yellow().bold()
            );
            println!("Others join with: clipmesh join {} --server http://<this-host>:{}", code, port);

            run_node(NodeConfig::new(format!("http://127.0.0.1:{port}"), code), file).await
        }
        Commands::Join { code, server, file } => {
            let code: RoomCode = code
                .parse()
                .context("room codes are exactly six digits, e.g. 482913")?;
            run_node(NodeConfig::new(server, code), file).await
        }
    }
}

async fn run_node(config: NodeConfig, file: PathBuf) -> Result<()> {
    let clipboard = Arc::new(FileClipboard { path: file.clone() });
    let mut node = Node::start(config, clipboard).await?;

    println!("{} {}", "Peer id:".bold(), node.local_id());
    println!(
        "Syncing {}. Press Ctrl-C to quit.",
        file.display().to_string().cyan()
    );

    let mut events = node.events().context("event stream already taken")?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Shutting down...".yellow());
                node.shutdown().await;
                return Ok(());
            }
            event = events.recv() => match event {
                Some(NodeEvent::PeerCountChanged { connected, total }) => {
                    println!(
                        "{} {} of {} peers connected",
                        "•".green(),
                        connected,
                        total
                    );
                }
                Some(NodeEvent::Message { .. }) => {}
                None => return Ok(()),
            },
        }
    }
}
