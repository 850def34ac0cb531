//! Kiosksh CLI - terminal front-end for the restricted kiosk shell
//!
//! Usage:
//!   kiosksh -c 'echo hello'        # Execute one command line
//!   kiosksh --admin                # Interactive session with admin tier
//!   kiosksh --audit-log audit.log  # Append audit records as JSON lines
//!
//! Line editing is deliberately plain (stdin lines, no readline): the
//! shell is normally embedded behind a kiosk terminal widget, and this
//! binary exists for operating and testing it directly.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kiosksh::{ControlCode, JsonLinesSink, Reply, ShellEngine, StaticAuthorizer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Kiosksh - restricted command shell
#[derive(Parser, Debug)]
#[command(name = "kiosksh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Execute the given command line and exit
    #[arg(short = 'c')]
    command: Option<String>,

    /// Session root directory (defaults to the current directory)
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Acting user identity for audit records
    #[arg(long, default_value = "operator")]
    user: String,

    /// Start the session with admin privileges
    #[arg(long)]
    admin: bool,

    /// Append audit records to this file as JSON lines
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Command history capacity
    #[arg(long, default_value_t = 100)]
    history: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut builder = ShellEngine::builder()
        .history_capacity(args.history)
        .authorizer(Arc::new(StaticAuthorizer::new(&args.user, args.admin)));
    if let Some(dir) = &args.workdir {
        builder = builder.working_dir(dir);
    }
    if let Some(path) = &args.audit_log {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open audit log {}", path.display()))?;
        builder = builder.audit(Arc::new(JsonLinesSink::new(file)));
    }
    let mut shell = builder.build().context("Failed to start shell session")?;

    // One-shot mode: print the reply (control codes as their wire tokens)
    if let Some(line) = args.command {
        let reply = shell.execute(&line).await;
        if !reply.is_empty() {
            println!("{reply}");
        }
        return Ok(());
    }

    // Interactive line loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("kiosk> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };

        match shell.execute(&line).await {
            Reply::Control(ControlCode::ClearScreen) => print!("\x1b[2J\x1b[H"),
            Reply::Control(ControlCode::ExitTerminal) => break,
            Reply::Control(code) => {
                // Shutdown/restart are the hosting system's job; hand the
                // token up and end the session.
                println!("{code}");
                break;
            }
            Reply::Text(text) => {
                if !text.is_empty() {
                    println!("{text}");
                }
            }
        }
    }

    Ok(())
}
