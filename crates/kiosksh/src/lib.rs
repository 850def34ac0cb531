//! Kiosksh - Restricted command shell for locked-down kiosk terminals
//!
//! A whitelisted command interpreter: every input line is tokenized,
//! checked against a closed set of registered commands, privilege-gated,
//! executed (builtins in-process, OS commands through a sandbox with a
//! scrubbed environment and hard timeout), audited, and recorded in a
//! bounded history. Nothing outside the whitelist ever runs, and no shell
//! interpreter is ever invoked.
//!
//! # Example
//!
//! ```rust
//! use kiosksh::{Reply, ShellEngine};
//!
//! #[tokio::main]
//! async fn main() -> kiosksh::Result<()> {
//!     let mut shell = ShellEngine::builder().build()?;
//!     let reply = shell.execute("echo hello operator").await;
//!     assert_eq!(reply, Reply::text("hello operator"));
//!     Ok(())
//! }
//! ```
//!
//! The windowing layer, plugin loader, and authentication system of the
//! hosting kiosk are collaborators, injected at construction: see
//! [`Authorizer`], [`ConfigStore`] and [`AuditSink`].

pub mod audit;
pub mod auth;
pub mod commands;
pub mod config;
mod engine;
mod error;
mod parser;
mod sandbox;

pub use audit::{AuditRecord, AuditSink, JsonLinesSink, MemorySink, Outcome, TracingSink};
pub use auth::{Authorizer, StaticAuthorizer};
pub use commands::{Category, Command, CommandSpec, Context, HelpEntry, Tier};
pub use config::{ConfigStore, ConfigValue, MemoryConfig};
pub use engine::{ControlCode, HistoryLog, Reply, ShellEngine, DEFAULT_HISTORY_CAPACITY};
pub use error::{Error, Result};
pub use parser::ParseError;
pub use sandbox::{CommandSandbox, ExecLimits, ExecOutput, TIMEOUT_EXIT_CODE};

// Re-exported for custom command implementations.
pub use async_trait::async_trait;

use std::path::PathBuf;
use std::sync::Arc;

/// Builder for customized [`ShellEngine`] configuration.
///
/// Defaults: current directory as session root, deny-all authorization,
/// in-memory configuration, tracing-backed audit sink, history capacity
/// of [`DEFAULT_HISTORY_CAPACITY`].
#[derive(Default)]
pub struct ShellBuilder {
    working_dir: Option<PathBuf>,
    history_capacity: Option<usize>,
    limits: Option<ExecLimits>,
    config: Option<Arc<dyn ConfigStore>>,
    auth: Option<Arc<dyn Authorizer>>,
    audit: Option<Arc<dyn AuditSink>>,
    commands: Vec<CommandSpec>,
}

impl ShellBuilder {
    /// Set the session root and initial working directory. Must exist;
    /// it is canonicalized at build time.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the history capacity.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Set sandbox execution limits (timeout, output cap).
    pub fn limits(mut self, limits: ExecLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Inject the configuration collaborator.
    pub fn config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject the authorization collaborator.
    pub fn authorizer(mut self, auth: Arc<dyn Authorizer>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Inject the audit sink.
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Register an additional command alongside the default catalogue.
    pub fn command(mut self, spec: CommandSpec) -> Self {
        self.commands.push(spec);
        self
    }

    /// Build the engine. Fails on a missing working directory or a
    /// duplicate command name.
    pub fn build(self) -> Result<ShellEngine> {
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let sandbox = CommandSandbox::new(working_dir, self.limits.unwrap_or_default())?;

        let mut specs = commands::default_commands();
        specs.extend(self.commands);

        ShellEngine::assemble(
            specs,
            sandbox,
            self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY),
            self.config
                .unwrap_or_else(|| Arc::new(MemoryConfig::new())),
            self.auth
                .unwrap_or_else(|| Arc::new(StaticAuthorizer::deny_all())),
            self.audit.unwrap_or_else(|| Arc::new(TracingSink::new())),
        )
    }
}
