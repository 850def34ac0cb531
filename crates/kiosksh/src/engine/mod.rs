//! Dispatch engine for the restricted shell
//!
//! One [`ShellEngine`] per terminal session. `execute` is the single entry
//! point: it owns the whitelist, the bounded history, the sandbox session
//! and the collaborator handles, and is `&mut self` so the type system
//! enforces the one-in-flight-call contract without internal locking.

mod history;

pub use history::{HistoryLog, DEFAULT_HISTORY_CAPACITY};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::audit::{AuditRecord, AuditSink, Outcome};
use crate::auth::Authorizer;
use crate::commands::{CommandSpec, Context, HelpEntry, Tier};
use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::parser;
use crate::sandbox::CommandSandbox;

/// UI action requested from the caller.
///
/// The engine never acts on these itself; clearing a display or powering
/// off the machine is the hosting terminal's job. `Display` renders the
/// opaque wire tokens agreed with callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    ClearScreen,
    ExitTerminal,
    ShutdownSystem,
    RestartSystem,
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::ClearScreen => "CLEAR_SCREEN",
            Self::ExitTerminal => "EXIT_TERMINAL",
            Self::ShutdownSystem => "SHUTDOWN_SYSTEM",
            Self::RestartSystem => "RESTART_SYSTEM",
        };
        f.write_str(token)
    }
}

/// Result of one dispatched line: visible text (possibly empty) or a
/// control code for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Control(ControlCode),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Empty text: the command succeeded with no visible output.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Control(code) => write!(f, "{code}"),
        }
    }
}

struct Registered {
    tier: Tier,
    handler: Arc<dyn crate::commands::Command>,
}

/// Whitelisted command dispatcher with history, privilege gating and
/// audit logging. Construct through [`ShellBuilder`](crate::ShellBuilder).
pub struct ShellEngine {
    commands: HashMap<String, Registered>,
    catalog: Vec<HelpEntry>,
    history: HistoryLog,
    sandbox: CommandSandbox,
    config: Arc<dyn ConfigStore>,
    auth: Arc<dyn Authorizer>,
    audit: Arc<dyn AuditSink>,
}

impl ShellEngine {
    /// Create a builder for customized configuration.
    pub fn builder() -> crate::ShellBuilder {
        crate::ShellBuilder::default()
    }

    pub(crate) fn assemble(
        specs: Vec<CommandSpec>,
        sandbox: CommandSandbox,
        history_capacity: usize,
        config: Arc<dyn ConfigStore>,
        auth: Arc<dyn Authorizer>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let mut commands = HashMap::with_capacity(specs.len());
        let mut catalog = Vec::with_capacity(specs.len());

        for spec in specs {
            let name = spec.name.to_lowercase();
            if commands.contains_key(&name) {
                return Err(Error::DuplicateCommand(name));
            }
            catalog.push(HelpEntry {
                name: name.clone(),
                help: spec.help,
                tier: spec.tier,
                category: spec.category,
            });
            commands.insert(
                name,
                Registered {
                    tier: spec.tier,
                    handler: spec.handler,
                },
            );
        }

        Ok(Self {
            commands,
            catalog,
            history: HistoryLog::new(history_capacity),
            sandbox,
            config,
            auth,
            audit,
        })
    }

    /// Command history (read-only; mutated only inside `execute`).
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Sandbox session state (root, working directory, limits).
    pub fn sandbox(&self) -> &CommandSandbox {
        &self.sandbox
    }

    /// Whitelist metadata, in registration order.
    pub fn catalog(&self) -> &[HelpEntry] {
        &self.catalog
    }

    /// Parse, gate, dispatch and audit one input line.
    ///
    /// Every failure mode comes back as ordinary text: the engine itself
    /// never errors and a failed command never corrupts history, whitelist
    /// or session state.
    pub async fn execute(&mut self, line: &str) -> Reply {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Reply::empty();
        }

        // The raw line is recallable even when it fails to parse or
        // dispatch below.
        self.history.push(line);

        let user = self.auth.current_identity();

        let tokens = match parser::tokenize(trimmed) {
            Ok(tokens) => tokens,
            Err(e) => {
                self.audit
                    .record(&AuditRecord::failure(&user, trimmed, &[], e.to_string()));
                return Reply::text(format!("parse error: {e}"));
            }
        };
        let Some((first, rest)) = tokens.split_first() else {
            // Unreachable: a non-blank line always yields a word.
            return Reply::empty();
        };

        let name = first.to_lowercase();
        let args = rest.to_vec();

        let (tier, handler) = match self.commands.get(&name) {
            Some(registered) => (registered.tier, Arc::clone(&registered.handler)),
            None => {
                self.audit
                    .record(&AuditRecord::failure(&user, &name, &args, "not found"));
                return Reply::text(format!("Command not found: {name}"));
            }
        };

        if tier == Tier::Admin && !self.auth.is_authorized() {
            tracing::warn!(
                target: "kiosksh::engine",
                user = %user,
                command = %name,
                "admin command denied"
            );
            self.audit
                .record(&AuditRecord::failure(&user, &name, &args, "unauthorized"));
            return Reply::text("Error: this command requires administrative privileges");
        }

        // Pre-execution record: a pending entry with no matching terminal
        // entry identifies a command that started but never completed.
        self.audit
            .record(&AuditRecord::new(&user, &name, &args, Outcome::Pending));
        tracing::debug!(target: "kiosksh::engine", command = %name, "dispatching");

        let ctx = Context {
            args: &args,
            sandbox: &mut self.sandbox,
            history: &self.history,
            config: self.config.as_ref(),
            auth: self.auth.as_ref(),
            catalog: &self.catalog,
        };

        match handler.invoke(ctx).await {
            Ok(reply) => {
                self.audit
                    .record(&AuditRecord::new(&user, &name, &args, Outcome::Success));
                reply
            }
            Err(e) => {
                self.audit
                    .record(&AuditRecord::failure(&user, &name, &args, e.to_string()));
                Reply::text(format!("Error: {e}"))
            }
        }
    }
}
