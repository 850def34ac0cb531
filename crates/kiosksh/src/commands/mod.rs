//! Built-in shell commands
//!
//! This module provides the [`Command`] trait for implementing whitelisted
//! commands and the [`Context`] struct for execution state. The default
//! catalogue is assembled by `default_commands` and registered once at
//! engine construction; there is no runtime re-registration.
//!
//! # Custom commands
//!
//! Implement the [`Command`] trait and register through
//! [`ShellBuilder::command`](crate::ShellBuilder::command):
//!
//! ```rust
//! use kiosksh::{async_trait, Category, Command, CommandSpec, Context, Reply, Tier};
//! use std::sync::Arc;
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl Command for Greet {
//!     async fn invoke(&self, ctx: Context<'_>) -> kiosksh::Result<Reply> {
//!         let name = ctx.args.first().map(String::as_str).unwrap_or("operator");
//!         Ok(Reply::text(format!("hello, {name}")))
//!     }
//! }
//!
//! let spec = CommandSpec::new("greet", "Greet the operator", Tier::Public,
//!     Category::General, Arc::new(Greet));
//! ```

mod admin;
mod echo;
mod fsops;
mod help;
mod session;
mod sysinfo;

pub use admin::{ConfigCmd, LogCmd, Plugin};
pub use echo::Echo;
pub use fsops::{Cat, Cd, Ls, Pwd};
pub use help::Help;
pub use session::{Clear, Exit, History, Logout, Restart, Shutdown};
pub use sysinfo::{Date, Df, Free, Info, Ps, Uptime, Version};

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::Authorizer;
use crate::config::ConfigStore;
use crate::engine::{HistoryLog, Reply};
use crate::error::Result;
use crate::sandbox::CommandSandbox;

/// Privilege tier required to dispatch a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Any caller.
    Public,
    /// Requires a positive authorization check before dispatch.
    Admin,
}

/// Help-listing category, mirroring the kiosk terminal's grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    General,
    FileSystem,
    SystemInfo,
    Administration,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::FileSystem => "File System",
            Self::SystemInfo => "System Info",
            Self::Administration => "Administration",
        }
    }
}

/// One whitelist entry: name, handler, help text, tier, category.
pub struct CommandSpec {
    pub name: String,
    pub help: String,
    pub tier: Tier,
    pub category: Category,
    pub handler: Arc<dyn Command>,
}

impl CommandSpec {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        tier: Tier,
        category: Category,
        handler: Arc<dyn Command>,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            tier,
            category,
            handler,
        }
    }
}

/// Whitelist metadata visible to handlers (the `help` command renders it).
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub name: String,
    pub help: String,
    pub tier: Tier,
    pub category: Category,
}

/// Execution context for one command invocation.
///
/// Built by the engine from its own state for each dispatch; handlers
/// never see the engine itself.
pub struct Context<'a> {
    /// Positional arguments (not including the command name).
    pub args: &'a [String],

    /// Session sandbox; `cd` mutates its working directory.
    pub sandbox: &'a mut CommandSandbox,

    /// Read access to the command history.
    pub history: &'a HistoryLog,

    /// Host configuration collaborator.
    pub config: &'a dyn ConfigStore,

    /// Authorization collaborator.
    pub auth: &'a dyn Authorizer,

    /// Whitelist metadata for help rendering.
    pub catalog: &'a [HelpEntry],
}

impl Context<'_> {
    /// Whether the acting session currently holds admin privileges.
    /// Path-gated commands consult this for absolute-path arguments.
    pub fn admin(&self) -> bool {
        self.auth.is_authorized()
    }
}

/// Trait for whitelisted commands.
///
/// Handlers return `Ok` with their visible output (possibly empty, or a
/// control code), or `Err` for failures the dispatch boundary converts to
/// `Error: <message>` and audits. Argument-count problems are ordinary
/// output: return the usage string, don't error.
#[async_trait]
pub trait Command: Send + Sync {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply>;
}

/// Run a fixed sandboxed command line and return its stdout, converting a
/// nonzero exit into a handler error carrying the child's stderr.
pub(crate) async fn sandbox_text(sandbox: &CommandSandbox, argv: &[String]) -> Result<String> {
    let output = sandbox.run(argv).await;
    if output.success() {
        return Ok(output.stdout);
    }
    let detail = output.stderr.trim();
    if detail.is_empty() {
        return Err(crate::error::Error::Sandbox(format!(
            "{} failed with exit code {}",
            argv[0], output.exit_code
        )));
    }
    Err(crate::error::Error::Sandbox(detail.to_string()))
}

/// The default whitelist, in the kiosk terminal's registration order.
pub(crate) fn default_commands() -> Vec<CommandSpec> {
    use Category::*;
    use Tier::*;

    fn spec(
        name: &str,
        help: &str,
        tier: Tier,
        category: Category,
        handler: Arc<dyn Command>,
    ) -> CommandSpec {
        CommandSpec::new(name, help, tier, category, handler)
    }

    vec![
        // Help and information
        spec("help", "Display help information", Public, General, Arc::new(Help)),
        spec("echo", "Display text", Public, General, Arc::new(Echo)),
        spec("version", "Display platform version", Public, General, Arc::new(Version)),
        spec("info", "Display platform information", Public, General, Arc::new(Info)),
        // Terminal
        spec("clear", "Clear the terminal screen", Public, General, Arc::new(Clear)),
        spec("history", "Display command history", Public, General, Arc::new(History)),
        // File system (restricted)
        spec("ls", "List directory contents", Public, FileSystem, Arc::new(Ls)),
        spec("pwd", "Show current directory", Public, FileSystem, Arc::new(Pwd)),
        spec("cd", "Change directory", Public, FileSystem, Arc::new(Cd)),
        spec("cat", "Display file contents", Public, FileSystem, Arc::new(Cat)),
        // System information
        spec("date", "Display current date and time", Public, SystemInfo, Arc::new(Date)),
        spec("uptime", "Display system uptime", Public, SystemInfo, Arc::new(Uptime)),
        spec("ps", "List running processes", Public, SystemInfo, Arc::new(Ps)),
        spec("df", "Display disk usage", Public, SystemInfo, Arc::new(Df)),
        spec("free", "Display memory usage", Public, SystemInfo, Arc::new(Free)),
        // Administration
        spec("log", "View or modify log settings (admin)", Admin, Administration, Arc::new(LogCmd)),
        spec("plugin", "Manage plugins (admin)", Admin, Administration, Arc::new(Plugin)),
        spec("config", "View or edit configuration (admin)", Admin, Administration, Arc::new(ConfigCmd)),
        // Session control
        spec("exit", "Exit terminal mode", Public, Administration, Arc::new(Exit)),
        spec("logout", "Log out the current user", Public, Administration, Arc::new(Logout)),
        spec("shutdown", "Shut down the system (admin)", Admin, Administration, Arc::new(Shutdown)),
        spec("restart", "Restart the system (admin)", Admin, Administration, Arc::new(Restart)),
    ]
}
