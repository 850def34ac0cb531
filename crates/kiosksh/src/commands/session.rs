//! Session and terminal commands (clear, history, exit, logout,
//! shutdown, restart)
//!
//! `clear`, `exit`, `shutdown` and `restart` return control codes; the
//! hosting terminal acts on them, never the shell.

use async_trait::async_trait;

use super::{Command, Context};
use crate::engine::{ControlCode, Reply};
use crate::error::Result;

/// Asks the caller to clear its display.
pub struct Clear;

#[async_trait]
impl Command for Clear {
    async fn invoke(&self, _ctx: Context<'_>) -> Result<Reply> {
        Ok(Reply::Control(ControlCode::ClearScreen))
    }
}

/// Asks the caller to leave terminal mode.
pub struct Exit;

#[async_trait]
impl Command for Exit {
    async fn invoke(&self, _ctx: Context<'_>) -> Result<Reply> {
        Ok(Reply::Control(ControlCode::ExitTerminal))
    }
}

/// Shows the last N history lines (default 10), numbered from their
/// absolute position so entry numbers stay stable across eviction.
pub struct History;

#[async_trait]
impl Command for History {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let count = match ctx.args.first() {
            None => 10,
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return Ok(Reply::text("usage: history [count]")),
            },
        };

        if ctx.history.is_empty() {
            return Ok(Reply::text("no commands in history"));
        }

        let lines: Vec<String> = ctx
            .history
            .last_numbered(count)
            .into_iter()
            .map(|(position, line)| format!("{position}: {line}"))
            .collect();
        Ok(Reply::text(lines.join("\n")))
    }
}

/// Ends the current session through the authorization collaborator.
pub struct Logout;

#[async_trait]
impl Command for Logout {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let identity = ctx.auth.current_identity();
        ctx.auth.logout();
        Ok(Reply::text(format!("user {identity} logged out")))
    }
}

/// Two-step shutdown: bare invocation asks for confirmation, `--force`
/// returns the shutdown control code.
pub struct Shutdown;

#[async_trait]
impl Command for Shutdown {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        if ctx.args.first().map(String::as_str) == Some("--force") {
            return Ok(Reply::Control(ControlCode::ShutdownSystem));
        }
        Ok(Reply::text(
            "System shutdown requires confirmation. Use 'shutdown --force' to confirm.",
        ))
    }
}

/// Two-step restart, same contract as [`Shutdown`].
pub struct Restart;

#[async_trait]
impl Command for Restart {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        if ctx.args.first().map(String::as_str) == Some("--force") {
            return Ok(Reply::Control(ControlCode::RestartSystem));
        }
        Ok(Reply::text(
            "System restart requires confirmation. Use 'restart --force' to confirm.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{args, fixture};
    use super::*;
    use crate::auth::Authorizer;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_clear_and_exit_return_control_codes() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        assert_eq!(
            Clear.invoke(fx.context(&argv)).await.unwrap(),
            Reply::Control(ControlCode::ClearScreen)
        );
        assert_eq!(
            Exit.invoke(fx.context(&argv)).await.unwrap(),
            Reply::Control(ControlCode::ExitTerminal)
        );
    }

    #[tokio::test]
    async fn test_shutdown_requires_force() {
        let mut fx = fixture(true);
        let bare = args(&[]);
        let reply = Shutdown.invoke(fx.context(&bare)).await.unwrap();
        assert!(reply.to_string().contains("confirmation"));

        let forced = args(&["--force"]);
        assert_eq!(
            Shutdown.invoke(fx.context(&forced)).await.unwrap(),
            Reply::Control(ControlCode::ShutdownSystem)
        );
    }

    #[tokio::test]
    async fn test_restart_requires_force() {
        let mut fx = fixture(true);
        let forced = args(&["--force"]);
        assert_eq!(
            Restart.invoke(fx.context(&forced)).await.unwrap(),
            Reply::Control(ControlCode::RestartSystem)
        );
    }

    #[tokio::test]
    async fn test_history_numbers_from_absolute_position() {
        let mut fx = fixture(false);
        for line in ["echo one", "echo two", "echo three"] {
            fx.history.push(line);
        }
        let argv = args(&["2"]);
        let reply = History.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "2: echo two\n3: echo three");
    }

    #[tokio::test]
    async fn test_history_empty_and_bad_count() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        let reply = History.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "no commands in history");

        let argv = args(&["many"]);
        let reply = History.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "usage: history [count]");
    }

    #[tokio::test]
    async fn test_logout_reports_identity_and_drops_privileges() {
        let mut fx = fixture(true);
        let argv = args(&[]);
        let reply = Logout.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "user kiosk logged out");
        assert!(!fx.auth.is_authorized());
    }
}
