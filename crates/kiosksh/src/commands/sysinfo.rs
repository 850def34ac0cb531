//! Read-only system information commands
//!
//! `date`, `uptime`, `ps`, `df` and `free` each delegate to a fixed,
//! non-configurable sandboxed command line; operator arguments are
//! ignored, so there is nothing to sanitize. `version` and `info` are
//! answered in-process.

use async_trait::async_trait;

use super::{sandbox_text, Command, Context};
use crate::engine::Reply;
use crate::error::Result;

/// `date`: current date and time.
pub struct Date;

#[async_trait]
impl Command for Date {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["date"].map(String::from);
        let out = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(out.trim_end().to_string()))
    }
}

/// `uptime`: time since boot and load averages.
pub struct Uptime;

#[async_trait]
impl Command for Uptime {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["uptime"].map(String::from);
        let out = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(out.trim_end().to_string()))
    }
}

/// `ps`: running processes with a fixed column set.
pub struct Ps;

#[async_trait]
impl Command for Ps {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["ps", "-eo", "user,pid,ppid,cmd"].map(String::from);
        let out = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(out.trim_end().to_string()))
    }
}

/// `df`: mounted filesystem usage.
pub struct Df;

#[async_trait]
impl Command for Df {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["df", "-h"].map(String::from);
        let out = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(out.trim_end().to_string()))
    }
}

/// `free`: memory usage. Degrades to a friendly message on hosts without
/// the binary instead of surfacing a spawn error.
pub struct Free;

#[async_trait]
impl Command for Free {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["free", "-h"].map(String::from);
        let output = ctx.sandbox.run(&argv).await;
        if output.success() {
            return Ok(Reply::text(output.stdout.trim_end().to_string()));
        }
        if output.stderr.contains("failed to start") {
            return Ok(Reply::text(
                "memory usage information is not available on this platform",
            ));
        }
        Err(crate::error::Error::Sandbox(
            output.stderr.trim().to_string(),
        ))
    }
}

/// `version`: platform version from configuration, falling back to this
/// crate's own version.
pub struct Version;

#[async_trait]
impl Command for Version {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let version = ctx
            .config
            .get("general", "version")
            .map(|v| v.to_string())
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
        Ok(Reply::text(format!("kiosk platform v{version}")))
    }
}

/// `info`: static platform and runtime description.
pub struct Info;

#[async_trait]
impl Command for Info {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let info = format!(
            "System information:\n\
             -------------------\n\
             os:     {}\n\
             arch:   {}\n\
             family: {}\n\
             shell:  kiosksh {}\n\
             root:   {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::env::consts::FAMILY,
            env!("CARGO_PKG_VERSION"),
            ctx.sandbox.root().display(),
        );
        Ok(Reply::text(info))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{args, fixture};
    use super::*;
    use crate::config::{ConfigStore, ConfigValue};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_version_prefers_config() {
        let mut fx = fixture(false);
        fx.config.set("general", "version", ConfigValue::from("2.5.1"));
        let argv = args(&[]);
        let reply = Version.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "kiosk platform v2.5.1");
    }

    #[tokio::test]
    async fn test_version_falls_back_to_crate_version() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        let reply = Version.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(
            reply.to_string(),
            format!("kiosk platform v{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[tokio::test]
    async fn test_info_names_platform() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        let reply = Info.invoke(fx.context(&argv)).await.unwrap();
        let text = reply.to_string();
        assert!(text.contains(std::env::consts::OS));
        assert!(text.contains(std::env::consts::ARCH));
    }
}
