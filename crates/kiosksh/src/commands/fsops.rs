//! File system commands (ls, pwd, cd, cat)
//!
//! All of these delegate to the sandbox. Path arguments are gated: a
//! session without admin privileges may not name absolute paths, and
//! `..`-traversal past the session root is rejected before anything runs.

use async_trait::async_trait;

use super::{sandbox_text, Command, Context};
use crate::engine::Reply;
use crate::error::Result;

/// `ls [path]`: sandboxed `ls -la`.
pub struct Ls;

#[async_trait]
impl Command for Ls {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let path = ctx.args.first().map(String::as_str).unwrap_or(".");
        ctx.sandbox.confine(path, ctx.admin())?;

        let argv = ["ls", "-la", path].map(String::from);
        let listing = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(listing.trim_end().to_string()))
    }
}

/// `pwd`: sandboxed `pwd`, which prints the session working directory.
pub struct Pwd;

#[async_trait]
impl Command for Pwd {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let argv = ["pwd"].map(String::from);
        let cwd = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(cwd.trim_end().to_string()))
    }
}

/// `cd [path]`: validates the destination and moves the session working
/// directory. The only command that mutates sandbox state.
pub struct Cd;

#[async_trait]
impl Command for Cd {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let target = ctx.args.first().map(String::as_str).unwrap_or(".");
        let admin = ctx.admin();
        let new_dir = ctx.sandbox.enter_dir(target, admin).await?;
        Ok(Reply::text(format!(
            "current directory: {}",
            new_dir.display()
        )))
    }
}

/// `cat <file>`: sandboxed `cat` of exactly one file.
pub struct Cat;

#[async_trait]
impl Command for Cat {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let Some(path) = ctx.args.first() else {
            return Ok(Reply::text("usage: cat <file>"));
        };
        ctx.sandbox.confine(path, ctx.admin())?;

        let argv = ["cat", path.as_str()].map(String::from);
        let contents = sandbox_text(ctx.sandbox, &argv).await?;
        Ok(Reply::text(contents))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{args, fixture};
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_cat_without_argument_is_usage() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        let reply = Cat.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "usage: cat <file>");
    }

    #[tokio::test]
    async fn test_cat_absolute_path_requires_admin() {
        let mut fx = fixture(false);
        let argv = args(&["/etc/passwd"]);
        let err = Cat.invoke(fx.context(&argv)).await.unwrap_err();
        assert!(matches!(err, Error::AbsolutePath));
    }

    #[tokio::test]
    async fn test_ls_traversal_past_root_is_rejected() {
        let mut fx = fixture(false);
        let depth = fx.sandbox.root().components().count();
        let escape = "../".repeat(depth + 2);
        let argv = args(&[&escape]);
        let err = Ls.invoke(fx.context(&argv)).await.unwrap_err();
        assert!(matches!(err, Error::OutsideRoot(_)));
    }

    #[tokio::test]
    async fn test_cd_missing_directory_leaves_state_unchanged() {
        let mut fx = fixture(false);
        let before = fx.sandbox.working_dir().to_path_buf();
        let argv = args(&["no-such-dir"]);
        let err = Cd.invoke(fx.context(&argv)).await.unwrap_err();
        assert!(matches!(err, Error::DirNotFound(_)));
        assert_eq!(fx.sandbox.working_dir(), before);
    }

    #[tokio::test]
    async fn test_cd_into_subdir_and_back() {
        let mut fx = fixture(false);
        std::fs::create_dir(fx.dir.path().join("logs")).unwrap();
        let root = fx.sandbox.root().to_path_buf();

        let argv = args(&["logs"]);
        let reply = Cd.invoke(fx.context(&argv)).await.unwrap();
        assert!(reply.to_string().ends_with("/logs"));
        assert_eq!(fx.sandbox.working_dir(), root.join("logs"));

        let argv = args(&[".."]);
        Cd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(fx.sandbox.working_dir(), root);
    }

    #[tokio::test]
    async fn test_cd_file_is_not_a_directory() {
        let mut fx = fixture(false);
        std::fs::write(fx.dir.path().join("note.txt"), "x").unwrap();
        let argv = args(&["note.txt"]);
        let err = Cd.invoke(fx.context(&argv)).await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
