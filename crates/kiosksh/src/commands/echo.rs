//! echo command

use async_trait::async_trait;

use super::{Command, Context};
use crate::engine::Reply;
use crate::error::Result;

/// Joins its arguments with single spaces. Quoting in the input line is
/// already resolved by the tokenizer, so `echo a "b c"` yields `a b c`.
pub struct Echo;

#[async_trait]
impl Command for Echo {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        Ok(Reply::text(ctx.args.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{args, fixture};
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_echo_joins_with_single_space() {
        let mut fx = fixture(false);
        let argv = args(&["a", "b c", "d"]);
        let reply = Echo.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply, Reply::text("a b c d"));
    }

    #[tokio::test]
    async fn test_echo_no_args_is_empty() {
        let mut fx = fixture(false);
        let argv = args(&[]);
        let reply = Echo.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply, Reply::text(""));
    }
}
