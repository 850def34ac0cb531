//! help command

use async_trait::async_trait;

use super::{Category, Command, Context};
use crate::engine::Reply;
use crate::error::Result;

/// With no arguments, renders the full whitelist grouped by category; with
/// one argument, the help line for exactly that command.
pub struct Help;

#[async_trait]
impl Command for Help {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        if let Some(arg) = ctx.args.first() {
            let wanted = arg.to_lowercase();
            let line = match ctx.catalog.iter().find(|entry| entry.name == wanted) {
                Some(entry) => format!("{}: {}", entry.name, entry.help),
                None => format!("No help available for '{wanted}'"),
            };
            return Ok(Reply::text(line));
        }

        let mut out = String::from("Available commands:\n------------------\n");
        for category in [
            Category::General,
            Category::FileSystem,
            Category::SystemInfo,
            Category::Administration,
        ] {
            let entries: Vec<_> = ctx
                .catalog
                .iter()
                .filter(|entry| entry.category == category)
                .collect();
            if entries.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{}:\n", category.label()));
            for entry in entries {
                out.push_str(&format!("  {:<10} - {}\n", entry.name, entry.help));
            }
        }
        Ok(Reply::text(out.trim_end().to_string()))
    }
}
