//! Administration commands (log, plugin, config)
//!
//! All admin-tier: the engine verifies authorization before any of these
//! run. Each one introspects or mutates collaborator state through the
//! injected [`ConfigStore`](crate::ConfigStore); nothing here touches the
//! filesystem or spawns processes.

use async_trait::async_trait;

use super::{Command, Context};
use crate::config::ConfigValue;
use crate::engine::Reply;
use crate::error::Result;

const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// `log level [LEVEL]` views or sets the host log level
/// (`general.log_level`); `log view` points at the audit console.
pub struct LogCmd;

#[async_trait]
impl Command for LogCmd {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let Some(action) = ctx.args.first() else {
            return Ok(Reply::text("usage: log <level|view> [args]"));
        };

        match action.to_lowercase().as_str() {
            "level" => match ctx.args.get(1) {
                None => {
                    let level = ctx
                        .config
                        .get("general", "log_level")
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "INFO".to_string());
                    Ok(Reply::text(format!("log level is {level}")))
                }
                Some(raw) => {
                    let level = raw.to_uppercase();
                    if !LOG_LEVELS.contains(&level.as_str()) {
                        return Ok(Reply::text(format!(
                            "invalid log level '{raw}' (valid: {})",
                            LOG_LEVELS.join(", ")
                        )));
                    }
                    ctx.config
                        .set("general", "log_level", ConfigValue::Str(level.clone()));
                    Ok(Reply::text(format!("log level set to {level}")))
                }
            },
            "view" => Ok(Reply::text(
                "log viewing is handled by the host's audit console",
            )),
            other => Ok(Reply::text(format!("unknown log action: {other}"))),
        }
    }
}

/// `plugin <list|info|enable|disable> [name]` over the `plugins`
/// configuration section. The plugin loader itself is an external
/// collaborator; it observes these flags.
pub struct Plugin;

#[async_trait]
impl Command for Plugin {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let Some(action) = ctx.args.first() else {
            return Ok(Reply::text("usage: plugin <list|info|enable|disable> [name]"));
        };

        match action.to_lowercase().as_str() {
            "list" => {
                let names = ctx.config.keys("plugins");
                if names.is_empty() {
                    return Ok(Reply::text("no plugins registered"));
                }
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let state = match ctx.config.get("plugins", &name) {
                            Some(ConfigValue::Bool(true)) => "enabled",
                            Some(ConfigValue::Bool(false)) => "disabled",
                            _ => "unknown",
                        };
                        format!("{name}: {state}")
                    })
                    .collect();
                Ok(Reply::text(lines.join("\n")))
            }
            "info" => {
                let Some(name) = ctx.args.get(1) else {
                    return Ok(Reply::text("usage: plugin info <name>"));
                };
                match ctx.config.get("plugins", name) {
                    Some(value) => Ok(Reply::text(format!("plugin {name}: {value}"))),
                    None => Ok(Reply::text(format!("plugin not found: {name}"))),
                }
            }
            "enable" | "disable" => {
                let Some(name) = ctx.args.get(1) else {
                    return Ok(Reply::text(format!("usage: plugin {action} <name>")));
                };
                let enable = action.eq_ignore_ascii_case("enable");
                ctx.config.set("plugins", name, ConfigValue::Bool(enable));
                let verb = if enable { "enabled" } else { "disabled" };
                Ok(Reply::text(format!("plugin {verb}: {name}")))
            }
            other => Ok(Reply::text(format!("unknown plugin action: {other}"))),
        }
    }
}

/// `config <get|set|list> …` with dotted `section.key` addressing.
/// `set` coerces values best-effort (bool/int/string).
pub struct ConfigCmd;

#[async_trait]
impl Command for ConfigCmd {
    async fn invoke(&self, ctx: Context<'_>) -> Result<Reply> {
        let Some(action) = ctx.args.first() else {
            return Ok(Reply::text(
                "usage: config <get|set|list> [section.key] [value]",
            ));
        };

        match action.to_lowercase().as_str() {
            "get" => {
                let Some((section, key)) = split_dotted(ctx.args.get(1)) else {
                    return Ok(Reply::text("usage: config get <section>.<key>"));
                };
                match ctx.config.get(section, key) {
                    Some(value) => Ok(Reply::text(format!("{section}.{key} = {value}"))),
                    None => Ok(Reply::text(format!(
                        "configuration {section}.{key} not found"
                    ))),
                }
            }
            "set" => {
                let (Some((section, key)), Some(raw)) =
                    (split_dotted(ctx.args.get(1)), ctx.args.get(2))
                else {
                    return Ok(Reply::text("usage: config set <section>.<key> <value>"));
                };
                let value = ConfigValue::coerce(raw);
                ctx.config.set(section, key, value.clone());
                Ok(Reply::text(format!("{section}.{key} set to {value}")))
            }
            "list" => match ctx.args.get(1) {
                None => {
                    let sections = ctx.config.sections();
                    if sections.is_empty() {
                        return Ok(Reply::text("no configuration sections found"));
                    }
                    Ok(Reply::text(sections.join("\n")))
                }
                Some(section) => {
                    let keys = ctx.config.keys(section);
                    if keys.is_empty() {
                        return Ok(Reply::text(format!("section not found: {section}")));
                    }
                    let lines: Vec<String> = keys
                        .into_iter()
                        .map(|key| {
                            let value = ctx
                                .config
                                .get(section, &key)
                                .map(|v| v.to_string())
                                .unwrap_or_default();
                            format!("{key} = {value}")
                        })
                        .collect();
                    Ok(Reply::text(lines.join("\n")))
                }
            },
            other => Ok(Reply::text(format!("unknown config action: {other}"))),
        }
    }
}

/// Split `section.key` on the first dot. Both halves must be non-empty.
fn split_dotted(arg: Option<&String>) -> Option<(&str, &str)> {
    let (section, key) = arg?.split_once('.')?;
    if section.is_empty() || key.is_empty() {
        return None;
    }
    Some((section, key))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{args, fixture};
    use super::*;
    use crate::config::ConfigStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_config_set_coerces_integers() {
        let mut fx = fixture(true);
        let argv = args(&["set", "app.x", "42"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "app.x set to 42");
        assert_eq!(fx.config.get("app", "x"), Some(ConfigValue::Int(42)));

        let argv = args(&["get", "app.x"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "app.x = 42");
    }

    #[tokio::test]
    async fn test_config_set_coerces_booleans_and_strings() {
        let mut fx = fixture(true);
        let argv = args(&["set", "ui.fullscreen", "TRUE"]);
        ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(
            fx.config.get("ui", "fullscreen"),
            Some(ConfigValue::Bool(true))
        );

        let argv = args(&["set", "ui.theme", "dark"]);
        ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(fx.config.get("ui", "theme"), Some(ConfigValue::from("dark")));
    }

    #[tokio::test]
    async fn test_config_get_missing_key() {
        let mut fx = fixture(true);
        let argv = args(&["get", "app.missing"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "configuration app.missing not found");
    }

    #[tokio::test]
    async fn test_config_requires_dotted_address() {
        let mut fx = fixture(true);
        let argv = args(&["get", "appx"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "usage: config get <section>.<key>");
    }

    #[tokio::test]
    async fn test_config_list_sections_and_keys() {
        let mut fx = fixture(true);
        fx.config.set("general", "version", ConfigValue::from("1.0"));
        fx.config.set("ui", "theme", ConfigValue::from("dark"));

        let argv = args(&["list"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "general\nui");

        let argv = args(&["list", "ui"]);
        let reply = ConfigCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "theme = dark");
    }

    #[tokio::test]
    async fn test_log_level_round_trip() {
        let mut fx = fixture(true);
        let argv = args(&["level"]);
        let reply = LogCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "log level is INFO");

        let argv = args(&["level", "debug"]);
        let reply = LogCmd.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "log level set to DEBUG");
        assert_eq!(
            fx.config.get("general", "log_level"),
            Some(ConfigValue::from("DEBUG"))
        );
    }

    #[tokio::test]
    async fn test_log_level_rejects_unknown() {
        let mut fx = fixture(true);
        let argv = args(&["level", "loud"]);
        let reply = LogCmd.invoke(fx.context(&argv)).await.unwrap();
        assert!(reply.to_string().starts_with("invalid log level 'loud'"));
        assert_eq!(fx.config.get("general", "log_level"), None);
    }

    #[tokio::test]
    async fn test_plugin_enable_disable_list() {
        let mut fx = fixture(true);
        let argv = args(&["enable", "clock"]);
        let reply = Plugin.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "plugin enabled: clock");

        let argv = args(&["disable", "weather"]);
        Plugin.invoke(fx.context(&argv)).await.unwrap();

        let argv = args(&["list"]);
        let reply = Plugin.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "clock: enabled\nweather: disabled");
    }

    #[tokio::test]
    async fn test_plugin_info_missing() {
        let mut fx = fixture(true);
        let argv = args(&["info", "ghost"]);
        let reply = Plugin.invoke(fx.context(&argv)).await.unwrap();
        assert_eq!(reply.to_string(), "plugin not found: ghost");
    }
}
