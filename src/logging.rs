//! Structured logging on stderr.
//!
//! The level is taken from, in order: `--log-level`, `DIAGRAMERZ_LOG`,
//! `RUST_LOG`, the `log_level` key of the config file, and finally `warn`.
//! Any `EnvFilter` directive is accepted, e.g.
//! `DIAGRAMERZ_LOG="warn,diagramerz::model=debug"`.

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DIAGRAMERZ_LOG";
pub const DEFAULT_LEVEL: &str = "warn";

pub fn init_logging(cli_level: Option<&str>, config_level: Option<&str>) -> Result<()> {
    let directives = resolve_directives(
        cli_level,
        env::var(LOG_ENV).ok(),
        env::var("RUST_LOG").ok(),
        config_level,
    );
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log level `{directives}`"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn resolve_directives(
    cli_level: Option<&str>,
    app_env: Option<String>,
    rust_log: Option<String>,
    config_level: Option<&str>,
) -> String {
    cli_level
        .map(str::to_string)
        .or(app_env)
        .or(rust_log)
        .or_else(|| config_level.map(str::to_string))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order() {
        let env = || Some("info".to_string());
        let rust = || Some("trace".to_string());

        assert_eq!(resolve_directives(Some("debug"), env(), rust(), Some("error")), "debug");
        assert_eq!(resolve_directives(None, env(), rust(), Some("error")), "info");
        assert_eq!(resolve_directives(None, None, rust(), Some("error")), "trace");
        assert_eq!(resolve_directives(None, None, None, Some("error")), "error");
        assert_eq!(resolve_directives(None, None, None, None), DEFAULT_LEVEL);
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        assert_eq!(resolve_directives(Some("  "), None, None, None), DEFAULT_LEVEL);
    }

    #[test]
    fn directive_strings_parse() {
        assert!(EnvFilter::try_new("warn,diagramerz::model=debug").is_ok());
    }
}
