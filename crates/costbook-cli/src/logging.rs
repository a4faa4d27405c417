// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COSTBOOK_LOG";

/// Installs the global subscriber. Output goes to a file because the
/// terminal is in raw mode while the table is on screen.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let override_directives = env::var(LOG_ENV).ok();
    let filter = build_filter(override_directives.as_deref(), config.log_level())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

fn build_filter(override_directives: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(directives) = override_directives
        && !directives.trim().is_empty()
    {
        return EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}"));
    }
    EnvFilter::try_new(level).with_context(|| {
        format!("invalid log.level {level:?}; use a level like \"info\" or a directive like \"costbook_app=debug\"")
    })
}

#[cfg(test)]
mod tests {
    use super::build_filter;
    use anyhow::Result;

    #[test]
    fn config_level_is_used_without_override() -> Result<()> {
        let filter = build_filter(None, "debug")?;
        assert_eq!(filter.to_string(), "debug");
        Ok(())
    }

    #[test]
    fn env_override_wins_over_config_level() -> Result<()> {
        let filter = build_filter(Some("costbook_app=trace"), "info")?;
        assert_eq!(filter.to_string(), "costbook_app=trace");
        Ok(())
    }

    #[test]
    fn blank_override_falls_back_to_config_level() -> Result<()> {
        let filter = build_filter(Some("  "), "warn")?;
        assert_eq!(filter.to_string(), "warn");
        Ok(())
    }

    #[test]
    fn invalid_level_names_the_setting() {
        let error = build_filter(None, "costbook_app=loud").expect_err("bad level should fail");
        assert!(error.to_string().contains("log.level"));
    }
}
