//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through a `GIST_HOOKS_*`
//! environment variable; flags win.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gist-hooks",
    version,
    about = "Browse public and per-user GitHub gists in the terminal"
)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GIST_HOOKS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Account whose gists fill the user panel.  Repeat to cycle with `u`.
    #[arg(
        long = "user",
        env = "GIST_HOOKS_USERS",
        value_delimiter = ',',
        default_value = "gaearon"
    )]
    pub users: Vec<String>,

    /// User-Agent sent with every request.
    #[arg(
        long,
        env = "GIST_HOOKS_USER_AGENT",
        default_value = concat!("gist-hooks/", env!("CARGO_PKG_VERSION"))
    )]
    pub user_agent: String,

    /// Write logs to this file.  Logging is off without it.
    #[arg(long, env = "GIST_HOOKS_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `gist_hooks=trace`.
    #[arg(long, env = "GIST_HOOKS_LOG", default_value = "info")]
    pub log_level: String,

    /// Redraw interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub tick_ms: u64,
}

impl Config {
    /// Reject settings the app cannot run with.
    pub fn validate(mut self) -> Result<Self> {
        self.users.retain(|u| !u.trim().is_empty());
        for user in &mut self.users {
            *user = user.trim().to_string();
        }
        if self.users.is_empty() {
            bail!("at least one --user is required");
        }
        if self.tick_ms == 0 {
            bail!("--tick-ms must be greater than zero");
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            bail!("--api-base must be an http(s) URL, got {:?}", self.api_base);
        }
        Ok(self)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
