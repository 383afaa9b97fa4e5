//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

/// Application name used for the default data directory.
const APP_NAME: &str = "draftpad";

pub const DEFAULT_TOAST_SECONDS: u64 = 4;

/// A terminal rich-text note editor with markdown-like typing shortcuts
#[derive(Parser, Debug)]
#[command(name = "draftpad", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the saved draft (default: the platform data dir)
    #[arg(long, value_name = "DIR", env = "DRAFTPAD_STORE")]
    pub store: Option<PathBuf>,

    /// How long the "Saved!" notification stays up
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TOAST_SECONDS)]
    pub toast_seconds: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not determine a data directory; pass --store <DIR>")]
    NoDataDir,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub store_dir: PathBuf,
    pub toast_timeout: Duration,
}

impl Settings {
    /// Resolves parsed arguments, falling back to the platform data
    /// directory when no store was given.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let store_dir = match cli.store.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => dir,
            None => default_store_dir()?,
        };
        Ok(Self {
            store_dir,
            toast_timeout: Duration::from_secs(cli.toast_seconds),
        })
    }
}

fn default_store_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoDataDir)
}
