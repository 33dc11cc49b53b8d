//! Configuration for the checkout dev server.
//!
//! Every option can be given on the command line or through the environment
//! (after `.env` is loaded), falling back to [`config_defaults`].

use clap::Parser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::static_files::ENTRY_PAGE;

/// Server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "wallet-checkout")]
#[command(about = "Mock payment gateway and dev server for the wallet checkout page")]
pub struct Config {
    /// Address to bind to
    #[arg(long, env = "HOST", default_value = config_defaults::DEFAULT_HOST)]
    host: IpAddr,
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = config_defaults::DEFAULT_PORT)]
    port: u16,
    /// Directory with the checkout page and its assets
    #[arg(long, env = "PUBLIC_DIR", default_value = config_defaults::DEFAULT_PUBLIC_DIR)]
    public_dir: PathBuf,
    /// Reload connected browsers when files in the public directory change
    #[arg(
        long,
        env = "LIVE_RELOAD",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    live_reload: bool,
}

pub mod config_defaults {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PUBLIC_DIR: &str = "public";
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse arguments: {0}")]
    Args(#[from] clap::Error),
    #[error("Public directory {} is not accessible: {source}", path.display())]
    PublicDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Public directory {} has no index.html", path.display())]
    MissingEntryPage { path: PathBuf },
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Canonical path once loaded through [`Config::load`].
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Load configuration from CLI arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::try_parse()?.validate()
    }

    /// Same as [`Config::load`], for an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)?.validate()
    }

    /// Resolves the public directory and checks that it has an entry page to fall back to.
    fn validate(mut self) -> Result<Self, ConfigError> {
        let public_dir = self
            .public_dir
            .canonicalize()
            .map_err(|source| ConfigError::PublicDir {
                path: self.public_dir.clone(),
                source,
            })?;
        if !public_dir.join(ENTRY_PAGE).is_file() {
            return Err(ConfigError::MissingEntryPage { path: public_dir });
        }
        self.public_dir = public_dir;
        Ok(self)
    }
}
