use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Weft - host a component UI inside a native webview window.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Window and application in one process (default).
    Run {
        /// HTML page to show instead of the built-in one.
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// Own the window and relay frames to a client over local pipes.
    Host,
    /// Drive a running host from this process; type `reload` to reload it.
    Client {
        /// HTML page to send to the host instead of the built-in one.
        #[arg(long)]
        page: Option<PathBuf>,
    },
}

impl Args {
    pub fn mode(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Run { page: None })
    }

    /// `EnvFilter` directive: `--log-level` wins over the config file.
    pub fn log_directive(&self, configured: &str) -> String {
        match self.log_level.as_deref() {
            Some(level) if level.contains('=') => level.to_string(),
            Some(level) => format!("weft={level}"),
            None => configured.to_string(),
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
