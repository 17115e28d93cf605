use std::{io::IsTerminal, net::SocketAddr, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use config::Config;
use log::LevelFilter;
use logforth::filter::EnvFilter;

const RELAY_CRATES: [&str; 4] = ["textrelay", "server", "relay", "config"];

#[derive(Debug, Parser)]
#[command(name = "Textrelay", version, long_about = concat!("Textrelay v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// IP address on which the server will listen for incoming connections.
    /// Default: 127.0.0.1:8000
    #[arg(short, long, env = "TEXTRELAY_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file. Optional, the relay can be configured
    /// from the environment alone.
    #[arg(long, short, env = "TEXTRELAY_CONFIG_PATH", default_value = "./textrelay.toml")]
    pub config: PathBuf,
    /// Logging level of the relay. Dependencies never log below `warn`.
    #[arg(long = "log", env = "TEXTRELAY_LOG", value_enum, default_value = "info")]
    pub log_level: LogLevel,
    /// Set the style of log output. Colors on a terminal, plain text otherwise.
    #[arg(long, env = "TEXTRELAY_LOG_STYLE", value_enum)]
    pub log_style: Option<LogStyle>,
}

impl Args {
    /// Loads the configuration file if present, then applies the environment on top and validates the result.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            log::debug!(
                "No configuration file at {}, using environment only",
                self.config.display()
            );
            Config::default()
        };

        config.apply_process_env()?;
        config.validate()?;

        Ok(config)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text
    Color,
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl LogStyle {
    /// Colors for a terminal, plain text for anything else.
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    Warn,
    /// Log errors, warnings, and info messages
    Info,
    /// Also log every relayed request
    Debug,
    /// Log everything
    Trace,
}

impl LogLevel {
    fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }

    /// Dependencies stay at `warn` at most, the relay's own crates log at the selected level.
    pub fn env_filter(self) -> EnvFilter {
        let level = self.level_filter();
        let dependencies = level.min(LevelFilter::Warn);

        let directives = std::iter::once(dependencies.to_string())
            .chain(RELAY_CRATES.iter().map(|krate| format!("{krate}={level}")))
            .collect::<Vec<_>>()
            .join(",")
            .to_ascii_lowercase();

        EnvFilter::from_str(&directives).expect("These all are valid env filters.")
    }
}
