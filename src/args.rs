use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::socket::settings::DEFAULT_ADDRESS;
use crate::util::featured::DEFAULT_FEATURED_URL;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Tallies the first word of every chat message in a Twitch channel")]
pub struct Cli {
    /// IRC server address: `host:port` for plain TCP, or a `ws://`/`wss://` URL
    #[arg(short, long, env = "POLL_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// User OAuth token (the `oauth:` prefix is optional)
    #[arg(short, long, env = "POLL_PASS", hide_env_values = true)]
    pub pass: String,

    /// TTV user/bot login/username
    #[arg(short, long, env = "POLL_NICK")]
    pub nick: String,

    /// Channel to poll; when omitted the current featured stream is joined
    #[arg(short, long, env = "POLL_CHANNEL")]
    pub channel: Option<String>,

    /// Endpoint listing the featured streams
    #[arg(long, env = "POLL_FEATURED_URL", default_value = DEFAULT_FEATURED_URL)]
    pub featured_url: String,

    /// Client-ID header sent with the featured lookup
    #[arg(long, env = "POLL_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Seconds between reports
    #[arg(short, long, env = "POLL_INTERVAL", default_value_t = 5)]
    pub interval: u64,

    /// Number of leaders shown in each report
    #[arg(short, long, env = "POLL_TOP", default_value_t = 5)]
    pub top: usize,

    /// Log every inbound message
    #[arg(short, long, env = "POLL_VERBOSE")]
    pub verbose: bool,
}

pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("an OAuth token is required")]
    EmptyPass,

    #[error("a nick is required")]
    EmptyNick,

    #[error("report interval must be at least one second")]
    ZeroInterval,

    #[error("invalid channel name '{0}'")]
    InvalidChannel(String),
}

impl Cli {
    /// Rejects settings that would only fail later against the server
    pub fn validate(&self) -> ConfigResult<()> {
        let pass = self.pass.trim();
        if pass.is_empty() || pass == "oauth:" {
            return Err(ConfigError::EmptyPass);
        }

        if self.nick.trim().is_empty() {
            return Err(ConfigError::EmptyNick);
        }

        if self.interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if let Some(channel) = &self.channel {
            let name = channel.trim().trim_start_matches('#');
            if name.is_empty() || name.contains(char::is_whitespace) || name.contains(',') {
                return Err(ConfigError::InvalidChannel(channel.clone()));
            }
        }

        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// Loads `.env` if there is one, then parses and validates the command line
pub fn parse_cli_args() -> ConfigResult<Cli> {
    // a missing .env is fine; everything can come from flags or the real environment
    _ = dotenvy::dotenv();

    let args = Cli::parse();
    args.validate()?;

    Ok(args)
}
