use core::fmt;

pub const DEFAULT_ADDRESS: &str = "irc.twitch.tv:6667";
const OAUTH_PREFIX: &str = "oauth:";

/**
 * PASS oauth:************..
 * NICK plss
 * JOIN #[channel]
 */
#[derive(Clone)]
pub struct ConnectionSettings {
    pub address: String,
    pub nick: String,
    pass: String,
}

impl ConnectionSettings {
    /// `token` may be given with or without its `oauth:` prefix
    pub fn new(address: &str, token: &str, nick: &str) -> Self {
        let token = token.trim();
        let pass = if token.starts_with(OAUTH_PREFIX) {
            token.to_string()
        } else {
            format!("{}{}", OAUTH_PREFIX, token)
        };

        Self {
            address: address.to_string(),
            nick: nick.trim().to_string(),
            pass,
        }
    }

    /// Handshake lines, in the order the server expects them
    pub fn auth_commands(&self) -> [String; 2] {
        [format!("PASS {}", self.pass), format!("NICK {}", self.nick)]
    }

    pub fn join_command(channel: &str) -> String {
        format!("JOIN #{}", channel_name(channel))
    }

    pub fn part_command(channel: &str) -> String {
        format!("PART #{}", channel_name(channel))
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("address", &self.address)
            .field("nick", &self.nick)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// Channel name without its `#`
pub fn channel_name(channel: &str) -> &str {
    channel.trim().trim_start_matches('#')
}

/// Lines that carry credentials and must never reach the logs
pub fn is_secret(line: &str) -> bool {
    line.get(..5)
        .is_some_and(|verb| verb.eq_ignore_ascii_case("PASS "))
}
