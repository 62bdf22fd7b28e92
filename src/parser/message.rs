use core::fmt;
use std::collections::HashMap;

use thiserror::Error;

use super::lexer::Lexer;

pub type ParseResult<T> = core::result::Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("cannot find a command in message - raw: {0}")]
    MissingCommand(String),

    #[error("prefix marker without a prefix - raw: {0}")]
    InvalidPrefix(String),

    #[error("cannot find required parameter for command '{command}': {param}")]
    MissingParameter {
        command: &'static str,
        param: &'static str,
    },
}

/// Sender part of a message (`nick!user@host`)
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub nick: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl Prefix {
    fn parse(raw: &str) -> Self {
        let (nick, user_host) = match raw.split_once('!') {
            Some((nick, rest)) => (nick, Some(rest)),
            None => (raw, None),
        };

        let (user, host) = match user_host {
            Some(rest) => match rest.split_once('@') {
                Some((user, host)) => (Some(user.to_string()), Some(host.to_string())),
                None => (Some(rest.to_string()), None),
            },
            None => match nick.split_once('@') {
                Some((_, host)) => (None, Some(host.to_string())),
                None => (None, None),
            },
        };

        let nick = nick.split('@').next().unwrap_or(nick).to_string();
        Self { nick, user, host }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nick)?;
        if let Some(user) = &self.user {
            write!(f, "!{}", user)?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{}", host)?;
        }

        Ok(())
    }
}

/// One parsed protocol line
#[derive(Debug, Clone, PartialEq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<Prefix>,
    /// Uppercased verb or three-digit numeric
    pub command: String,
    /// Middle parameters; the trailing parameter is kept apart in `trailing`
    pub params: Vec<String>,
    pub trailing: Option<String>,
    raw: String,
}

/// What the session cares about in a message
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Privmsg { channel: &'a str, text: &'a str },
    Ping { token: &'a str },
    Join { channel: &'a str },
    Part { channel: &'a str },
    Notice { target: &'a str, text: &'a str },
    Numeric { code: u16 },
    Other { verb: &'a str },
}

impl IrcMessage {
    pub fn parse(line: &str) -> ParseResult<Self> {
        let raw = line.trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut lexer = Lexer::new(raw);
        let mut tags = HashMap::new();
        let mut prefix = None;

        if lexer.eat('@') {
            tags = parse_tags(&mut lexer);
            lexer.skip_spaces();
        }

        if lexer.eat(':') {
            let source = lexer
                .word()
                .ok_or_else(|| ParseError::InvalidPrefix(raw.to_string()))?;
            prefix = Some(Prefix::parse(source));
        }

        lexer.skip_spaces();
        let command = lexer
            .word()
            .ok_or_else(|| ParseError::MissingCommand(raw.to_string()))?
            .to_uppercase();

        let mut params = Vec::new();
        let mut trailing = None;
        loop {
            lexer.skip_spaces();
            if lexer.is_eof() {
                break;
            }

            if lexer.eat(':') {
                trailing = Some(lexer.rest().to_string());
                break;
            }

            if let Some(param) = lexer.word() {
                params.push(param.to_string());
            }
        }

        Ok(Self {
            tags,
            prefix,
            command,
            params,
            trailing,
            raw: raw.to_string(),
        })
    }

    /// Free-text payload: the trailing parameter, or the last middle parameter if there is none
    pub fn text(&self) -> Option<&str> {
        self.trailing
            .as_deref()
            .or_else(|| self.params.last().map(String::as_str))
    }

    pub fn nick(&self) -> Option<&str> {
        self.prefix.as_ref().map(|prefix| prefix.nick.as_str())
    }

    /// Classifies the message
    pub fn kind(&self) -> ParseResult<Command<'_>> {
        let first = self.params.first().map(String::as_str);

        Ok(match self.command.as_str() {
            "PRIVMSG" => Command::Privmsg {
                channel: first.ok_or(ParseError::MissingParameter {
                    command: "PRIVMSG",
                    param: "channel",
                })?,
                text: self.trailing.as_deref().or(self.params.get(1).map(String::as_str)).ok_or(
                    ParseError::MissingParameter {
                        command: "PRIVMSG",
                        param: "text",
                    },
                )?,
            },

            "PING" => Command::Ping {
                token: self.text().unwrap_or_default(),
            },

            "JOIN" => Command::Join {
                channel: first.or(self.trailing.as_deref()).ok_or(
                    ParseError::MissingParameter {
                        command: "JOIN",
                        param: "channel",
                    },
                )?,
            },

            "PART" => Command::Part {
                channel: first.or(self.trailing.as_deref()).ok_or(
                    ParseError::MissingParameter {
                        command: "PART",
                        param: "channel",
                    },
                )?,
            },

            "NOTICE" => Command::Notice {
                target: first.unwrap_or("*"),
                text: self.trailing.as_deref().unwrap_or_default(),
            },

            verb if verb.len() == 3 && verb.bytes().all(|b| b.is_ascii_digit()) => {
                Command::Numeric {
                    // three ascii digits always fit
                    code: verb.parse().unwrap_or_default(),
                }
            }

            verb => Command::Other { verb },
        })
    }
}

impl fmt::Display for IrcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_tags(lexer: &mut Lexer) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    while let Some(key) = lexer.until(&['=', ';', ' ']) {
        let value = if lexer.eat('=') {
            lexer.until(&[';', ' ']).unwrap_or_default()
        } else {
            ""
        };

        tags.insert(key.to_string(), value.to_string());
        if !lexer.eat(';') {
            break;
        }
    }

    tags
}
