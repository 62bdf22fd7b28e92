pub mod lexer;
pub mod message;

pub use message::{Command, IrcMessage};
