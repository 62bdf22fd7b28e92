//! Usage e.g (in `async fn main() .. `):
//!
//! let settings = ConnectionSettings::new(address, token, nick);
//! let client = Client::connect(&settings.address).await?;
//! client.open(&settings).await?;
//! while let Some(line) = client.read_line().await? { .. }

pub mod client;
pub mod codec;
pub mod settings;

pub use client::{Client, ClientError};
pub use settings::ConnectionSettings;
