//! Vote tally engine.
//!
//! ```text
//! VoteIngestor --Vote--> tally owner (FrequencyTable) <--Snapshot-- Reporter --> stdout
//! ```
//!
//! The table lives on a single owner task; everything else holds a `TallyHandle`.

pub mod ingest;
pub mod reporter;
pub mod table;
pub mod tally;
pub mod top;

pub use ingest::VoteIngestor;
pub use reporter::Reporter;
pub use table::Snapshot;
pub use tally::{TallyError, spawn_tally};
