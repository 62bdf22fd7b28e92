use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Vote counts accumulated since the session started
///
/// Only the tally owner task ever holds one of these, so there is no locking here; see
/// `poll::tally` for how the ingest and report paths reach it.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    total: u64,
}

/// Point-in-time copy of a `FrequencyTable`
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub counts: HashMap<String, u64>,
    pub total: u64,
    pub taken_at: DateTime<Utc>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single vote for `token`
    pub fn increment(&mut self, token: &str) {
        match self.counts.get_mut(token) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(token.to_owned(), 1);
            }
        }

        self.total += 1;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            counts: self.counts.clone(),
            total: self.total,
            taken_at: Utc::now(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct tokens seen
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}
