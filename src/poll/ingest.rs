use super::tally::{TallyHandle, TallyResult};

/// Returns the vote carried by a chat message: its first whitespace-delimited field
pub fn vote_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Feeds chat text into the tally, one message at a time and in arrival order
#[derive(Debug, Clone)]
pub struct VoteIngestor {
    tally: TallyHandle,
}

impl VoteIngestor {
    pub fn new(tally: TallyHandle) -> Self {
        Self { tally }
    }

    /// Records the message's vote, if it carries one
    ///
    /// Returns `Ok(false)` for empty or all-whitespace text; the only error is a tally owner that
    /// has already stopped.
    pub fn ingest(&self, text: &str) -> TallyResult<bool> {
        match vote_token(text) {
            Some(token) => {
                self.tally.vote(token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
