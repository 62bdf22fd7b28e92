use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::instrument;

use super::table::{FrequencyTable, Snapshot};

pub type TallyResult<T> = core::result::Result<T, TallyError>;

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("tally owner task is no longer running")]
    Closed,
}

#[derive(Debug)]
enum TallyRequest {
    Vote(String),
    Snapshot(oneshot::Sender<Snapshot>),
}

/// Cloneable handle to the task that owns the session's `FrequencyTable`
///
/// Every read and write goes through one FIFO channel, so votes are applied in the order they
/// were sent and a snapshot sees exactly the votes sent before it.
#[derive(Debug, Clone)]
pub struct TallyHandle {
    sender: mpsc::UnboundedSender<TallyRequest>,
}

/// Spawns the owner task
///
/// The task runs until every `TallyHandle` has been dropped and then yields the final table.
pub fn spawn_tally() -> (TallyHandle, JoinHandle<FrequencyTable>) {
    let (sender, receiver) = mpsc::unbounded_channel::<TallyRequest>();
    let owner = tokio::spawn(run_owner(receiver));

    (TallyHandle { sender }, owner)
}

impl TallyHandle {
    /// Queues a vote; never waits on the owner
    pub fn vote(&self, token: &str) -> TallyResult<()> {
        self.sender
            .send(TallyRequest::Vote(token.to_owned()))
            .map_err(|_| TallyError::Closed)
    }

    pub async fn snapshot(&self) -> TallyResult<Snapshot> {
        let (reply, rx_reply) = oneshot::channel();
        self.sender
            .send(TallyRequest::Snapshot(reply))
            .map_err(|_| TallyError::Closed)?;

        rx_reply.await.map_err(|_| TallyError::Closed)
    }
}

#[instrument(skip(receiver))]
async fn run_owner(mut receiver: mpsc::UnboundedReceiver<TallyRequest>) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    tracing::debug!("tally owner started");

    while let Some(request) = receiver.recv().await {
        match request {
            TallyRequest::Vote(token) => {
                table.increment(&token);
                tracing::trace!(token = %token, total = table.total(), "vote applied");
            }

            TallyRequest::Snapshot(reply) => {
                // requester may have given up waiting; nothing to do about it
                _ = reply.send(table.snapshot());
            }
        }
    }

    tracing::debug!(
        total = table.total(),
        distinct = table.distinct(),
        "tally owner stopped"
    );

    table
}
