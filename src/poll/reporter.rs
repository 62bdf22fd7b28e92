use std::fmt::Write as _;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::table::Snapshot;
use super::tally::{TallyHandle, TallyResult};
use super::top::{Entry, select_top_n};

pub const REPORT_SEPARATOR: &str = "====";

/// Renders a report block: separator, running total, then one `token count` line per leader
pub fn render(total: u64, leaders: &[Entry]) -> String {
    let mut report = String::new();

    // writing into a String cannot fail
    _ = writeln!(report, "{}", REPORT_SEPARATOR);
    _ = writeln!(report, "Total: {}", total);
    for entry in leaders {
        _ = writeln!(report, "{} {}", entry.token, entry.count);
    }

    report
}

/// Selects the top `n` of a snapshot and renders it
pub fn render_snapshot(snapshot: &Snapshot, n: usize) -> String {
    render(snapshot.total, &select_top_n(&snapshot.counts, n))
}

/// Periodic top-N printer
///
/// Each tick asks the tally owner for a snapshot and does the selection and the write on its
/// own task, so a slow output sink holds up only the next report, never ingest.
#[derive(Debug)]
pub struct Reporter<W> {
    tally: TallyHandle,
    out: W,
    period: Duration,
    top: usize,
}

impl<W> Reporter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(tally: TallyHandle, out: W, period: Duration, top: usize) -> Self {
        Self {
            tally,
            out,
            period,
            top,
        }
    }

    /// Emits a single report
    ///
    /// A failed write is logged and otherwise ignored; only losing the tally owner is an error.
    pub async fn report_once(&mut self) -> TallyResult<()> {
        let snapshot = self.tally.snapshot().await?;
        let report = render_snapshot(&snapshot, self.top);

        tracing::debug!(
            total = snapshot.total,
            distinct = snapshot.counts.len(),
            taken_at = %snapshot.taken_at.to_rfc3339(),
            "emitting report"
        );

        if let Err(err) = self.emit(&report).await {
            tracing::warn!(error = ?err, "failed to write report");
        }

        Ok(())
    }

    /// Reports every period until `cancel` fires
    ///
    /// The first report is written one full period after the call. A report still being written
    /// when `cancel` fires is abandoned, so a stalled sink cannot hold up shutdown.
    #[instrument(skip(self, cancel), fields(period = ?self.period, top = self.top))]
    pub async fn run(&mut self, cancel: CancellationToken) -> TallyResult<()> {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("reporter cancelled");
                    break;
                }

                _ = ticker.tick() => {
                    let Some(res) = cancel.run_until_cancelled(self.report_once()).await else {
                        tracing::debug!("reporter cancelled mid-report");
                        break;
                    };
                    res?;
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    async fn emit(&mut self, report: &str) -> std::io::Result<()> {
        self.out.write_all(report.as_bytes()).await?;
        self.out.flush().await
    }
}
