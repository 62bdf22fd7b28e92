use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "poll_fan=info,warn";
const VERBOSE_FILTER: &str = "poll_fan=debug,info";

/// Installs the global subscriber
///
/// `RUST_LOG` wins when set. Logs go to stderr so that stdout only carries the banner and the
/// poll reports.
pub fn build_subscriber(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()?;

    Ok(())
}
