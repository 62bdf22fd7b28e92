use anyhow::Context;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::session::Session;
use crate::util::telemetry;

mod args;
mod console;
mod parser;
mod poll;
mod session;
mod socket;
mod util;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("[x] {:#}", err);
            1
        }
    };

    // the stdin reader may still be parked in a blocking read, which would keep the runtime from
    // shutting down
    std::process::exit(code);
}

async fn run() -> anyhow::Result<()> {
    let args = args::parse_cli_args().context("invalid configuration")?;
    telemetry::build_subscriber(args.verbose).context("failed to install tracing subscriber")?;

    tracing::info!(address = %args.address, nick = %args.nick, "starting poll");

    let session = Session::establish(&args)
        .await
        .context("failed to start the session")?;

    print!("{}", console::BANNER);

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down");
            ctrl_c.cancel();
        }
    });

    let last = session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
        .await
        .inspect_err(|err| tracing::error!(error = ?err, "session ended"))
        .context("session failed")?;

    tracing::info!(total = last.total, "poll finished");
    Ok(())
}
