use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::args::Cli;
use crate::console::{self, ConsoleError};
use crate::parser::{Command, IrcMessage};
use crate::poll::{Reporter, Snapshot, TallyError, VoteIngestor, spawn_tally};
use crate::socket::settings::channel_name;
use crate::socket::{Client, ClientError, ConnectionSettings};
use crate::util::featured::{FeaturedErr, first_featured_channel};
use crate::util::{format_elapsed, format_time};

pub type SessionResult<T> = core::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Featured(#[from] FeaturedErr),

    #[error(transparent)]
    Tally(#[from] TallyError),

    #[error(transparent)]
    Console(#[from] ConsoleError),

    #[error("server closed the connection")]
    ConnectionClosed,

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub period: Duration,
    pub top: usize,
    pub verbose: bool,
}

impl From<&Cli> for SessionOptions {
    fn from(args: &Cli) -> Self {
        Self {
            period: args.period(),
            top: args.top,
            verbose: args.verbose,
        }
    }
}

/// A joined channel and everything needed to poll it
#[derive(Debug)]
pub struct Session {
    client: Client,
    channel: String,
    nick: String,
    options: SessionOptions,
}

impl Session {
    /// Connects, authenticates, resolves the channel and joins it
    ///
    /// The featured lookup only runs when no channel was given; any failure here is fatal.
    #[instrument(skip(args), fields(address = %args.address, nick = %args.nick))]
    pub async fn establish(args: &Cli) -> SessionResult<Self> {
        let settings = ConnectionSettings::new(&args.address, &args.pass, &args.nick);

        let client = Client::connect(&settings.address).await?;
        client.open(&settings).await?;

        let channel = match &args.channel {
            Some(channel) => channel_name(channel).to_lowercase(),
            None => first_featured_channel(&args.featured_url, args.client_id.as_deref()).await?,
        };

        client
            .write(&ConnectionSettings::join_command(&channel))
            .await?;
        tracing::info!(channel = %channel, "joined #{}", channel);

        Ok(Self {
            client,
            channel,
            nick: settings.nick.clone(),
            options: SessionOptions::from(args),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Runs the poll until `shutdown` fires or something unrecoverable happens
    ///
    /// Three activities run side by side: the receive loop (on this task), the reporter, and the
    /// console forwarder. The first fatal failure cancels the others and is returned. On a
    /// requested shutdown the channel is parted, a final report is written to `out`, and the
    /// final tally is returned.
    #[instrument(skip_all, fields(channel = %self.channel))]
    pub async fn run<R, W>(
        self,
        console_input: R,
        out: W,
        shutdown: CancellationToken,
    ) -> SessionResult<Snapshot>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let started = Local::now();
        let cancel = shutdown.child_token();

        let (tally, owner) = spawn_tally();
        let ingestor = VoteIngestor::new(tally.clone());

        let mut reporter = Reporter::new(tally.clone(), out, self.options.period, self.options.top);
        let reporter_cancel = cancel.clone();
        let reporter_task = tokio::spawn(async move {
            let res = reporter.run(reporter_cancel.clone()).await;
            if res.is_err() {
                reporter_cancel.cancel();
            }

            (reporter, res)
        });

        let console_client = self.client.clone();
        let console_cancel = cancel.clone();
        let console_task = tokio::spawn(async move {
            let res =
                console::forward_lines(console_input, console_client, console_cancel.clone()).await;
            if res.is_err() {
                console_cancel.cancel();
            }

            res
        });

        tracing::info!(started = %format_time(&started), "poll running");

        let outcome = tokio::select! {
            res = self.receive_loop(&ingestor) => res,
            _ = cancel.cancelled() => Ok(()),
        };

        cancel.cancel();
        let console_res = console_task.await?;
        let (mut reporter, report_res) = reporter_task.await?;

        if let Err(err) = outcome {
            tracing::error!(error = ?err, "receive loop failed");
            return Err(err);
        }
        console_res?;
        report_res?;

        // only a requested shutdown gets this far
        if let Err(err) = self
            .client
            .write(&ConnectionSettings::part_command(&self.channel))
            .await
        {
            tracing::warn!(error = ?err, "failed to send PART");
        }

        let last = tally.snapshot().await?;
        tracing::info!(
            total = last.total,
            distinct = last.counts.len(),
            elapsed = %format_elapsed(Local::now() - started),
            "final tally"
        );
        match tokio::time::timeout(self.options.period, reporter.report_once()).await {
            Ok(res) => res?,
            Err(_) => tracing::warn!("final report not written, output is stalled"),
        }

        drop((ingestor, reporter, tally));
        _ = owner.await?;

        Ok(last)
    }

    /// Reads and dispatches inbound lines; only returns on failure
    async fn receive_loop(&self, ingestor: &VoteIngestor) -> SessionResult<()> {
        loop {
            let Some(line) = self.client.read_line().await? else {
                return Err(SessionError::ConnectionClosed);
            };

            match IrcMessage::parse(&line) {
                Ok(message) => self.dispatch(&message, ingestor).await?,
                Err(err) => tracing::warn!(error = %err, raw = %line, "skipping unparseable line"),
            }
        }
    }

    async fn dispatch(&self, message: &IrcMessage, ingestor: &VoteIngestor) -> SessionResult<()> {
        if self.options.verbose {
            tracing::info!(
                command = %message.command,
                params = ?message.params,
                prefix = ?message.prefix.as_ref().map(ToString::to_string),
                sender = ?message.tags.get("display-name"),
                trailing = ?message.trailing,
                string = %message,
                "RX"
            );
        }

        match message.kind() {
            Ok(Command::Privmsg { channel, text }) => {
                let recorded = ingestor.ingest(text)?;
                tracing::trace!(channel, recorded, "PRIVMSG");
            }

            Ok(Command::Ping { token }) => {
                tracing::debug!(token, "rx KEEPALIVE");
                self.client.write(&format!("PONG :{}", token)).await?;
            }

            Ok(Command::Join { channel }) if self.is_own(message) => {
                tracing::info!(channel, "JOIN confirmed");
            }

            Ok(Command::Part { channel }) if self.is_own(message) => {
                tracing::info!(channel, "PART confirmed");
            }

            Ok(Command::Join { .. } | Command::Part { .. }) => (),

            Ok(Command::Notice { target, text }) => {
                tracing::warn!(notice_target = target, text, "RECV NOTICE");
            }

            Ok(Command::Numeric { code }) => {
                tracing::debug!(code, "numeric reply");
            }

            Ok(Command::Other { verb }) => {
                tracing::trace!(verb, "ignored");
            }

            Err(err) => {
                tracing::warn!(error = %err, raw = %message, "malformed message");
            }
        }

        Ok(())
    }

    fn is_own(&self, message: &IrcMessage) -> bool {
        message
            .nick()
            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.nick))
    }
}
