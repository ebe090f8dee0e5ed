//! `verity shell`: an interactive prediction session.
//!
//! Plain lines are submitted for classification; lines starting with `/` are
//! commands. The session is torn down on `/quit`, end of input, or Ctrl-C
//! during a request.

use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use verity_gateway::HttpGateway;
use verity_session::{Session, SessionError, SubmitOutcome};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::output::view::{PredictionPanel, history_rows};
use crate::progress::Progress;

const HELP: &str = "\
Type a headline or snippet and press Enter to classify it.
  /history      show the history, newest first
  /delete <n>   delete the n-th entry shown by /history
  /refresh      reload the history from the backend
  /help         show this help
  /quit         leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Submit(String),
    History,
    Delete(usize),
    Refresh,
    Help,
    Quit,
    Invalid(String),
}

impl ShellCommand {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Submit(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("quit" | "exit" | "q"), None, None) => Self::Quit,
            (Some("history" | "h"), None, None) => Self::History,
            (Some("refresh" | "r"), None, None) => Self::Refresh,
            (Some("help" | "?"), None, None) => Self::Help,
            (Some("delete" | "d"), Some(position), None) => match position.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Delete(n),
                _ => Self::Invalid(format!("not a history position: {position}")),
            },
            (Some("delete" | "d"), _, _) => Self::Invalid("usage: /delete <n>".to_string()),
            _ => Self::Invalid(format!("unknown command: {trimmed} (try /help)")),
        }
    }
}

/// Handle `verity shell`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = ctx.session()?;

    if !session.start().await {
        if let Some(notice) = session.take_notice() {
            eprintln!("warning: {notice}");
        }
    }
    if !flags.quiet {
        eprintln!("{HELP}");
    }

    let result = repl(&session, flags).await;
    session.teardown();
    result
}

async fn repl(session: &Session<HttpGateway>, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(flags);
        let Some(line) = lines
            .next_line()
            .await
            .context("failed to read from stdin")?
        else {
            break;
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Quit => break,
            ShellCommand::Help => eprintln!("{HELP}"),
            ShellCommand::History => output(&history_rows(&session.view().history), flags.format)?,
            ShellCommand::Refresh => refresh(session).await,
            ShellCommand::Delete(position) => delete(session, position).await,
            ShellCommand::Invalid(message) => eprintln!("{message}"),
            ShellCommand::Submit(text) => {
                if !submit(session, text, flags).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn prompt(flags: &GlobalFlags) {
    if flags.quiet {
        return;
    }
    eprint!("> ");
    let _ = std::io::stderr().flush();
}

/// Returns `false` once the session has been torn down.
async fn submit(
    session: &Session<HttpGateway>,
    text: String,
    flags: &GlobalFlags,
) -> anyhow::Result<bool> {
    session.set_input(text);

    let spinner = Progress::spinner("Scanning...");
    let outcome = tokio::select! {
        outcome = session.submit() => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.teardown();
            SubmitOutcome::Cancelled
        }
    };
    spinner.finish_clear();

    match outcome {
        SubmitOutcome::Succeeded(result) => {
            output(&PredictionPanel::from(&result), flags.format)?;
        }
        SubmitOutcome::Failed(_) => report_notice(session),
        SubmitOutcome::Rejected(_) => eprintln!("Enter some text to classify."),
        SubmitOutcome::Ignored => eprintln!("A prediction is already running."),
        SubmitOutcome::Cancelled => {
            eprintln!("cancelled");
            return Ok(false);
        }
    }
    Ok(true)
}

async fn refresh(session: &Session<HttpGateway>) {
    match session.refresh().await {
        Ok(0) => eprintln!("history refreshed"),
        Ok(pending) => eprintln!("history refreshed; {pending} recent entries not listed by the backend yet"),
        Err(SessionError::TornDown) => {}
        Err(SessionError::Gateway(_) | SessionError::Unresolved { .. }) => report_notice(session),
    }
}

async fn delete(session: &Session<HttpGateway>, position: usize) {
    let Some(key) = session
        .view()
        .history
        .get(position - 1)
        .map(|entry| entry.key.clone())
    else {
        eprintln!("no history entry #{position}; run /history to see positions");
        return;
    };

    match session.delete(&key).await {
        Ok(removed) => eprintln!("deleted {key} ({removed} removed)"),
        Err(SessionError::TornDown) => {}
        Err(SessionError::Gateway(_) | SessionError::Unresolved { .. }) => report_notice(session),
    }
}

fn report_notice(session: &Session<HttpGateway>) {
    if let Some(notice) = session.take_notice() {
        eprintln!("{notice}");
    }
}
