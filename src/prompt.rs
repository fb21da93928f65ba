//! Interactive watch mode: periodic sync alongside a line-driven prompt.
//!
//! Commands, one per line:
//! empty line or `n` shows a quote, `c <category>` switches filter,
//! `a <text> | <category>` adds, `s` syncs now, `v` shows the current status
//! and the last viewed quote, `q` quits.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::models::{Quote, SyncOutcome, ALL_CATEGORIES};
use crate::remote::RemoteSource;
use crate::sync::SyncService;

/// Characters of the last viewed quote shown by `v`.
pub const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Filter(String),
    Add { text: String, category: String },
    Sync,
    View,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("" | "n", _) => Command::Next,
            ("c", category) => {
                let category = category.trim();
                if category.is_empty() {
                    Command::Filter(ALL_CATEGORIES.to_string())
                } else {
                    Command::Filter(category.to_string())
                }
            }
            ("a", rest) => {
                let (text, category) = rest.split_once('|').unwrap_or((rest, ""));
                Command::Add {
                    text: text.to_string(),
                    category: category.to_string(),
                }
            }
            ("s", _) => Command::Sync,
            ("v", _) => Command::View,
            ("q", _) => Command::Quit,
            (other, _) => Command::Unknown(other.to_string()),
        }
    }
}

/// Session line for the last viewed quote.
pub fn last_viewed_line(quote: Option<&Quote>) -> String {
    match quote {
        Some(quote) => {
            let preview: String = quote.text.chars().take(PREVIEW_CHARS).collect();
            format!("Last viewed quote (Session): \"{}...\"", preview)
        }
        None => "No session quote viewed yet.".to_string(),
    }
}

/// Run the prompt on `input` while syncing every `every`.
///
/// Returns once the prompt ends (quit, end of input, a read error or
/// Ctrl-C); the periodic sync is always shut down first.
pub async fn run_watch<R, I>(
    service: &SyncService<R>,
    input: I,
    every: Duration,
    on_outcome: impl Fn(&SyncOutcome),
) where
    R: RemoteSource,
    I: AsyncBufRead + Unpin,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let periodic = service.run_periodic(every, shutdown_rx, &on_outcome);
    let prompt = async {
        run_prompt(service, input, &on_outcome).await;
        let _ = shutdown_tx.send(true);
    };

    tokio::join!(periodic, prompt);
}

/// Read and execute commands until quit, end of input, a read error or
/// Ctrl-C.
pub async fn run_prompt<R, I>(service: &SyncService<R>, input: I, on_outcome: impl Fn(&SyncOutcome))
where
    R: RemoteSource,
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => Ok(None),
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read command: {}", e);
                break;
            }
        };

        match Command::parse(&line) {
            Command::Quit => break,
            command => execute(service, command, &on_outcome).await,
        }
    }
    tracing::debug!("Prompt closed");
}

async fn execute<R: RemoteSource>(
    service: &SyncService<R>,
    command: Command,
    on_outcome: &impl Fn(&SyncOutcome),
) {
    match command {
        Command::Next => {
            service.store().lock().await.show_random();
        }
        Command::Filter(category) => {
            service.store().lock().await.filter_and_pick(&category);
        }
        Command::Add { text, category } => {
            if let Err(e) = service.add_quote(&text, &category).await {
                service.store().lock().await.notify(&e.to_string(), false);
            }
        }
        Command::Sync => {
            let outcome = service.sync_now().await;
            on_outcome(&outcome);
        }
        Command::View => {
            let store = service.store();
            let store = store.lock().await;
            if let Some(status) = store.status() {
                let marker = if status.success { "ok" } else { "--" };
                println!("[{}] {}", marker, status.message);
            }
            println!("{}", last_viewed_line(store.last_viewed().as_ref()));
        }
        Command::Unknown(other) => eprintln!("Unknown command '{}'", other),
        Command::Quit => {}
    }
}
