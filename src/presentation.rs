//! Presentation port.
//!
//! The store never formats output itself. It hands the chosen quote, the
//! category options and status messages to a [`Presenter`].

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::models::Quote;

/// How long a status message stays visible.
pub const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(5);

pub trait Presenter: Send {
    fn render_quote(&mut self, quote: &Quote);
    /// The selected category has no quotes.
    fn render_empty(&mut self, category: &str);
    /// `options` starts with the "all" sentinel, followed by sorted categories.
    fn render_category_options(&mut self, options: &[String]);
    fn show_status(&mut self, message: &str, success: bool);
    /// The status still on screen, if it has not cleared.
    fn status(&self) -> Option<Status>;
}

/// A status message as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub success: bool,
}

/// Holds the most recent status until it expires.
#[derive(Debug)]
pub struct StatusLine {
    clear_after: Duration,
    current: Option<(Status, Instant)>,
}

impl StatusLine {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            clear_after,
            current: None,
        }
    }

    pub fn set(&mut self, message: &str, success: bool) {
        let status = Status {
            message: message.to_string(),
            success,
        };
        self.current = Some((status, Instant::now()));
    }

    /// The visible status, if it has not timed out yet.
    pub fn current(&self) -> Option<&Status> {
        match &self.current {
            Some((status, shown_at)) if shown_at.elapsed() < self.clear_after => Some(status),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(STATUS_CLEAR_AFTER)
    }
}

/// Writes quotes to stdout and status lines to stderr.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    status: StatusLine,
}

impl TerminalPresenter {
    pub fn new(status_clear_after: Duration) -> Self {
        Self {
            status: StatusLine::new(status_clear_after),
        }
    }

}

impl Presenter for TerminalPresenter {
    fn render_quote(&mut self, quote: &Quote) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "\"{}\"", quote.text);
        let _ = writeln!(out, "Category: {}", quote.category);
    }

    fn render_empty(&mut self, category: &str) {
        println!("No quotes found for category: {}.", category);
    }

    fn render_category_options(&mut self, options: &[String]) {
        tracing::debug!("Category options: {}", options.join(", "));
    }

    fn show_status(&mut self, message: &str, success: bool) {
        let marker = if success { "ok" } else { "--" };
        eprintln!("[{}] {}", marker, message);
        self.status.set(message, success);
    }

    fn status(&self) -> Option<Status> {
        self.status.current().cloned()
    }
}

/// Something the store asked a presenter to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Quote(Quote),
    Empty(String),
    CategoryOptions(Vec<String>),
    Status { message: String, success: bool },
}

/// Presenter that records every call, for headless use and tests.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Arc<Mutex<Vec<PresenterEvent>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().expect("presenter lock poisoned").clone()
    }

    /// Status messages in the order they were shown.
    pub fn statuses(&self) -> Vec<(String, bool)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Status { message, success } => Some((message, success)),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(String, bool)> {
        self.statuses().pop()
    }

    /// The most recent category option list.
    pub fn last_options(&self) -> Option<Vec<String>> {
        self.events().into_iter().rev().find_map(|event| match event {
            PresenterEvent::CategoryOptions(options) => Some(options),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.events.lock().expect("presenter lock poisoned").clear();
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().expect("presenter lock poisoned").push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn render_quote(&mut self, quote: &Quote) {
        self.push(PresenterEvent::Quote(quote.clone()));
    }

    fn render_empty(&mut self, category: &str) {
        self.push(PresenterEvent::Empty(category.to_string()));
    }

    fn render_category_options(&mut self, options: &[String]) {
        self.push(PresenterEvent::CategoryOptions(options.to_vec()));
    }

    fn show_status(&mut self, message: &str, success: bool) {
        self.push(PresenterEvent::Status {
            message: message.to_string(),
            success,
        });
    }

    /// Recorded statuses never clear.
    fn status(&self) -> Option<Status> {
        self.last_status()
            .map(|(message, success)| Status { message, success })
    }
}
