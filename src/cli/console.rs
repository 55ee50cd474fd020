//! Terminal log sink for pipeline events.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

use crate::pipeline::{LogSink, PipelineEvent, Severity};

/// Writes events to stderr, with a spinner while the archive downloads.
pub struct ConsoleSink {
    term: Term,
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleSink {
    /// `quiet` hides informational events; warnings and errors still print.
    pub fn new(quiet: bool) -> Self {
        Self { term: Term::stderr(), spinner: None, quiet }
    }

    fn start_spinner(&mut self, location: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message(format!("Downloading {location}"));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl LogSink for ConsoleSink {
    fn push(&mut self, event: PipelineEvent) {
        match &event {
            PipelineEvent::FetchSucceeded | PipelineEvent::FetchFailed { .. } => self.stop_spinner(),
            _ => {}
        }

        let severity = event.severity();
        if self.quiet && severity == Severity::Info {
            return;
        }

        let line = match severity {
            Severity::Info => style(event.to_string()).dim().to_string(),
            Severity::Warning => style(event.to_string()).yellow().to_string(),
            Severity::Error => style(event.to_string()).red().bold().to_string(),
        };
        write_line(&mut self.term, &line);

        if let PipelineEvent::FetchStarted { location } = &event {
            self.start_spinner(location);
        }
    }
}

/// Write one line; a closed stderr is logged, not fatal.
fn write_line<W: Write>(out: &mut W, line: &str) -> bool {
    match writeln!(out, "{line}") {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "failed to write event to the terminal");
            false
        }
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
