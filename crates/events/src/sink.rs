//! Line-oriented text sink
//!
//! The only contract a host UI depends on: every event becomes exactly one
//! newline-terminated line written to an injected writer.

use crate::{AppEvent, EventReceiver};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// How each event is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFormat {
    /// Human-readable text ([`AppEvent`]'s `Display`)
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

/// Writes events to a text sink, one line each
pub struct LineSink<W> {
    writer: W,
    format: LineFormat,
    verbose: bool,
}

impl<W> LineSink<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a plain-text sink that hides debug events
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            format: LineFormat::Plain,
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    /// Include debug-level events (tool command lines, debug logs)
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Render one event as a line without its terminator, or `None` if the
    /// event is filtered out
    #[must_use]
    pub fn render(&self, event: &AppEvent) -> Option<String> {
        if event.is_debug() && !self.verbose {
            return None;
        }
        match self.format {
            LineFormat::Plain => Some(single_line(&event.to_string())),
            // serializing these plain enums cannot fail
            LineFormat::Json => serde_json::to_string(event).ok(),
        }
    }

    /// Write a single event
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub async fn write_event(&mut self, event: &AppEvent) -> std::io::Result<()> {
        if let Some(mut line) = self.render(event) {
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.flush().await?;
        }
        Ok(())
    }

    /// Write every event until all senders are dropped, then return the writer
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub async fn drain(mut self, mut receiver: EventReceiver) -> std::io::Result<W> {
        while let Some(event) = receiver.recv().await {
            self.write_event(&event).await?;
        }
        Ok(self.writer)
    }
}

/// Embedded line breaks would split one event over several lines
fn single_line(text: &str) -> String {
    if text.contains(['\n', '\r']) {
        text.replace("\r\n", " ").replace(['\n', '\r'], " ")
    } else {
        text.to_string()
    }
}
