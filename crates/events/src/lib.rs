#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for build progress reporting in apkb
//!
//! Library crates never print. They emit [`AppEvent`]s through an
//! [`EventSender`]; the host decides how to present them. The [`sink`]
//! module provides the plain line-per-event rendering a host UI consumes.

pub mod events;
pub mod sink;

pub use events::{AppEvent, GeneralEvent, PipelineEvent, ProcessEvent};
pub use sink::{LineFormat, LineSink};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by anything that may carry an [`EventSender`], so callers can
/// emit without checking whether a receiver was attached.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event with details
    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
