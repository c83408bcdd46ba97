#![warn(missing_docs)]
//! Ensemble IPC Protocol
//!
//! Parent/child communication for process-isolated runs. Each isolated
//! worker gets a fresh one-shot pipe and reports a single text payload:
//! the `SUCCESS` marker, or `ERROR: ` followed by a message and a trace.

mod channel;
mod messages;

pub use channel::{ChannelReader, ChannelWriter, MAX_PAYLOAD_SIZE, channel};
pub use messages::{ERROR_MARKER, Outcome, PayloadError, SUCCESS_MARKER};
