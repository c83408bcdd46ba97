//! Result Payload
//!
//! The only message a worker ever sends is its outcome, as plain text:
//!
//! ```text
//! SUCCESS
//! ERROR: <message>\n<trace>
//! ```
//!
//! The message is escaped (`\\` and `\n`) so it always fits on the first line.

use thiserror::Error;

/// Marker written by a worker whose work unit completed
pub const SUCCESS_MARKER: &str = "SUCCESS";

/// Prefix written by a worker whose work unit failed
pub const ERROR_MARKER: &str = "ERROR: ";

/// Errors that can occur while reading or decoding a payload
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Reading the channel failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker closed the channel without writing anything
    #[error("Worker exited without reporting a result")]
    Empty,

    /// The payload starts with neither marker
    #[error("Unrecognized worker payload: {0:?}")]
    Unrecognized(String),

    /// The payload exceeded the size cap
    #[error("Payload too large: more than {max} bytes")]
    TooLarge {
        /// Size cap in bytes
        max: usize,
    },
}

/// Outcome of a work unit, as reported across the isolation boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The work unit returned normally
    Success,
    /// The work unit failed
    Error {
        /// What went wrong; may span several lines
        message: String,
        /// Remaining diagnostic text (backtrace, error chain)
        trace: String,
    },
}

impl Outcome {
    /// Build an error outcome
    pub fn error(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Outcome::Error {
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Wire form of this outcome
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Outcome::Success => SUCCESS_MARKER.as_bytes().to_vec(),
            Outcome::Error { message, trace } => {
                format!("{ERROR_MARKER}{}\n{trace}", escape(message)).into_bytes()
            }
        }
    }

    /// Parse a payload collected from a worker.
    ///
    /// An empty payload means the worker died before reporting and is an error.
    pub fn decode(payload: &[u8]) -> Result<Self, PayloadError> {
        if payload.is_empty() {
            return Err(PayloadError::Empty);
        }

        let text = String::from_utf8_lossy(payload);
        if let Some(rest) = text.strip_prefix(ERROR_MARKER) {
            let (message, trace) = rest.split_once('\n').unwrap_or((rest, ""));
            return Ok(Outcome::error(unescape(message), trace));
        }
        if text.starts_with(SUCCESS_MARKER) {
            return Ok(Outcome::Success);
        }

        Err(PayloadError::Unrecognized(
            text.chars().take(64).collect::<String>(),
        ))
    }
}

fn escape(message: &str) -> String {
    message.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
