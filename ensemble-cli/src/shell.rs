//! Diagnostic Sink
//!
//! Human-readable progress and failure lines. Runners write through a
//! [`Shell`] and never look at what it does with the text.

use std::sync::Mutex;

/// Destination for progress and failure lines
pub trait Shell: Send + Sync {
    /// Emit a progress line
    fn say(&self, text: &str);
    /// Emit a failure line
    fn say_error(&self, text: &str);
}

/// Writes progress to stdout and failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleShell;

impl Shell for ConsoleShell {
    fn say(&self, text: &str) {
        println!("{text}");
    }

    fn say_error(&self, text: &str) {
        eprintln!("{text}");
    }
}

/// A line recorded by [`MemoryShell`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Written with [`Shell::say`]
    Out(String),
    /// Written with [`Shell::say_error`]
    Err(String),
}

/// Records every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryShell {
    lines: Mutex<Vec<Line>>,
}

impl MemoryShell {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn lines(&self) -> Vec<Line> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Progress lines only
    pub fn out(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                Line::Out(text) => Some(text),
                Line::Err(_) => None,
            })
            .collect()
    }

    /// Failure lines only
    pub fn err(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                Line::Err(text) => Some(text),
                Line::Out(_) => None,
            })
            .collect()
    }

    fn push(&self, line: Line) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Shell for MemoryShell {
    fn say(&self, text: &str) {
        self.push(Line::Out(text.to_string()));
    }

    fn say_error(&self, text: &str) {
        self.push(Line::Err(text.to_string()));
    }
}
