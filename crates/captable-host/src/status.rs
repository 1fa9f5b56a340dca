//! Status bar — bounded history of messages written by plugins and the host.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use captable_abi::StatusLevel;

/// One status bar message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Severity.
    pub level: StatusLevel,
    /// Plugin that wrote the message, `None` for the host itself.
    pub source: Option<String>,
    /// Message text, copied out of the plugin's buffer.
    pub text: String,
    /// When the message was written.
    pub written_at: DateTime<Utc>,
}

impl StatusMessage {
    /// Creates a message stamped with the current time.
    pub fn new(level: StatusLevel, source: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            level,
            source: source.map(str::to_string),
            text: text.into(),
            written_at: Utc::now(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "[{}] {}: {}", self.level, source, self.text),
            None => write!(f, "[{}] {}", self.level, self.text),
        }
    }
}

/// Receiver of status bar messages in addition to the history.
pub trait StatusSink: fmt::Debug {
    /// Called for every message, after it is added to the history.
    fn write(&mut self, message: &StatusMessage);
}

/// Forwards status messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn write(&mut self, message: &StatusMessage) {
        let source = message.source.as_deref().unwrap_or("host");
        match message.level {
            StatusLevel::Info => info!(source = %source, "{}", message.text),
            StatusLevel::Warning => warn!(source = %source, "{}", message.text),
            StatusLevel::Error => error!(source = %source, "{}", message.text),
        }
    }
}

/// The host's status bar.
#[derive(Debug)]
pub struct StatusBar {
    capacity: usize,
    history: VecDeque<StatusMessage>,
    sinks: Vec<Box<dyn StatusSink>>,
}

impl StatusBar {
    /// Creates a status bar that keeps the last `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
            sinks: Vec::new(),
        }
    }

    /// Adds a sink that sees every later message.
    pub fn add_sink(&mut self, sink: Box<dyn StatusSink>) {
        self.sinks.push(sink);
    }

    /// Records a message, evicting the oldest one when full.
    pub fn write(&mut self, message: StatusMessage) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        for sink in &mut self.sinks {
            sink.write(&message);
        }
        self.history.push_back(message);
    }

    /// Most recent message.
    pub fn latest(&self) -> Option<&StatusMessage> {
        self.history.back()
    }

    /// Retained messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &StatusMessage> {
        self.history.iter()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl StatusSink for Recorder {
        fn write(&mut self, message: &StatusMessage) {
            self.0
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(message.to_string());
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut bar = StatusBar::new(2);
        for text in ["one", "two", "three"] {
            bar.write(StatusMessage::new(StatusLevel::Info, None, text));
        }
        let texts: Vec<&str> = bar.messages().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(bar.latest().map(|m| m.text.as_str()), Some("three"));
    }

    #[test]
    fn test_sinks_see_every_message() {
        let recorder = Recorder::default();
        let mut bar = StatusBar::new(1);
        bar.add_sink(Box::new(recorder.clone()));
        bar.write(StatusMessage::new(StatusLevel::Error, Some("echo"), "boom"));
        bar.write(StatusMessage::new(StatusLevel::Info, None, "ok"));

        let seen = recorder.0.lock().unwrap_or_else(|e| e.into_inner()).clone();
        assert_eq!(seen, vec!["[error] echo: boom", "[info] ok"]);
        assert_eq!(bar.len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut bar = StatusBar::new(0);
        bar.write(StatusMessage::new(StatusLevel::Warning, None, "kept"));
        assert_eq!(bar.len(), 1);
    }
}
