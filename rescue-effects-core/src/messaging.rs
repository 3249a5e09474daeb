//! Viewer-facing notifications.

use std::sync::Mutex;

/// Broadcast channel to the player and viewers. Fire-and-forget.
pub trait Messenger: Send + Sync {
    fn send_message(&self, text: &str);
}

/// Writes every message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn send_message(&self, text: &str) {
        log::info!("{}", text);
    }
}

/// Keeps every message in order; used by the simulator and tests.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    messages: Mutex<Vec<String>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut m| std::mem::take(&mut *m))
            .unwrap_or_default()
    }
}

impl Messenger for RecordingMessenger {
    fn send_message(&self, text: &str) {
        log::debug!("message: {}", text);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(text.to_string());
        }
    }
}
