//! Presentation surfaces for streamed lines.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives ordered text lines for display
pub trait LineSink: Send {
    /// Remove everything shown so far
    fn clear(&mut self);

    /// Show one more line after the existing ones
    fn append(&mut self, line: String);
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn clear(&mut self) {
        (**self).clear();
    }

    fn append(&mut self, line: String) {
        (**self).append(line);
    }
}

/// In-memory sink whose buffer is shared between clones
///
/// Hand one clone to the session manager and keep another to read the
/// lines back.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current content
    pub fn lines(&self) -> Vec<String> {
        self.buffer().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    fn buffer(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LineSink for MemorySink {
    fn clear(&mut self) {
        self.buffer().clear();
    }

    fn append(&mut self, line: String) {
        self.buffer().push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_buffer() {
        let reader = MemorySink::new();
        let mut writer = reader.clone();

        writer.append("one".to_string());
        writer.append("two".to_string());
        assert_eq!(reader.lines(), vec!["one", "two"]);

        writer.clear();
        assert!(reader.is_empty());
    }

    #[test]
    fn boxed_sink_forwards_calls() {
        let reader = MemorySink::new();
        let mut boxed: Box<dyn LineSink> = Box::new(reader.clone());
        boxed.append("line".to_string());
        assert_eq!(reader.lines(), vec!["line"]);
    }
}
