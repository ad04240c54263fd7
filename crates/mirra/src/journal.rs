//! Conversion journaling.
//!
//! Long graph conversions are opaque when they go wrong. A [`Journal`]
//! receives one event per significant step, tagged with the recursion depth,
//! so a caller can reconstruct the traversal afterwards. The default sink
//! forwards to [`tracing`].

use std::fmt;

// -----------------------------------------------------------------------------
// Journal

/// Severity of a journal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalLevel {
    Trace,
    Info,
    Warn,
    Error,
}

impl fmt::Display for JournalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalLevel::Trace => f.write_str("trace"),
            JournalLevel::Info => f.write_str("info"),
            JournalLevel::Warn => f.write_str("warn"),
            JournalLevel::Error => f.write_str("error"),
        }
    }
}

/// A sink for conversion events.
pub trait Journal {
    /// Records one event. `depth` is the recursion depth at which it fired,
    /// starting at zero for the graph root.
    fn event(&mut self, level: JournalLevel, depth: usize, message: &str);
}

// -----------------------------------------------------------------------------
// Sinks

/// Forwards journal events to the active [`tracing`] subscriber.
#[derive(Debug, Default)]
pub struct TracingJournal;

impl Journal for TracingJournal {
    fn event(&mut self, level: JournalLevel, depth: usize, message: &str) {
        match level {
            JournalLevel::Trace => tracing::trace!(depth, "{message}"),
            JournalLevel::Info => tracing::debug!(depth, "{message}"),
            JournalLevel::Warn => tracing::warn!(depth, "{message}"),
            JournalLevel::Error => tracing::error!(depth, "{message}"),
        }
    }
}

/// Collects events in memory, indented by depth. Mostly useful in tests and
/// diagnostics endpoints.
#[derive(Debug, Default)]
pub struct BufferJournal {
    entries: Vec<(JournalLevel, String)>,
}

impl BufferJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events in arrival order.
    pub fn entries(&self) -> &[(JournalLevel, String)] {
        &self.entries
    }

    /// Renders the journal as one indented line per event.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (level, line) in &self.entries {
            out.push_str(&format!("[{level}] {line}\n"));
        }
        out
    }
}

impl Journal for BufferJournal {
    fn event(&mut self, level: JournalLevel, depth: usize, message: &str) {
        let mut line = String::new();
        for _ in 0..depth {
            line.push_str("  ");
        }
        line.push_str(message);
        self.entries.push((level, line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_indents_by_depth() {
        let mut journal = BufferJournal::new();
        journal.event(JournalLevel::Info, 0, "root");
        journal.event(JournalLevel::Warn, 2, "deep");

        assert_eq!(journal.entries().len(), 2);
        assert_eq!(journal.render(), "[info] root\n[warn]     deep\n");
    }
}
