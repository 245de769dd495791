//! Scoped diagnostic sink.
//!
//! Every parse attempt writes its warnings and errors into a [`ParseLog`]
//! rather than printing them: a candidate that ultimately fails must leave
//! no trace, so the driver opens a sub-scope per attempt, and either commits
//! the captured entries or drops them. At most one error xor any number of
//! warnings reaches the committed output per top-level parse call.

/// Severity of a single diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Error,
}

/// One user-facing message produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Entries captured by one `start_sub`/`stop_sub` scope.
#[derive(Debug, Default)]
pub struct SubLog {
    entries: Vec<Diagnostic>,
}

impl SubLog {
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.level == Level::Error)
    }

    /// The most recent error message in this scope, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|d| d.level == Level::Error)
            .map(|d| d.message.as_str())
    }
}

/// The diagnostic sink for one host surface (e.g. one script file being
/// loaded). Scopes nest: entries go to the innermost open scope, or to the
/// committed output when no scope is open.
#[derive(Debug, Default)]
pub struct ParseLog {
    frames: Vec<Vec<Diagnostic>>,
    committed: Vec<Diagnostic>,
}

impl ParseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            level: Level::Warning,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            level: Level::Error,
            message: message.into(),
        });
    }

    fn push(&mut self, d: Diagnostic) {
        match self.frames.last_mut() {
            Some(top) => top.push(d),
            None => self.committed.push(d),
        }
    }

    /// Open a capture scope. Must be balanced with [`stop_sub`](Self::stop_sub).
    pub fn start_sub(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Close the innermost scope and hand back what it captured.
    pub fn stop_sub(&mut self) -> SubLog {
        debug_assert!(!self.frames.is_empty(), "stop_sub without start_sub");
        SubLog {
            entries: self.frames.pop().unwrap_or_default(),
        }
    }

    /// Replay a captured scope into the current one: the attempt succeeded
    /// and its messages are for keeps.
    pub fn commit(&mut self, sub: SubLog) {
        for d in sub.entries {
            self.push(d);
        }
    }

    /// Surface only the last error of a failed attempt, or `default_error`
    /// when the attempt failed without recording one. Warnings are dropped.
    pub fn commit_errors(&mut self, sub: SubLog, default_error: &str) {
        match sub.last_error() {
            Some(e) => {
                let msg = e.to_string();
                self.error(msg);
            }
            None => self.error(default_error),
        }
    }

    /// Committed diagnostics, in emission order.
    pub fn committed(&self) -> &[Diagnostic] {
        &self.committed
    }

    /// Drain the committed diagnostics for the host to report.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_outside_scopes_commit_directly() {
        let mut log = ParseLog::new();
        log.warning("w");
        log.error("e");
        assert_eq!(log.committed().len(), 2);
        assert_eq!(log.committed()[1].level, Level::Error);
    }

    #[test]
    fn scoped_entries_are_captured_not_committed() {
        let mut log = ParseLog::new();
        log.start_sub();
        log.error("inner");
        let sub = log.stop_sub();
        assert!(log.committed().is_empty());
        assert!(sub.has_errors());
        assert_eq!(sub.last_error(), Some("inner"));
    }

    #[test]
    fn commit_replays_into_parent_scope() {
        let mut log = ParseLog::new();
        log.start_sub();
        log.start_sub();
        log.warning("kept");
        let inner = log.stop_sub();
        log.commit(inner);
        let outer = log.stop_sub();
        assert_eq!(outer.entries().len(), 1);
        assert_eq!(outer.entries()[0].message, "kept");
    }

    #[test]
    fn commit_errors_picks_last_error() {
        let mut log = ParseLog::new();
        log.start_sub();
        log.warning("w");
        log.error("first");
        log.error("second");
        let sub = log.stop_sub();
        log.commit_errors(sub, "fallback");
        assert_eq!(log.committed().len(), 1);
        assert_eq!(log.committed()[0].message, "second");
    }

    #[test]
    fn commit_errors_falls_back_to_default() {
        let mut log = ParseLog::new();
        log.start_sub();
        log.warning("only a warning");
        let sub = log.stop_sub();
        log.commit_errors(sub, "can't understand this");
        assert_eq!(log.committed().len(), 1);
        assert_eq!(log.committed()[0].message, "can't understand this");
        assert_eq!(log.committed()[0].level, Level::Error);
    }

    #[test]
    fn take_drains_committed() {
        let mut log = ParseLog::new();
        log.error("e");
        let drained = log.take();
        assert_eq!(drained.len(), 1);
        assert!(log.committed().is_empty());
    }
}
