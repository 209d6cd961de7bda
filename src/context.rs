//! Invocation Context
//!
//! Everything the host hands over for a single render: the directory to
//! inspect, an environment snapshot, a cancellation handle and a sink for
//! diagnostic lines.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Cloneable cancellation handle shared between the host and a render.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the render holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call context supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct SegmentContext {
    pub cwd: Option<PathBuf>,
    pub environ: HashMap<String, String>,
    pub cancel: CancelFlag,
}

impl SegmentContext {
    /// Creates a context for `cwd` with the given environment snapshot.
    pub fn new(cwd: Option<PathBuf>, environ: HashMap<String, String>) -> Self {
        Self {
            cwd,
            environ,
            cancel: CancelFlag::new(),
        }
    }

    /// Creates a context from the current process: its working directory
    /// and its environment. Variables that are not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        let environ = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        Self::new(std::env::current_dir().ok(), environ)
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the directory to inspect, or `None` if absent or empty.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd
            .as_deref()
            .filter(|cwd| !cwd.as_os_str().is_empty())
    }
}

/// Receives diagnostic lines the host should surface to the user.
pub trait ErrorSink {
    fn error(&mut self, line: &str);
}

impl<F: FnMut(&str)> ErrorSink for F {
    fn error(&mut self, line: &str) {
        self(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_dir_ignores_empty_path() {
        let ctx = SegmentContext::new(Some(PathBuf::new()), HashMap::new());
        assert!(ctx.working_dir().is_none());

        let ctx = SegmentContext::new(None, HashMap::new());
        assert!(ctx.working_dir().is_none());

        let ctx = SegmentContext::new(Some(PathBuf::from("/tmp/wc")), HashMap::new());
        assert_eq!(ctx.working_dir(), Some(Path::new("/tmp/wc")));
    }

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let ctx = SegmentContext::default().with_cancel(flag.clone());

        assert!(!ctx.cancel.is_cancelled());
        flag.cancel();
        assert!(ctx.cancel.is_cancelled());
    }

    #[test]
    fn test_error_sinks() {
        let mut lines: Vec<String> = Vec::new();
        let mut collect = |line: &str| lines.push(line.to_string());
        collect.error("first");

        let mut count = 0;
        let mut counter = |_: &str| count += 1;
        counter.error("second");

        assert_eq!(lines, vec!["first"]);
        assert_eq!(count, 1);
    }
}
