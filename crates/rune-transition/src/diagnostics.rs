//! Default diagnostic sink.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::env::DiagnosticSink;

/// Emits diagnostics through `tracing`, once per distinct message and context.
#[derive(Debug)]
pub struct TracingDiagnostics {
    seen: RefCell<HashSet<(String, String)>>,
    dedupe: bool,
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self::with_dedupe(true)
    }

    /// With `dedupe` off every call is emitted.
    pub fn with_dedupe(dedupe: bool) -> Self {
        Self {
            seen: RefCell::new(HashSet::new()),
            dedupe,
        }
    }

    /// Number of distinct diagnostics recorded for deduplication; always zero
    /// with dedupe off.
    pub fn emitted(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl DiagnosticSink for TracingDiagnostics {
    fn warn_once(&self, message: &str, context: &str) {
        if self.dedupe
            && !self
                .seen
                .borrow_mut()
                .insert((message.to_string(), context.to_string()))
        {
            return;
        }
        tracing::warn!(context = %context, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_distinct_pairs() {
        let sink = TracingDiagnostics::new();
        sink.warn_once("missing transition", "fade");
        sink.warn_once("missing transition", "fade");
        sink.warn_once("missing transition", "slide");
        assert_eq!(sink.emitted(), 2);
    }

    #[test]
    fn test_without_dedupe_nothing_is_retained() {
        let sink = TracingDiagnostics::with_dedupe(false);
        for _ in 0..100 {
            sink.warn_once("missing transition", "fade");
        }
        assert_eq!(sink.emitted(), 0);
    }
}
