//! Extractor -> analyzer wiring for one text stream

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::{Analyzer, FailureLog, ParseContext, TimingStats};
use crate::extractor::{LogBlockExtractor, QueryEvent};
use crate::inventory::Inventory;

/// Everything learned from one or more log streams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub events: Vec<QueryEvent>,
    pub inventory: Inventory,
    pub failures: FailureLog,
    pub timing: TimingStats,
}

impl Analysis {
    /// Combine the analysis of an independent stream into this one.
    ///
    /// Inventories are set-unioned; events, failures, durations and the
    /// ratchet histories are concatenated.
    pub fn merge(&mut self, other: Analysis) {
        self.events.extend(other.events);
        self.inventory.merge(&other.inventory);
        self.failures.merge(&other.failures);
        self.timing.merge(&other.timing);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the extractor over a stream of lines and analyzes each event.
///
/// One pipeline per stream: the parse context is carried from one event to
/// the next, so interleaving streams would attribute WHERE columns to the
/// wrong table.
#[derive(Debug, Default)]
pub struct Pipeline {
    analyzer: Analyzer,
    context: ParseContext,
    events: Vec<QueryEvent>,
    parsed: usize,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a whole stream in one go
    pub fn run<L>(lines: L) -> Analysis
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let mut pipeline = Self::new();
        pipeline.consume(lines);
        pipeline.finish()
    }

    /// Feed more lines of the same stream
    pub fn consume<L>(&mut self, lines: L)
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        for event in LogBlockExtractor::new(lines) {
            self.feed_event(event);
        }
    }

    /// Analyze one extracted event and keep it for the event report
    pub fn feed_event(&mut self, event: QueryEvent) -> bool {
        let parsed = self
            .analyzer
            .process_query(&mut self.context, &event.sql_text);
        if parsed {
            self.parsed += 1;
        }
        self.events.push(event);
        parsed
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    pub fn finish(self) -> Analysis {
        info!(
            events = self.events.len(),
            parsed = self.parsed,
            failed = self.analyzer.failures().len(),
            "stream analyzed"
        );
        let (inventory, failures, timing) = self.analyzer.into_parts();
        Analysis {
            events: self.events,
            inventory,
            failures,
            timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_events_threads_context() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.feed_event(QueryEvent::new("c", "select a from s.t", vec![], "0")));
        assert!(!pipeline.feed_event(QueryEvent::new("c", "commit", vec![], "0")));
        assert_eq!(pipeline.context().last_used_table(), Some("t"));

        let analysis = pipeline.finish();
        assert_eq!(analysis.events.len(), 2);
        assert!(analysis.has_failures());
        assert!(analysis.inventory.contains("s", "t", "a"));
    }

    #[test]
    fn test_merge_concatenates_streams() {
        let mut left = Pipeline::new();
        left.feed_event(QueryEvent::new("c", "select a from s.t; 10 ms.", vec![], "0"));
        let mut right = Pipeline::new();
        right.feed_event(QueryEvent::new("c", "select b from s.t; 4 ms.", vec![], "0"));
        right.feed_event(QueryEvent::new("c", "select c from s.t; 30 ms.", vec![], "0"));

        let mut merged = left.finish();
        merged.merge(right.finish());

        assert_eq!(merged.events.len(), 3);
        assert_eq!(merged.inventory.column_count(), 3);
        assert_eq!(merged.timing.all_durations_ms(), [10, 4, 30]);
        assert_eq!(merged.timing.max_duration_ms(), 30);
        assert_eq!(merged.timing.statements_at_max().len(), 3);
    }
}
