//! SQL statement analyzer

mod normalize;
mod statements;
mod stats;

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::inventory::{Inventory, ParsedRecord, TableName};

pub use normalize::{normalize, StatementKind, NOISE_TOKENS};
pub use statements::{
    extract_where_columns, parse_insert, parse_select, parse_update, select_segments,
};
pub use stats::{extract_duration_ms, FailureLog, TimingStats};

/// Table most recently named by a successfully parsed statement.
///
/// A WHERE clause carries no schema of its own, so its columns are
/// attributed to this table. The context is threaded explicitly through
/// successive [`Analyzer::process_query`] calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    last_used: Option<TableName>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_used(&self) -> Option<&TableName> {
        self.last_used.as_ref()
    }

    pub fn last_used_schema(&self) -> Option<&str> {
        self.last_used.as_ref().map(|t| t.schema.as_str())
    }

    pub fn last_used_table(&self) -> Option<&str> {
        self.last_used.as_ref().map(|t| t.table.as_str())
    }

    fn remember(&mut self, record: &ParsedRecord) {
        self.last_used = Some(record.table_name());
    }
}

/// Result of analyzing one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// The outermost table of the statement and the columns recorded for it
    Parsed {
        schema: String,
        table: String,
        columns: Vec<String>,
    },
    /// Nothing was recorded; the statement went to the failure log
    Failed { raw_text: String },
}

impl StatementOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, StatementOutcome::Parsed { .. })
    }
}

/// SQL Analyzer - accumulates an inventory plus failure and timing data
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    inventory: Inventory,
    failures: FailureLog,
    timing: TimingStats,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze one statement; `true` when it contributed to the inventory
    pub fn process_query(&mut self, ctx: &mut ParseContext, sql: &str) -> bool {
        self.analyze(ctx, sql).is_parsed()
    }

    /// Analyze one statement and report what happened to it.
    ///
    /// On failure the original text is logged as failed and neither the
    /// inventory nor the context changes.
    pub fn analyze(&mut self, ctx: &mut ParseContext, sql: &str) -> StatementOutcome {
        let normalized = normalize(sql);
        let (kind, records) = match Self::extract(&normalized) {
            Ok(parsed) => parsed,
            Err(err) => {
                let kind = err.kind();
                warn!(
                    code = kind.code(),
                    kind = kind.name(),
                    error = %err,
                    "statement not analyzed"
                );
                self.failures.record(sql);
                return StatementOutcome::Failed {
                    raw_text: sql.to_string(),
                };
            }
        };

        for record in &records {
            debug!(
                kind = %kind,
                table = %record.table_name(),
                columns = record.columns.len(),
                "recorded statement"
            );
            self.inventory.record(record);
            ctx.remember(record);
        }

        // select_segments always yields at least one segment
        let mut primary = records[0].clone();
        if kind.reads_where_clause() {
            self.record_where_clause(ctx, sql, &mut primary);
        }

        match extract_duration_ms(sql) {
            Ok(duration_ms) => self.timing.observe(duration_ms, sql),
            Err(err) => trace!(error = %err, "no timing"),
        }

        StatementOutcome::Parsed {
            schema: primary.schema,
            table: primary.table,
            columns: primary.columns,
        }
    }

    /// Classify and run the matching scanner; every SELECT segment must parse
    fn extract(normalized: &str) -> Result<(StatementKind, Vec<ParsedRecord>)> {
        let kind = StatementKind::classify(normalized)?;
        let records = match kind {
            StatementKind::Select => select_segments(normalized)
                .into_iter()
                .map(parse_select)
                .collect::<Result<Vec<_>>>()?,
            StatementKind::Insert => vec![parse_insert(normalized)?],
            StatementKind::Update => vec![parse_update(normalized)?],
        };
        Ok((kind, records))
    }

    /// Mine the WHERE clause of the un-stripped text and attribute its
    /// columns to the context table
    fn record_where_clause(&mut self, ctx: &ParseContext, sql: &str, primary: &mut ParsedRecord) {
        let Some(target) = ctx.last_used() else {
            return;
        };
        let Some(columns) = extract_where_columns(&sql.trim().to_lowercase()) else {
            return;
        };

        match ParsedRecord::new(&target.schema, &target.table, &columns) {
            Ok(record) => {
                self.inventory.record(&record);
                if record.table_name() == primary.table_name() {
                    for column in record.columns {
                        if !primary.columns.contains(&column) {
                            primary.columns.push(column);
                        }
                    }
                }
            }
            Err(err) => trace!(error = %err, "where clause ignored"),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    pub fn timing(&self) -> &TimingStats {
        &self.timing
    }

    /// Replace the inventory with an empty one; failures and timing stay
    pub fn reset(&mut self) {
        self.inventory.reset();
    }

    pub fn into_parts(self) -> (Inventory, FailureLog, TimingStats) {
        (self.inventory, self.failures, self.timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_with_where() {
        let mut analyzer = Analyzer::new();
        let mut ctx = ParseContext::new();

        let outcome = analyzer.analyze(
            &mut ctx,
            "select col1, col2 from sales.orders where status = 'x'",
        );
        assert_eq!(
            outcome,
            StatementOutcome::Parsed {
                schema: "sales".to_string(),
                table: "orders".to_string(),
                columns: vec!["col1".into(), "col2".into(), "status".into()],
            }
        );
        assert_eq!(ctx.last_used_schema(), Some("sales"));
        assert_eq!(ctx.last_used_table(), Some("orders"));
    }

    #[test]
    fn test_unclassifiable_statement() {
        let mut analyzer = Analyzer::new();
        let mut ctx = ParseContext::new();

        assert!(!analyzer.process_query(&mut ctx, "DELETE FROM s.t"));
        assert!(analyzer.inventory().is_empty());
        assert_eq!(analyzer.failures().last_failed(), Some("DELETE FROM s.t"));
        assert!(ctx.last_used().is_none());
    }

    #[test]
    fn test_union_needs_every_branch() {
        let mut analyzer = Analyzer::new();
        let mut ctx = ParseContext::new();

        assert!(analyzer.process_query(
            &mut ctx,
            "select a from s.t union all select b from s.u"
        ));
        assert!(analyzer.inventory().contains("s", "t", "a"));
        assert!(analyzer.inventory().contains("s", "u", "b"));
        assert_eq!(ctx.last_used_table(), Some("u"));

        assert!(!analyzer.process_query(&mut ctx, "select c from s.v union select d from w"));
        assert!(!analyzer.inventory().contains_table("s", "v"));
    }

    #[test]
    fn test_reset_keeps_statistics() {
        let mut analyzer = Analyzer::new();
        let mut ctx = ParseContext::new();
        analyzer.process_query(&mut ctx, "select a from s.t; 5 ms.");
        analyzer.process_query(&mut ctx, "merge into s.t");

        analyzer.reset();
        assert!(analyzer.inventory().is_empty());
        assert_eq!(analyzer.timing().max_duration_ms(), 5);
        assert_eq!(analyzer.failures().len(), 1);
    }
}
