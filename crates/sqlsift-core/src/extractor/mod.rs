//! Log block extractor
//!
//! jdbcdslog writes a marker line naming the logger (connection, statement
//! or result set) and puts the payload on the following line. A statement
//! marker followed by a "Total of N rows read" line closes a block.
//!
//! ```text
//! ... jdbcds.ConnectionLogger ...      <- marker
//! INFO: connection-id                  <- payload from column 6
//! ... jdbcds.StatementLogger ...       <- marker
//! INFO: select a from s.t              <- payload from column 6
//! ... jdbcds.ResultSetLogger ...       <- marker
//! <31-column prefix>{row}              <- payload from column 31, last char dropped
//! ... jdbcds.StatementLogger ...       <- marker
//! Total of 1 rows read                 <- emits a QueryEvent
//! ```

mod event;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

pub use event::QueryEvent;

/// Column where connection and statement payloads start
pub const PAYLOAD_OFFSET: usize = 6;
/// Column where result-row payloads start
pub const RESULT_PAYLOAD_OFFSET: usize = 31;

static CONNECTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"jdbcds.*ConnectionLogger").expect("connection marker is valid"));
static STATEMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"jdbcds.*StatementLogger").expect("statement marker is valid"));
static RESULT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"jdbcds.*ResultSetLogger").expect("result marker is valid"));
static TOTAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Total of (.*) rows read").expect("total marker is valid"));

/// What the next line is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    ExpectConnectionLine,
    ExpectStatementLine,
    ExpectResultLine,
}

impl ScanState {
    /// State implied by the marker a line carries, if any
    fn after(line: &str) -> Self {
        if CONNECTION_MARKER.is_match(line) {
            ScanState::ExpectConnectionLine
        } else if STATEMENT_MARKER.is_match(line) {
            ScanState::ExpectStatementLine
        } else if RESULT_MARKER.is_match(line) {
            ScanState::ExpectResultLine
        } else {
            ScanState::Idle
        }
    }
}

/// Push-style block assembler: feed lines one at a time.
///
/// The connection and statement survive an emitted event, so several
/// blocks on the same connection do not need to repeat them. Result rows
/// are cleared on every emission.
#[derive(Debug, Clone, Default)]
pub struct BlockScanner {
    state: ScanState,
    connection: String,
    statement: String,
    rows: Vec<String>,
    line_number: usize,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Consume one line, returning an event when it closes a block
    pub fn feed(&mut self, line: &str) -> Option<QueryEvent> {
        self.line_number += 1;

        let emitted = match self.state {
            ScanState::Idle => None,
            ScanState::ExpectStatementLine => match TOTAL_MARKER.captures(line) {
                Some(caps) => self.finish_block(&caps[1]),
                None => {
                    if let Some(statement) = self.payload(line, PAYLOAD_OFFSET) {
                        self.statement = statement.to_string();
                    }
                    None
                }
            },
            ScanState::ExpectConnectionLine => {
                if let Some(connection) = self.payload(line, PAYLOAD_OFFSET) {
                    self.connection = connection.to_string();
                }
                None
            }
            ScanState::ExpectResultLine => {
                if let Some(row) = self.payload(line, RESULT_PAYLOAD_OFFSET) {
                    let mut row = row.to_string();
                    row.pop();
                    self.rows.push(row);
                }
                None
            }
        };

        self.state = ScanState::after(line);
        emitted
    }

    fn payload<'l>(&self, line: &'l str, offset: usize) -> Option<&'l str> {
        let payload = line.get(offset..);
        if payload.is_none() {
            trace!(line = self.line_number, "payload line too short, skipped");
        }
        payload
    }

    fn finish_block(&mut self, total: &str) -> Option<QueryEvent> {
        let rows = std::mem::take(&mut self.rows);
        if self.statement.trim().is_empty() {
            debug!(line = self.line_number, "row total without a statement, dropped");
            return None;
        }

        let event = QueryEvent::new(self.connection.clone(), self.statement.clone(), rows, total);
        debug!(
            line = self.line_number,
            connection = %event.connection_id,
            rows = event.result_rows.len(),
            "query event"
        );
        Some(event)
    }
}

/// Lazy, single-pass iterator of query events over a sequence of lines
pub struct LogBlockExtractor<I> {
    lines: I,
    scanner: BlockScanner,
}

impl<I> LogBlockExtractor<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new<L>(lines: L) -> Self
    where
        L: IntoIterator<IntoIter = I, Item = I::Item>,
    {
        Self {
            lines: lines.into_iter(),
            scanner: BlockScanner::new(),
        }
    }
}

impl<I> Iterator for LogBlockExtractor<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = QueryEvent;

    fn next(&mut self) -> Option<QueryEvent> {
        for line in self.lines.by_ref() {
            if let Some(event) = self.scanner.feed(line.as_ref()) {
                return Some(event);
            }
        }
        None
    }
}
