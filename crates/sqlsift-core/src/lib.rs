//! sqlsift-core: schema/table/column inventories from JDBC query logs
//!
//! The pipeline has two stages. The [`extractor`] turns jdbcdslog output
//! into [`QueryEvent`]s; the [`analyzer`] takes each event's SQL text and
//! records which schemas, tables and columns it touched, along with
//! failure and timing statistics.

pub mod analyzer;
pub mod error;
pub mod extractor;
pub mod inventory;
pub mod pipeline;
pub mod report;

pub use analyzer::{
    Analyzer, FailureLog, ParseContext, StatementKind, StatementOutcome, TimingStats,
};
pub use error::{FailureKind, ParseError};
pub use extractor::{BlockScanner, LogBlockExtractor, QueryEvent};
pub use inventory::{Inventory, ParsedRecord, TableName};
pub use pipeline::{Analysis, Pipeline};
