//! Statement normalization and classification

use std::str::FromStr;

use crate::error::{ParseError, Result};

/// Substrings removed before classification, in removal order.
///
/// Removal is plain substring replacement, so a token can also be clipped
/// out of the middle of a word: `his col` becomes `hcol` and `min (x)`
/// becomes `m(x)`.
pub const NOISE_TOKENS: [&str; 15] = [
    "union ",
    "all ",
    "inner ",
    "join ",
    "is ",
    "not ",
    "null ",
    "(nolock)",
    "and ",
    "getdate()",
    "between ",
    "order ",
    "by ",
    "asc ",
    "in ",
];

/// Lower-case, trim and strip noise tokens
pub fn normalize(sql: &str) -> String {
    strip_noise(sql.trim().to_lowercase()).trim().to_string()
}

fn strip_noise(mut text: String) -> String {
    for token in NOISE_TOKENS {
        if text.contains(token) {
            text = text.replace(token, "");
        }
    }
    text
}

/// Statement kinds the analyzer can extract from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
}

impl StatementKind {
    /// Classify a normalized statement by its first token
    pub fn classify(normalized: &str) -> Result<Self> {
        normalized.split_whitespace().next().unwrap_or("").parse()
    }

    /// Whether a trailing WHERE clause is mined for columns
    pub fn reads_where_clause(&self) -> bool {
        matches!(self, StatementKind::Select | StatementKind::Update)
    }
}

impl FromStr for StatementKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "select" => Ok(StatementKind::Select),
            "insert" => Ok(StatementKind::Insert),
            "update" => Ok(StatementKind::Update),
            other => Err(ParseError::unclassifiable(other)),
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Select => write!(f, "select"),
            StatementKind::Insert => write!(f, "insert"),
            StatementKind::Update => write!(f, "update"),
        }
    }
}
