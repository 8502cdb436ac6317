//! Error types for statement analysis

use miette::Diagnostic;

/// Result type used by the statement scanners
pub type Result<T> = std::result::Result<T, ParseError>;

/// Reasons a statement is not turned into an inventory record.
///
/// None of these abort a run. Unclassifiable and malformed statements end
/// up in the failure log; a missing timing annotation is simply skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ParseError {
    /// The first token is not `select`, `insert` or `update`
    #[error("unclassifiable statement starting with '{keyword}'")]
    #[diagnostic(
        code(sqlsift::unclassifiable),
        help("only SELECT, INSERT and UPDATE statements are analyzed")
    )]
    UnclassifiableStatement { keyword: String },

    /// An expected delimiter or name is missing
    #[error("malformed statement: {reason}")]
    #[diagnostic(code(sqlsift::malformed))]
    MalformedStatement { reason: String },

    /// No trailing `<n> ms.` annotation
    #[error("statement carries no elapsed time")]
    #[diagnostic(code(sqlsift::timing_unavailable))]
    TimingUnavailable,
}

impl ParseError {
    pub fn unclassifiable(keyword: impl Into<String>) -> Self {
        Self::UnclassifiableStatement {
            keyword: keyword.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedStatement {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::UnclassifiableStatement { .. } => FailureKind::UnclassifiableStatement,
            ParseError::MalformedStatement { .. } => FailureKind::MalformedStatement,
            ParseError::TimingUnavailable => FailureKind::TimingUnavailable,
        }
    }
}

/// Kinds of analysis failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// S0001: statement kind not recognized
    UnclassifiableStatement,
    /// S0002: delimiter or name missing
    MalformedStatement,
    /// S0003: no elapsed time in the statement
    TimingUnavailable,
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::UnclassifiableStatement => "S0001",
            FailureKind::MalformedStatement => "S0002",
            FailureKind::TimingUnavailable => "S0003",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::UnclassifiableStatement => "unclassifiable-statement",
            FailureKind::MalformedStatement => "malformed-statement",
            FailureKind::TimingUnavailable => "timing-unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_codes() {
        let err = ParseError::unclassifiable("delete");
        assert_eq!(err.kind(), FailureKind::UnclassifiableStatement);
        assert_eq!(err.kind().code(), "S0001");
        assert!(err.to_string().contains("delete"));

        let err = ParseError::malformed("missing ' from '");
        assert_eq!(err.kind().name(), "malformed-statement");
        assert_eq!(ParseError::TimingUnavailable.kind().code(), "S0003");
    }
}
