//! Query events reconstructed from the log

use serde::{Deserialize, Serialize};

/// One unit of logged activity: connection, SQL text, result rows and the
/// row total reported when the statement's result set was closed.
///
/// Serializes with the field names of the event report
/// (`connection`, `query`, `results`, `total`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEvent {
    #[serde(rename = "connection")]
    pub connection_id: String,
    #[serde(rename = "query")]
    pub sql_text: String,
    #[serde(rename = "results")]
    pub result_rows: Vec<String>,
    /// Raw text captured from the "Total of ... rows read" marker
    #[serde(rename = "total")]
    pub total_text: String,
    #[serde(skip)]
    pub row_total: Option<u64>,
}

impl QueryEvent {
    pub fn new(
        connection_id: impl Into<String>,
        sql_text: impl Into<String>,
        result_rows: Vec<String>,
        total_text: impl Into<String>,
    ) -> Self {
        let total_text = total_text.into().trim().to_string();
        let row_total = total_text.parse().ok();
        Self {
            connection_id: connection_id.into(),
            sql_text: sql_text.into(),
            result_rows,
            total_text,
            row_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_total_parsing() {
        let event = QueryEvent::new("conn", "select 1", vec![], " 3 ");
        assert_eq!(event.row_total, Some(3));
        assert_eq!(event.total_text, "3");

        let event = QueryEvent::new("conn", "select 1", vec![], "many");
        assert_eq!(event.row_total, None);
    }
}
