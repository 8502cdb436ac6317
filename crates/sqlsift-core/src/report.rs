//! Serializable views handed to report writers

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::analyzer::{FailureLog, TimingStats};
use crate::extractor::QueryEvent;
use crate::inventory::Inventory;
use crate::pipeline::Analysis;

/// Event-level view: `{ "queries": [ ... ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub queries: Vec<QueryEvent>,
}

/// Timing block of the summary, with the derived average
#[derive(Debug, Clone, Serialize)]
pub struct TimingSummary<'a> {
    #[serde(flatten)]
    pub stats: &'a TimingStats,
    pub average_ms: Option<f64>,
}

/// Combined view of one analysis
#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a> {
    pub inventory: &'a Inventory,
    pub failures: &'a FailureLog,
    pub timing: TimingSummary<'a>,
    pub events: usize,
}

impl<'a> Summary<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            inventory: &analysis.inventory,
            failures: &analysis.failures,
            timing: TimingSummary {
                stats: &analysis.timing,
                average_ms: analysis.timing.average_duration_ms(),
            },
            events: analysis.events.len(),
        }
    }
}

/// Pretty JSON with four-space indentation
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn events_as_json(events: &[QueryEvent]) -> serde_json::Result<String> {
    to_pretty_json(&EventLog {
        queries: events.to_vec(),
    })
}

pub fn inventory_as_json(inventory: &Inventory) -> serde_json::Result<String> {
    to_pretty_json(inventory)
}

impl Analysis {
    pub fn events_as_json(&self) -> serde_json::Result<String> {
        events_as_json(&self.events)
    }

    pub fn inventory_as_json(&self) -> serde_json::Result<String> {
        inventory_as_json(&self.inventory)
    }

    pub fn summary_as_json(&self) -> serde_json::Result<String> {
        to_pretty_json(&Summary::new(self))
    }
}
