//! Schema/table/column inventory

mod record;
mod store;

pub use record::{sanitize_identifier, ParsedRecord, TableName};
pub use store::{Inventory, SchemaTables};
