//! ClickHouse adapter: row types and the direct-mode store.

pub mod row;
pub mod store;

pub use row::{IncidentRow, LogRow, SpanRow};
pub use store::{ClickHouseSettings, ClickHouseStore};
