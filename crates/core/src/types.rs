/// Server identifiers are UUID strings; the client treats them as opaque.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
