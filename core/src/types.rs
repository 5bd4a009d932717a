//! Shared primitive types used across the engine.

use chrono::{DateTime, Utc};

/// Opaque, globally unique record identifier (UUID v4 text).
pub type RecordId = String;

/// Creation timestamp of a record. Always UTC.
pub type Timestamp = DateTime<Utc>;

/// Currency amounts. No rounding is applied inside the engine.
pub type Money = f64;
