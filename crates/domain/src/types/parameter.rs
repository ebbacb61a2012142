//! Parameter readings and the values derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value as read from the source table: numeric or SQL `NULL`.
pub type RawValue = Option<f64>;

/// One row fetched from the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterReading {
    /// Crusher interface id
    pub entity_id: i64,
    /// Parameter name as stored in the source
    pub parameter_name: String,
    /// Numeric value, `None` for SQL `NULL`
    pub value: RawValue,
    /// Source-side last update, epoch seconds.
    pub source_updated_at: i64,
}

impl ParameterReading {
    /// Build a reading from its column values.
    pub fn new(
        entity_id: i64,
        parameter_name: impl Into<String>,
        value: RawValue,
        source_updated_at: i64,
    ) -> Self {
        Self { entity_id, parameter_name: parameter_name.into(), value, source_updated_at }
    }

    /// Key under which this reading is tracked between cycles.
    pub fn key(&self) -> ChangeKey {
        ChangeKey::new(self.entity_id, self.parameter_name.clone())
    }

    /// Build the downstream update for this reading.
    pub fn to_update(&self) -> ParameterUpdate {
        ParameterUpdate {
            entity_id: self.entity_id,
            parameter_name: self.parameter_name.clone(),
            value: payload_value(self.value),
        }
    }
}

/// Identifies one tracked quantity: (entity id, parameter name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeKey {
    /// Crusher interface id
    pub entity_id: i64,
    /// Parameter name
    pub parameter_name: String,
}

impl ChangeKey {
    /// Key for `parameter_name` on entity `entity_id`.
    pub fn new(entity_id: i64, parameter_name: impl Into<String>) -> Self {
        Self { entity_id, parameter_name: parameter_name.into() }
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.entity_id, self.parameter_name)
    }
}

/// Payload for a single PATCH against the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    /// Target entity id
    pub entity_id: i64,
    /// Target parameter name
    pub parameter_name: String,
    /// Value sent in the PATCH body
    pub value: f64,
}

/// Result of a delivery attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The destination accepted the value.
    Applied,
    /// Every attempt was answered with 429; the value was not delivered.
    RateLimited {
        /// Requests made, first attempt included
        attempts: u32,
    },
}

/// Destination representation of a raw value. `NULL` is sent as zero.
pub fn payload_value(raw: RawValue) -> f64 {
    raw.unwrap_or(0.0)
}
