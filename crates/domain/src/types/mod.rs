//! Domain types and models

pub mod auth;
pub mod parameter;

pub use auth::AuthToken;
pub use parameter::{
    payload_value, ChangeKey, ParameterReading, ParameterUpdate, RawValue, UpdateOutcome,
};
