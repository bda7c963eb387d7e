//! Domain models and rules

use thiserror::Error;

pub mod order;
pub mod permissions;
pub mod stock;

pub use order::*;
pub use permissions::*;
pub use stock::*;

/// Error for parsing a domain enum from its wire representation
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
