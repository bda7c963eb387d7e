//! Shared domain types and rules for the store management platform
//!
//! Contains the types and pure business rules shared between the backend
//! services and the test suites: order/payment/stock enums, the stock
//! side-effect arithmetic, the permission model, and the declarative
//! role seed data.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
