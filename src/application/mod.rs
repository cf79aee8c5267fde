//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository
//! calls and business rules. Services consume repository traits and present
//! a plain-data API to boundary layers.

pub mod services;
