//! Utility functions shared across the engine.
//!
//! - [`code_generator`] - Short code generation and shape validation

pub mod code_generator;
