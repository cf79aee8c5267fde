//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic, with a
//! separate `NewShortLink` struct for creation following the "New Type"
//! pattern.

pub mod short_link;

pub use short_link::{NewShortLink, ResolveTarget, ShortLink};
