//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations following the Repository
//! pattern; concrete implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for testing.

pub mod short_link_repository;

pub use short_link_repository::ShortLinkRepository;

#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
