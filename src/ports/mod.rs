//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TokenContract`: ERC-20 reads, owner-gated writes, receipt polling
//! - `StateRepository`: Named JSON record persistence

pub mod repository;
pub mod token_contract;
