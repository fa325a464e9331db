//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: Testnet ERC-20 interaction via alloy-rs
//! - `persistence`: Atomic JSON record files and an in-memory store
//! - `fixtures`: Marketplace listing loader

pub mod chain;
pub mod fixtures;
pub mod persistence;
