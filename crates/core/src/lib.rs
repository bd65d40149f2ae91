//! Voltcart Core - Shared types library.
//!
//! This crate provides common types used across all Voltcart components:
//! - `storefront` - Customer-facing e-commerce site (including the
//!   role-gated admin pages)
//! - `integration-tests` - Router-level test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles,
//!   and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
