//! Merch Core - Shared domain types.
//!
//! This crate provides the types used across the Merch components:
//! - `storefront` - Public-facing shop and account pages
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Account normalization rules (name splitting, mobile
//! formatting, password policy) live here so they can be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices, slugs, names, mobiles, password policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
