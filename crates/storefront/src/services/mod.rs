//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `account` - Signup, login, profile and password management

pub mod account;
