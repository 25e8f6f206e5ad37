//! Core types for the Merch storefront.
//!
//! This module provides type-safe wrappers and normalization rules for
//! account and catalog data.

pub mod email;
pub mod id;
pub mod mobile;
pub mod name;
pub mod password;
pub mod price;
pub mod slug;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{DEFAULT_COUNTRY_CODE, format_mobile};
pub use name::PersonName;
pub use password::{PasswordPolicy, PasswordPolicyError, SPECIAL_CHARACTERS};
pub use price::{Price, PriceError};
pub use slug::{Slug, SlugError};
