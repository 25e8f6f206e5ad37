//! Domain models for the storefront.
//!
//! These types represent validated domain objects, separate from the
//! database row types in [`crate::db`].

pub mod catalog;
pub mod profile;
pub mod session;
pub mod user;

pub use catalog::{Category, NewProduct, Product};
pub use profile::{Profile, ProfileUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewAccount, User};
