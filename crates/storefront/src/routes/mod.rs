//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Pages
//! GET  /                           - Home page
//! GET  /products/                  - Product listing
//! GET  /cart/                      - Cart
//! GET  /checkout/                  - Checkout
//! GET  /thank/                     - Order confirmation
//!
//! # Auth
//! GET  /signup/                    - Signup form
//! POST /signup/                    - Create account
//! GET  /login/                     - Login form
//! POST /login/                     - Authenticate
//! GET  /logout/, POST /logout/     - End session (requires auth)
//!
//! # Account (requires auth)
//! GET  /profile/                   - View profile (created on first visit)
//! POST /profile/update/            - Update profile fields
//! POST /profile/change-password/   - Change password
//! ```

pub mod account;
pub mod auth;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/products/", get(pages::products))
        .route("/cart/", get(pages::cart))
        .route("/checkout/", get(pages::checkout))
        .route("/thank/", get(pages::thank))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(auth::signup_page).post(auth::signup))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/", get(account::profile))
        .route("/profile/update/", post(account::update_profile))
        .route(
            "/profile/change-password/",
            post(account::change_password),
        )
}

/// Create all routes for the storefront.
///
/// Paths keep their trailing slash; `/profile` and `/profile/` are distinct.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .merge(auth_routes())
        .merge(account_routes())
}
