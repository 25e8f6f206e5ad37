//! Catalog and checkout page handlers.
//!
//! These pages are static templates; the only dynamic part is the
//! navigation bar, which shows the logged-in user's name.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;

/// Display name for the navigation bar, if logged in.
pub(crate) fn nav_user(auth: OptionalAuth) -> Option<String> {
    auth.0.map(|user| user.display_name)
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav_user: Option<String>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/products.html")]
pub struct ProductsTemplate {
    pub nav_user: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartTemplate {
    pub nav_user: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/checkout.html")]
pub struct CheckoutTemplate {
    pub nav_user: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/thanks.html")]
pub struct ThanksTemplate {
    pub nav_user: Option<String>,
}

/// Display the home page.
pub async fn home(auth: OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        nav_user: nav_user(auth),
    }
}

/// Display the product listing.
pub async fn products(auth: OptionalAuth) -> impl IntoResponse {
    ProductsTemplate {
        nav_user: nav_user(auth),
    }
}

/// Display the cart.
pub async fn cart(auth: OptionalAuth) -> impl IntoResponse {
    CartTemplate {
        nav_user: nav_user(auth),
    }
}

/// Display the checkout page.
pub async fn checkout(auth: OptionalAuth) -> impl IntoResponse {
    CheckoutTemplate {
        nav_user: nav_user(auth),
    }
}

/// Display the order confirmation.
pub async fn thank(auth: OptionalAuth) -> impl IntoResponse {
    ThanksTemplate {
        nav_user: nav_user(auth),
    }
}
