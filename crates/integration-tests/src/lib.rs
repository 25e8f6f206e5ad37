//! Test harness for the Merch storefront.
//!
//! [`TestApp`] drives the real router in-process with an in-memory account
//! store and session store, keeping the session cookie between requests
//! like a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p merch-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! TEST_DATABASE_URL=postgres://localhost/merch_test \
//!     cargo test -p merch-integration-tests -- --include-ignored
//! ```

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

use merch_storefront::config::{SentryConfig, StorefrontConfig};
use merch_storefront::db::memory::MemoryAccountStore;
use merch_storefront::middleware::session::SESSION_COOKIE_NAME;
use merch_storefront::state::AppState;

/// Session secret used by every test app.
pub const TEST_SESSION_SECRET: &str = "t3st-S3ss10n-k3y-9fQ2xLm7Rz4VbN8wKp1Yc6";

/// Configuration for in-process tests; the database URL is never used.
///
/// # Panics
///
/// Never; the base URL is a valid literal.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused/merch"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: Url::parse("http://localhost:3000").expect("valid base URL"),
        session_secret: SecretString::from(TEST_SESSION_SECRET),
        sentry: SentryConfig::default(),
    }
}

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `Location` header of redirects.
    pub location: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Whether this is a redirect to `path`.
    #[must_use]
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status.is_redirection() && self.location.as_deref() == Some(path)
    }
}

/// The storefront router plus a browser-like cookie jar.
pub struct TestApp {
    router: Router,
    /// Backing account store, for assertions.
    pub store: Arc<MemoryAccountStore>,
    cookie: Mutex<Option<String>>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let state = AppState::new(test_config(), store.clone());
        Self {
            router: merch_storefront::app(state, MemoryStore::default()),
            store,
            cookie: Mutex::new(None),
        }
    }

    /// Start a new browser against the same stores, without cookies.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            store: self.store.clone(),
            cookie: Mutex::new(None),
        }
    }

    /// The current session cookie value, if any.
    ///
    /// # Panics
    ///
    /// Panics if the cookie jar lock is poisoned.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// Send a POST with a urlencoded form body.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send(&self, method: Method, path: &str, form: Option<String>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(cookie) = self.session_cookie() {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={cookie}"));
        }
        let request = match form {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body)),
            None => request.body(Body::empty()),
        }
        .unwrap_or_else(|e| panic!("invalid request: {e}"));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        self.store_cookie(response.headers());

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));

        TestResponse {
            status,
            location,
            headers: parts.headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(rest) = value.strip_prefix(&prefix) else {
                continue;
            };
            let cookie = rest.split(';').next().unwrap_or_default();
            let expired = value.to_ascii_lowercase().contains("max-age=0");
            if let Ok(mut jar) = self.cookie.lock() {
                *jar = (!cookie.is_empty() && !expired).then(|| cookie.to_owned());
            }
        }
    }

    /// Sign up with the given fields merged over a valid default form.
    pub async fn signup(&self, overrides: &[(&str, &str)]) -> TestResponse {
        let mut fields: Vec<(&str, &str)> = vec![
            ("full_name", "Jane Doe"),
            ("email", "jane@x.com"),
            ("mobile", "5551234"),
            ("password", "Secret1!"),
            ("confirm_password", "Secret1!"),
        ];
        for (key, value) in overrides {
            match fields.iter_mut().find(|(k, _)| k == key) {
                Some(field) => field.1 = value,
                None => fields.push((key, value)),
            }
        }
        self.post_form("/signup/", &fields).await
    }

    /// Log in and return the response.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login/", &[("email", email), ("password", password)])
            .await
    }
}
