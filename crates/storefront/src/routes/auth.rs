//! Signup, login and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, report_internal, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::routes::pages::nav_user;
use crate::services::account::{AccountService, LoginError, SignupError, SignupRequest};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
///
/// Missing fields deserialize as empty so they fail the required-field
/// check instead of the form extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    #[serde(alias = "fullname")]
    pub full_name: String,
    pub email: String,
    pub country_code: Option<String>,
    pub mobile: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl From<SignupForm> for SignupRequest {
    fn from(form: SignupForm) -> Self {
        Self {
            full_name: form.full_name,
            email: form.email,
            country_code: form.country_code,
            mobile: form.mobile,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
///
/// Only known codes are turned into messages.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Message for a success code on the login page.
fn login_success_message(code: &str) -> Option<&'static str> {
    match code {
        "account_created" => Some("Account created successfully. Please log in."),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub nav_user: Option<String>,
    pub error: Option<&'static str>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav_user: Option<String>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    /// Email to pre-fill after a failed attempt.
    pub email: String,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    auth: OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    SignupTemplate {
        nav_user: nav_user(auth),
        error: query
            .error
            .as_deref()
            .and_then(SignupError::message_for_code),
    }
}

/// Handle signup form submission.
///
/// Redirects to the login page on success and back to the signup page with
/// an error code otherwise.
#[instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let service = AccountService::new(state.accounts());

    match service.signup(&form.into()).await {
        Ok(_) => Redirect::to("/login/?success=account_created").into_response(),
        Err(err) => {
            match &err {
                SignupError::Internal(cause) => report_internal(cause, "signup failed"),
                other => tracing::info!(reason = other.code(), "signup rejected"),
            }
            Redirect::to(&format!("/signup/?error={}", err.code())).into_response()
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    auth: OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        nav_user: nav_user(auth),
        error: None,
        success: query.success.as_deref().and_then(login_success_message),
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// A failed login re-renders the form with the same message whatever the
/// cause.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let service = AccountService::new(state.accounts());

    match service.login(&form.email, &form.password).await {
        Ok((user, password_hash)) => {
            set_current_user(
                &session,
                &state.config().session_secret,
                &user,
                &password_hash,
            )
            .await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ LoginError::InvalidCredentials) => {
            tracing::info!("login failed");
            Ok(LoginTemplate {
                nav_user: None,
                error: Some(err.message()),
                success: None,
                email: form.email.trim().to_owned(),
            }
            .into_response())
        }
        Err(LoginError::Internal(cause)) => Err(cause.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the home page.
pub async fn logout(
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!(user_id = %user.id, "user logged out");
    Ok(Redirect::to("/"))
}
