//! Profile and password handlers.
//!
//! All routes require authentication.

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

use merch_core::PersonName;

use crate::error::{AppError, report_internal};
use crate::filters;
use crate::middleware::{RequireAuth, refresh_auth_hash};
use crate::models::{CurrentUser, Profile, ProfileUpdate, session_keys, user::display_name};
use crate::routes::auth::MessageQuery;
use crate::services::account::{AccountService, PasswordChangeError, ProfileUpdateError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Profile update form data; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl From<&ProfileForm> for ProfileUpdate {
    fn from(form: &ProfileForm) -> Self {
        Self::from_optional(
            form.full_name.as_deref(),
            form.mobile.as_deref(),
            form.gender.as_deref(),
            form.address.as_deref(),
            form.city.as_deref(),
            form.postal_code.as_deref(),
        )
    }
}

/// Password change form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

/// Message for a success code on the profile page.
fn profile_success_message(code: &str) -> Option<&'static str> {
    match code {
        "profile_updated" => Some("Profile updated successfully"),
        "password_changed" => Some("Your password was successfully updated"),
        _ => None,
    }
}

/// Message for an error code on the profile page.
fn profile_error_message(code: &str) -> Option<&'static str> {
    ProfileUpdateError::message_for_code(code)
        .or_else(|| PasswordChangeError::message_for_code(code))
}

// =============================================================================
// Templates
// =============================================================================

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub nav_user: Option<String>,
    pub username: String,
    pub profile: Profile,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the profile page, creating an empty profile on first visit.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let profile = AccountService::new(state.accounts())
        .profile(user.id)
        .await?;

    Ok(ProfileTemplate {
        nav_user: Some(user.display_name),
        username: user.username,
        profile,
        error: query.error.as_deref().and_then(profile_error_message),
        success: query.success.as_deref().and_then(profile_success_message),
    })
}

/// Handle profile update form submission.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let update = ProfileUpdate::from(&form);

    match AccountService::new(state.accounts())
        .update_profile(user.id, &update)
        .await
    {
        Ok(profile) => {
            refresh_display_name(&session, user, &profile).await?;
            Ok(Redirect::to("/profile/?success=profile_updated").into_response())
        }
        Err(err) => {
            if err.is_rejected_input() {
                tracing::warn!(error = %err, "profile update rejected");
            } else {
                report_internal(&err, "profile update failed");
            }
            Ok(Redirect::to(&format!("/profile/?error={}", err.code())).into_response())
        }
    }
}

/// Keep the navigation name in the session in step with the new full name.
async fn refresh_display_name(
    session: &Session,
    mut user: CurrentUser,
    profile: &Profile,
) -> Result<(), tower_sessions::session::Error> {
    let name = PersonName::split(&profile.full_name);
    user.display_name = display_name(&name.first, &name.last, &user.username);
    session.insert(session_keys::CURRENT_USER, &user).await
}

/// Handle password change form submission.
///
/// On success the session is re-keyed with a fresh authentication marker so
/// it stays logged in while older sessions are invalidated.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, AppError> {
    let result = AccountService::new(state.accounts())
        .change_password(
            user.id,
            &form.old_password,
            &form.new_password1,
            &form.new_password2,
        )
        .await;

    match result {
        Ok(password_hash) => {
            refresh_auth_hash(
                &session,
                &state.config().session_secret,
                user,
                &password_hash,
            )
            .await?;
            Ok(Redirect::to("/profile/?success=password_changed").into_response())
        }
        Err(err) => {
            match &err {
                PasswordChangeError::Internal(cause) => {
                    report_internal(cause, "password change failed");
                }
                other => tracing::info!(reason = other.code(), "password change rejected"),
            }
            Ok(Redirect::to(&format!("/profile/?error={}", err.code())).into_response())
        }
    }
}
