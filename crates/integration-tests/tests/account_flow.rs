//! Signup, login, profile and password change driven through the router.
//!
//! Run with: `cargo test -p merch-integration-tests --test account_flow`

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use merch_integration_tests::TestApp;

/// Sign up the default user and log them in.
async fn logged_in_app() -> TestApp {
    let app = TestApp::new();
    let response = app.signup(&[]).await;
    assert!(response.redirects_to("/login/?success=account_created"));
    let response = app.login("jane@x.com", "Secret1!").await;
    assert!(response.redirects_to("/"));
    app
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_signup_creates_user_and_profile() {
    let app = TestApp::new();

    let response = app.signup(&[]).await;
    assert!(response.redirects_to("/login/?success=account_created"));

    let user = app.store.find_user("jane@x.com").unwrap();
    assert_eq!(user.first_name, "Jane");
    assert_eq!(user.last_name, "Doe");
    assert!(user.is_active);

    let profile = app.store.find_profile(user.id).unwrap();
    assert_eq!(profile.full_name, "Jane Doe");
    assert_eq!(profile.mobile, "+91 5551234");

    let page = app.get("/login/?success=account_created").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Account created successfully. Please log in."));
}

#[tokio::test]
async fn test_signup_password_mismatch_creates_nothing() {
    let app = TestApp::new();

    let response = app.signup(&[("confirm_password", "Other1!x")]).await;

    assert!(response.redirects_to("/signup/?error=password_mismatch"));
    assert_eq!(app.store.user_count(), 0);
    assert_eq!(app.store.profile_count(), 0);
}

#[tokio::test]
async fn test_signup_missing_field_is_rejected() {
    let app = TestApp::new();

    let response = app.signup(&[("mobile", "   ")]).await;

    assert!(response.redirects_to("/signup/?error=missing_fields"));
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn test_signup_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.signup(&[]).await;

    let response = app.signup(&[("full_name", "Someone Else")]).await;

    assert!(response.redirects_to("/signup/?error=email_taken"));
    assert_eq!(app.store.user_count(), 1);

    let page = app.get("/signup/?error=email_taken").await;
    assert!(page.body.contains("Email already registered"));
}

#[tokio::test]
async fn test_signup_failure_leaves_no_partial_account() {
    let app = TestApp::new();
    let long_mobile = "1".repeat(25);

    let response = app.signup(&[("mobile", long_mobile.as_str())]).await;

    assert!(response.redirects_to("/signup/?error=signup_failed"));
    assert_eq!(app.store.user_count(), 0);
    assert_eq!(app.store.profile_count(), 0);
}

#[tokio::test]
async fn test_signup_page_ignores_unknown_error_codes() {
    let app = TestApp::new();

    let page = app.get("/signup/?error=%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(!page.body.contains("<script>alert(1)"));
    assert!(!page.body.contains("role=\"alert\""));
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = logged_in_app().await;

    assert!(app.session_cookie().is_some());

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Jane"));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.signup(&[]).await;

    let wrong_password = app.login("jane@x.com", "Wrong1!pw").await;
    let unknown_email = app.login("nobody@x.com", "Wrong1!pw").await;

    for response in [&wrong_password, &unknown_email] {
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Invalid email or password"));
    }
    assert!(app.session_cookie().is_none());
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let app = TestApp::new();
    app.signup(&[]).await;
    let user = app.store.find_user("jane@x.com").unwrap();
    app.store.deactivate(user.id);

    let response = app.login("jane@x.com", "Secret1!").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = logged_in_app().await;

    let response = app.post_form("/logout/", &[]).await;
    assert!(response.redirects_to("/"));

    let profile = app.get("/profile/").await;
    assert!(profile.redirects_to("/login/"));
}

#[tokio::test]
async fn test_logout_requires_login() {
    let app = TestApp::new();

    let response = app.post_form("/logout/", &[]).await;

    assert!(response.redirects_to("/login/"));
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_requires_login() {
    let app = TestApp::new();

    assert!(app.get("/profile/").await.redirects_to("/login/"));
    assert!(
        app.post_form("/profile/update/", &[("city", "Pune")])
            .await
            .redirects_to("/login/")
    );
    assert!(
        app.post_form("/profile/change-password/", &[])
            .await
            .redirects_to("/login/")
    );
}

#[tokio::test]
async fn test_profile_page_is_idempotent() {
    let app = logged_in_app().await;

    let first = app.get("/profile/").await;
    let second = app.get("/profile/").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert!(first.body.contains("jane@x.com"));
    assert!(first.body.contains("Jane Doe"));
    assert_eq!(app.store.profile_count(), 1);
}

#[tokio::test]
async fn test_profile_update_changes_profile_and_name() {
    let app = logged_in_app().await;

    let response = app
        .post_form(
            "/profile/update/",
            &[
                ("full_name", "Janet Q Public"),
                ("mobile", "+1 5550000"),
                ("city", "Pune"),
                ("postal_code", "411001"),
            ],
        )
        .await;
    assert!(response.redirects_to("/profile/?success=profile_updated"));

    let user = app.store.find_user("jane@x.com").unwrap();
    assert_eq!(user.first_name, "Janet");
    assert_eq!(user.last_name, "Q Public");

    let profile = app.store.find_profile(user.id).unwrap();
    assert_eq!(profile.full_name, "Janet Q Public");
    assert_eq!(profile.city, "Pune");
    assert_eq!(profile.gender, "");

    let page = app.get("/profile/?success=profile_updated").await;
    assert!(page.body.contains("Profile updated successfully"));
    assert!(page.body.contains("Janet"));
}

#[tokio::test]
async fn test_profile_update_rejected_keeps_old_values() {
    let app = logged_in_app().await;
    let long_postal_code = "9".repeat(11);

    let response = app
        .post_form(
            "/profile/update/",
            &[
                ("full_name", "Changed Name"),
                ("postal_code", long_postal_code.as_str()),
            ],
        )
        .await;
    assert!(response.redirects_to("/profile/?error=update_failed"));

    let user = app.store.find_user("jane@x.com").unwrap();
    assert_eq!(user.first_name, "Jane");
    let profile = app.store.find_profile(user.id).unwrap();
    assert_eq!(profile.full_name, "Jane Doe");
}

// =============================================================================
// Password Change
// =============================================================================

#[tokio::test]
async fn test_password_change_rejections() {
    let app = logged_in_app().await;

    let cases = [
        ("Wrong1!pw", "NewPass1!", "NewPass1!", "incorrect_old_password"),
        ("Secret1!", "NewPass1!", "NewPass2!", "password_mismatch"),
        ("Secret1!", "Ab1!", "Ab1!", "password_too_short"),
        ("Secret1!", "newpass1!", "newpass1!", "password_missing_uppercase"),
        ("Secret1!", "NEWPASS1!", "NEWPASS1!", "password_missing_lowercase"),
        ("Secret1!", "NewPass!!", "NewPass!!", "password_missing_digit"),
        ("Secret1!", "NewPass11", "NewPass11", "password_missing_special"),
        ("Secret1!", "Secret1!", "Secret1!", "password_unchanged"),
    ];

    for (old, new1, new2, code) in cases {
        let response = app
            .post_form(
                "/profile/change-password/",
                &[
                    ("old_password", old),
                    ("new_password1", new1),
                    ("new_password2", new2),
                ],
            )
            .await;
        assert!(
            response.redirects_to(&format!("/profile/?error={code}")),
            "expected {code}, got {:?}",
            response.location
        );
    }

    // Still logged in with the original password.
    assert_eq!(app.get("/profile/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_keeps_current_session_only() {
    let app = logged_in_app().await;
    let other_browser = app.new_browser();
    assert!(
        other_browser
            .login("jane@x.com", "Secret1!")
            .await
            .redirects_to("/")
    );

    let response = app
        .post_form(
            "/profile/change-password/",
            &[
                ("old_password", "Secret1!"),
                ("new_password1", "NewPass1!"),
                ("new_password2", "NewPass1!"),
            ],
        )
        .await;
    assert!(response.redirects_to("/profile/?success=password_changed"));

    let page = app.get("/profile/?success=password_changed").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your password was successfully updated"));

    assert!(other_browser.get("/profile/").await.redirects_to("/login/"));

    let fresh = app.new_browser();
    assert_eq!(
        fresh.login("jane@x.com", "Secret1!").await.status,
        StatusCode::OK
    );
    assert!(
        fresh
            .login("jane@x.com", "NewPass1!")
            .await
            .redirects_to("/")
    );
}

#[tokio::test]
async fn test_password_change_logs_other_browsers_out_of_public_pages() {
    let app = logged_in_app().await;
    let other_browser = app.new_browser();
    other_browser.login("jane@x.com", "Secret1!").await;
    assert!(other_browser.get("/").await.body.contains("action=\"/logout/\""));

    app.post_form(
        "/profile/change-password/",
        &[
            ("old_password", "Secret1!"),
            ("new_password1", "NewPass1!"),
            ("new_password2", "NewPass1!"),
        ],
    )
    .await;

    for path in ["/", "/login/", "/signup/"] {
        let page = other_browser.get(path).await;
        assert_eq!(page.status, StatusCode::OK, "{path}");
        assert!(!page.body.contains("Jane Doe"), "{path} still shows the user");
        assert!(!page.body.contains("action=\"/logout/\""), "{path}");
    }
    assert!(other_browser.session_cookie().is_none());

    let home = app.get("/").await;
    assert!(home.body.contains("Jane Doe"));
}
