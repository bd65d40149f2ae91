//! Authentication route handlers.
//!
//! Login, registration with OTP email verification, and the three-step
//! password recovery flow. The backend performs the actual credential
//! checks and OTP issuance; these handlers orchestrate the calls and hold
//! the issued bearer token in the session.

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

use crate::api::ApiError;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{LOGIN_ROUTE, RequireGuest, clear_token, set_token};
use crate::models::Claims;
use crate::routes::{MessageQuery, NavContext, flash_redirect};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Email verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub email: String,
    pub otp: String,
}

/// Recovery step 1: request an OTP.
#[derive(Debug, Deserialize)]
pub struct SendOtpForm {
    pub email: String,
}

/// Recovery step 2: check the OTP.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub email: String,
    pub otp: String,
}

/// Recovery step 3: set the new password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the verification page.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub email: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters for the recovery page.
#[derive(Debug, Deserialize)]
pub struct RecoveryQuery {
    pub step: Option<u8>,
    pub email: Option<String>,
    pub otp: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavContext,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavContext,
    pub error: Option<String>,
}

/// Email verification page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub nav: NavContext,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Password recovery page template (renders one of three steps).
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub nav: NavContext,
    pub step: u8,
    pub email: String,
    pub otp: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(
    _guest: RequireGuest,
    Query(query): Query<MessageQuery>,
) -> LoginTemplate {
    LoginTemplate {
        nav: NavContext::hidden(),
        error: query.error.map(|code| notice_text(&code)),
        success: query.success,
    }
}

/// Handle login form submission.
///
/// On success the issued bearer token becomes the session credential and
/// the user lands on their role's home page.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.api().login(&form.email, &form.password).await {
        Ok(issued) => {
            set_token(&session, &issued.token).await?;

            // Land admins on the dashboard; the claims also feed Sentry's
            // user scope. A token that fails to decode here will be purged
            // by the next guard evaluation.
            let landing = Claims::decode_unverified(&issued.token).map_or("/", |claims| {
                set_sentry_user(&claims.sub, Some(form.email.as_str()));
                claims.role.landing_route()
            });

            Ok(Redirect::to(landing).into_response())
        }
        Err(ApiError::Rejected { message, .. }) => {
            tracing::warn!("Login failed: {message}");
            Ok(flash_redirect(LOGIN_ROUTE, "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    _guest: RequireGuest,
    Query(query): Query<MessageQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        nav: NavContext::hidden(),
        error: query.error,
    }
}

/// Handle registration form submission.
///
/// The backend either issues a token immediately (user is signed in) or
/// answers with a message and expects OTP verification of the email.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if form.password != form.confirm_password {
        return Ok(
            flash_redirect("/auth/register", "error", "Passwords do not match").into_response(),
        );
    }

    match state
        .api()
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(outcome) => {
            if let Some(token) = outcome.token {
                set_token(&session, &token).await?;
                let landing =
                    Claims::decode_unverified(&token).map_or("/", |c| c.role.landing_route());
                return Ok(Redirect::to(landing).into_response());
            }

            // Token-less success: the account needs email verification
            let notice = outcome
                .message
                .unwrap_or_else(|| "Account created! Verify your email.".to_string());
            Ok(Redirect::to(&format!(
                "/auth/verify?email={}&success={}",
                urlencoding::encode(&form.email),
                urlencoding::encode(&notice),
            ))
            .into_response())
        }
        Err(ApiError::Rejected { message, .. }) => {
            tracing::warn!("Registration failed: {message}");
            Ok(flash_redirect("/auth/register", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Email verification
// =============================================================================

/// Display the OTP verification page.
///
/// Arriving without an email (no registration in flight) bounces back to
/// the registration page.
pub async fn verify_page(
    _guest: RequireGuest,
    Query(query): Query<VerifyQuery>,
) -> Response {
    match query.email {
        Some(email) => VerifyTemplate {
            nav: NavContext::hidden(),
            email,
            error: query.error,
            success: query.success,
        }
        .into_response(),
        None => flash_redirect("/auth/register", "error", "Please sign up first").into_response(),
    }
}

/// Handle OTP verification form submission.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    _guest: RequireGuest,
    Form(form): Form<VerifyForm>,
) -> Result<Response, AppError> {
    match state
        .api()
        .verify_registration(&form.email, &form.otp)
        .await
    {
        Ok(()) => Ok(flash_redirect(
            LOGIN_ROUTE,
            "success",
            "Account verified successfully! You can now log in.",
        )
        .into_response()),
        Err(ApiError::Rejected { message, .. }) => Ok(Redirect::to(&format!(
            "/auth/verify?email={}&error={}",
            urlencoding::encode(&form.email),
            urlencoding::encode(&message),
        ))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Password recovery (three steps)
// =============================================================================

/// Display the recovery page at the requested step.
pub async fn forgot_password_page(
    _guest: RequireGuest,
    Query(query): Query<RecoveryQuery>,
) -> ForgotPasswordTemplate {
    ForgotPasswordTemplate {
        nav: NavContext::hidden(),
        step: query.step.unwrap_or(1).clamp(1, 3),
        email: query.email.unwrap_or_default(),
        otp: query.otp.unwrap_or_default(),
        error: query.error,
        success: query.success,
    }
}

/// Step 1: send the OTP.
#[instrument(skip_all)]
pub async fn send_reset_otp(
    State(state): State<AppState>,
    _guest: RequireGuest,
    Form(form): Form<SendOtpForm>,
) -> Result<Response, AppError> {
    match state.api().forgot_password(&form.email).await {
        Ok(()) => Ok(recovery_redirect(
            2,
            &form.email,
            None,
            "success",
            "OTP sent to your email",
        )),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(recovery_redirect(1, &form.email, None, "error", &message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Step 2: check the OTP.
#[instrument(skip_all)]
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    _guest: RequireGuest,
    Form(form): Form<VerifyOtpForm>,
) -> Result<Response, AppError> {
    match state.api().verify_otp(&form.email, &form.otp).await {
        Ok(()) => Ok(recovery_redirect(
            3,
            &form.email,
            Some(&form.otp),
            "success",
            "OTP verified",
        )),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(recovery_redirect(2, &form.email, None, "error", &message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Step 3: set the new password with the verified OTP.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    _guest: RequireGuest,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    if form.new_password != form.confirm_password {
        return Ok(recovery_redirect(
            3,
            &form.email,
            Some(&form.otp),
            "error",
            "Passwords do not match",
        ));
    }
    if form.new_password.len() < 6 {
        return Ok(recovery_redirect(
            3,
            &form.email,
            Some(&form.otp),
            "error",
            "Password must be at least 6 characters",
        ));
    }

    match state
        .api()
        .reset_password(&form.email, &form.otp, &form.new_password)
        .await
    {
        Ok(()) => Ok(flash_redirect(
            LOGIN_ROUTE,
            "success",
            "Password reset successful. Please log in.",
        )
        .into_response()),
        Err(ApiError::Rejected { message, .. }) => Ok(recovery_redirect(
            3,
            &form.email,
            Some(&form.otp),
            "error",
            &message,
        )),
        Err(e) => Err(e.into()),
    }
}

/// Redirect back into the recovery flow preserving step state.
fn recovery_redirect(
    step: u8,
    email: &str,
    otp: Option<&str>,
    kind: &str,
    message: &str,
) -> Response {
    let mut target = format!(
        "/auth/forgot-password?step={step}&email={}",
        urlencoding::encode(email),
    );
    if let Some(otp) = otp {
        target.push_str(&format!("&otp={}", urlencoding::encode(otp)));
    }
    target.push_str(&format!("&{kind}={}", urlencoding::encode(message)));
    Redirect::to(&target).into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Pure local invalidation: the credential is discarded and the whole
/// session flushed; the backend token is never revoked, it simply becomes
/// unusable once dropped client-side.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_token(&session).await {
        tracing::error!("Failed to clear credential: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Redirect::to(LOGIN_ROUTE)
}

/// Map interceptor notice codes to user-facing text.
fn notice_text(code: &str) -> String {
    match code {
        "session_expired" => "Your session has expired. Please log in again.".to_string(),
        other => other.to_string(),
    }
}
