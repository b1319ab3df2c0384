//! Authentication route handlers.
//!
//! The storefront never verifies credentials itself; it forwards them to
//! the backing API, stores the returned bearer token and user record in the
//! session, and checks the token's embedded expiration locally thereafter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, auth};
use crate::models::{CurrentUser, LoginDraft, session, session_keys};
use crate::state::AppState;

use super::Shell;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Forgot-password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

/// Reset-password form data.
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub password: String,
    pub password_confirm: String,
}

/// Validate a new password pair; returns the message to show on failure.
fn new_password_error(password: &str, confirm: &str) -> Option<&'static str> {
    if password.len() < 6 {
        return Some("The password must be at least 6 characters long.");
    }
    if password != confirm {
        return Some("The passwords do not match.");
    }
    None
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    /// Email prefilled from a recent failed attempt.
    pub email: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub shell: Shell,
}

/// Forgot-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot.html")]
pub struct ForgotTemplate {
    pub shell: Shell,
}

/// Reset-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset.html")]
pub struct ResetTemplate {
    pub shell: Shell,
    pub token: String,
}

/// Display the login page.
#[instrument(skip(session_handle, authed))]
pub async fn login_page(
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> impl IntoResponse {
    if authed.is_some() {
        return Redirect::to("/").into_response();
    }
    let email = session::take_login_draft(&session_handle)
        .await
        .map(|d| d.email)
        .unwrap_or_default();
    LoginTemplate {
        shell: Shell::load(&session_handle, None).await,
        email,
    }
    .into_response()
}

/// Handle a login attempt.
#[instrument(skip(state, session_handle, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session_handle: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, crate::error::AppError> {
    let email = form.email.trim().to_lowercase();

    match state.api().login(&email, &form.password).await {
        Ok(response) => {
            let user = CurrentUser::from(response.user);
            set_sentry_user(&user.id, Some(&user.email));
            auth::set_current_user(&session_handle, &response.token, &user).await?;
            session::set_flash(
                &session_handle,
                session::Flash::success(format!("Welcome back, {}!", user.name)),
            )
            .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Login failed");
            // Keep the typed email around briefly for the retry
            session_handle
                .insert(session_keys::LOGIN_DRAFT, LoginDraft::new(email))
                .await?;
            session::set_flash(
                &session_handle,
                session::Flash::error("Invalid email or password."),
            )
            .await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
    }
}

/// Display the registration page.
#[instrument(skip(session_handle, authed))]
pub async fn register_page(
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> impl IntoResponse {
    if authed.is_some() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate {
        shell: Shell::load(&session_handle, None).await,
    }
    .into_response()
}

/// Handle a registration attempt.
#[instrument(skip(state, session_handle, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session_handle: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, crate::error::AppError> {
    let email = form.email.trim().to_lowercase();
    let name = form.name.trim();

    if name.is_empty() {
        session::set_flash(
            &session_handle,
            session::Flash::error("Please tell us your name."),
        )
        .await?;
        return Ok(Redirect::to("/auth/register").into_response());
    }

    match state.api().register(name, &email, &form.password).await {
        Ok(response) => {
            let user = CurrentUser::from(response.user);
            set_sentry_user(&user.id, Some(&user.email));
            auth::set_current_user(&session_handle, &response.token, &user).await?;
            session::set_flash(
                &session_handle,
                session::Flash::success(format!("Welcome, {}!", user.name)),
            )
            .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration failed");
            let message = match &e {
                crate::api::ApiError::Api { message, .. } if !message.is_empty() => {
                    message.clone()
                }
                _ => "Could not create your account. Please try again.".to_string(),
            };
            session::set_flash(&session_handle, session::Flash::error(message)).await?;
            Ok(Redirect::to("/auth/register").into_response())
        }
    }
}

/// Display the forgot-password page.
#[instrument(skip(session_handle))]
pub async fn forgot_page(session_handle: Session) -> impl IntoResponse {
    ForgotTemplate {
        shell: Shell::load(&session_handle, None).await,
    }
}

/// Request a password reset email.
#[instrument(skip(state, session_handle, form), fields(email = %form.email))]
pub async fn forgot(
    State(state): State<AppState>,
    session_handle: Session,
    Form(form): Form<ForgotForm>,
) -> Result<Response, crate::error::AppError> {
    let email = form.email.trim().to_lowercase();

    // Always report success; whether the account exists is not the
    // visitor's business
    if let Err(e) = state.api().forgot_password(&email).await {
        tracing::warn!(error = %e, "Forgot-password request failed");
    }
    session::set_flash(
        &session_handle,
        session::Flash::success("If that email exists, a reset link is on its way."),
    )
    .await?;
    Ok(Redirect::to("/auth/login").into_response())
}

/// Display the reset-password page.
#[instrument(skip(session_handle))]
pub async fn reset_page(
    session_handle: Session,
    Path(token): Path<String>,
) -> impl IntoResponse {
    ResetTemplate {
        shell: Shell::load(&session_handle, None).await,
        token,
    }
}

/// Complete a password reset.
#[instrument(skip(state, session_handle, token, form))]
pub async fn reset(
    State(state): State<AppState>,
    session_handle: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetForm>,
) -> Result<Response, crate::error::AppError> {
    if let Some(message) = new_password_error(&form.password, &form.password_confirm) {
        session::set_flash(&session_handle, session::Flash::error(message)).await?;
        return Ok(Redirect::to(&format!("/auth/reset-password/{token}")).into_response());
    }

    match state.api().reset_password(&token, &form.password).await {
        Ok(_) => {
            session::set_flash(
                &session_handle,
                session::Flash::success("Password updated. Log in with your new password."),
            )
            .await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Password reset failed");
            session::set_flash(
                &session_handle,
                session::Flash::error("That reset link is invalid or has expired."),
            )
            .await?;
            Ok(Redirect::to("/auth/forgot-password").into_response())
        }
    }
}

/// Log out.
#[instrument(skip(session_handle))]
pub async fn logout(session_handle: Session) -> Result<Response, crate::error::AppError> {
    auth::clear_current_user(&session_handle).await?;
    clear_sentry_user();
    session::set_flash(&session_handle, session::Flash::success("See you soon!")).await?;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_password_error() {
        assert_eq!(new_password_error("secret1", "secret1"), None);

        assert_eq!(
            new_password_error("short", "short"),
            Some("The password must be at least 6 characters long.")
        );
        assert_eq!(
            new_password_error("secret1", "secret2"),
            Some("The passwords do not match.")
        );
        assert_eq!(
            new_password_error("secret1", ""),
            Some("The passwords do not match.")
        );
    }
}
