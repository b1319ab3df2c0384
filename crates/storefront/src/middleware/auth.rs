//! Authentication extractors.
//!
//! The session stores the API bearer token plus a cached user record. These
//! extractors check the token's embedded expiration locally before letting a
//! handler run; the backing API remains the authority and may still reject
//! the token, which surfaces as a redirect to login.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::services::jwt;

/// An authenticated visitor: the bearer token plus the cached user record.
#[derive(Debug, Clone)]
pub struct Authed {
    pub token: String,
    pub user: CurrentUser,
}

/// Extractor that requires a logged-in user.
///
/// Redirects to the login page when there is no session user or the token
/// has expired.
pub struct RequireAuth(pub Authed);

/// Extractor that requires a logged-in admin user.
///
/// Non-admin users get a 403; anonymous visitors are redirected to login.
pub struct RequireAdmin(pub Authed);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Authenticated but not allowed.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Read the authenticated visitor out of the session, if any.
async fn authed_from_session(session: &Session) -> Option<Authed> {
    let token: String = session.get(session_keys::TOKEN).await.ok().flatten()?;
    if jwt::is_expired(&token) {
        return None;
    }
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    Some(Authed { token, user })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::RedirectToLogin)?;

        authed_from_session(session)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(authed) = RequireAuth::from_request_parts(parts, state).await?;
        if !authed.user.is_admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(authed))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// logged in.
pub struct OptionalAuth(pub Option<Authed>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authed = match parts.extensions.get::<Session>() {
            Some(session) => authed_from_session(session).await,
            None => None,
        };
        Ok(Self(authed))
    }
}

/// Store the token and user record in the session after login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    token: &str,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::TOKEN, token).await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the token and user record from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::TOKEN).await?;
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
