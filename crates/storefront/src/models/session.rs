//! Session-stored types.
//!
//! The session plays the role a browser-local store would in a client-side
//! rendition: bearer token, cached user record, cart lines, short-lived form
//! drafts, and one-shot flash notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use amaranta_core::{ProductId, UserId};

use crate::api::types::ApiUser;

/// How long a login email draft survives before being discarded.
const LOGIN_DRAFT_TTL_SECONDS: i64 = 2 * 60;

/// Session keys.
pub mod keys {
    /// Key for the API bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the cached current-user record.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the login email draft.
    pub const LOGIN_DRAFT: &str = "login_draft";

    /// Key for the one-shot flash notification.
    pub const FLASH: &str = "flash";
}

/// Session-cached user identity.
///
/// A convenience copy of the API user record; `/auth/me` stays the
/// authority and is re-fetched on account-sensitive pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    /// Product ids the user has favorited, for rendering heart states.
    pub favorites: Vec<ProductId>,
}

impl CurrentUser {
    #[must_use]
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.favorites.contains(product_id)
    }
}

impl From<ApiUser> for CurrentUser {
    fn from(user: ApiUser) -> Self {
        let is_admin = user.is_admin();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin,
            favorites: user.favorites,
        }
    }
}

/// Login form email draft, kept briefly so a failed attempt or an
/// interrupted login does not lose the typed email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginDraft {
    pub email: String,
    pub saved_at: DateTime<Utc>,
}

impl LoginDraft {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            saved_at: Utc::now(),
        }
    }

    /// Whether the draft is still within its 2-minute TTL.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        (Utc::now() - self.saved_at).num_seconds() < LOGIN_DRAFT_TTL_SECONDS
    }
}

/// One-shot notification rendered on the next page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Visual style of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier class for the notification.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash-success",
            FlashKind::Error => "flash-error",
        }
    }
}

/// Queue a flash notification for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, flash).await
}

/// Take the pending flash notification, if any, clearing it.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}

/// Fetch a fresh login draft, discarding a stale one.
pub async fn take_login_draft(session: &Session) -> Option<LoginDraft> {
    let draft = session
        .remove::<LoginDraft>(keys::LOGIN_DRAFT)
        .await
        .ok()
        .flatten()?;
    draft.is_fresh().then_some(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_draft_freshness() {
        let draft = LoginDraft::new("ana@example.com");
        assert!(draft.is_fresh());

        let stale = LoginDraft {
            email: "ana@example.com".to_string(),
            saved_at: Utc::now() - chrono::Duration::seconds(LOGIN_DRAFT_TTL_SECONDS + 1),
        };
        assert!(!stale.is_fresh());
    }

    #[test]
    fn test_current_user_from_api_user() {
        let api_user: ApiUser = serde_json::from_str(
            r#"{"_id": "u-1", "name": "Ana", "email": "ana@example.com", "role": "admin",
                "favorites": ["p-1"]}"#,
        )
        .unwrap();
        let user = CurrentUser::from(api_user);
        assert!(user.is_admin);
        assert!(user.is_favorite(&ProductId::new("p-1")));
    }

    #[test]
    fn test_flash_css_class() {
        assert_eq!(Flash::success("ok").css_class(), "flash-success");
        assert_eq!(Flash::error("no").css_class(), "flash-error");
    }
}
