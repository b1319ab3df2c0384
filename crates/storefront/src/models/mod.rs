//! Data models for the storefront.

pub mod session;

pub use session::{CurrentUser, Flash, FlashKind, LoginDraft, keys as session_keys};
