//! Wire types for the backing REST API.
//!
//! The API speaks camelCase JSON with Mongo-style `_id` fields; product and
//! order payloads reuse the domain types from `amaranta_core` directly.

use serde::{Deserialize, Serialize};

use amaranta_core::{OrderItem, OrderStatus, Price, ProductId, UserId};

/// An authenticated user record, as returned by `/auth/me` and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    /// Product ids the user has favorited.
    #[serde(default)]
    pub favorites: Vec<ProductId>,
}

/// Role attached to a user record. The API enforces authorization; this is
/// only used to decide which screens to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl ApiUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    #[must_use]
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.favorites.contains(product_id)
    }
}

/// Login/register response: a bearer token plus the user record.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: ApiUser,
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Response of the favorite toggle endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    #[serde(default)]
    pub is_favorite: bool,
    /// The user's full favorites list after the toggle.
    #[serde(default)]
    pub favorites: Vec<ProductId>,
}

/// Payload for registering an order before the WhatsApp handoff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub total: Price,
}

/// Minimal customer data embedded in an order record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A persisted order, as returned by the order endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: amaranta_core::OrderId,
    /// Human-facing reference shown in the WhatsApp message.
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for submitting a product review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub rating: u8,
    pub comment: String,
}

/// Payload for the contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_format() {
        let json = r#"{
            "_id": "u-1",
            "name": "Ana",
            "email": "ana@example.com",
            "role": "admin",
            "favorites": ["p-1", "p-2"]
        }"#;
        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert!(user.is_admin());
        assert!(user.is_favorite(&ProductId::new("p-2")));
        assert!(!user.is_favorite(&ProductId::new("p-3")));
    }

    #[test]
    fn test_user_role_defaults_to_user() {
        let json = r#"{"_id": "u-2", "name": "Luis", "email": "luis@example.com"}"#;
        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert!(!user.is_admin());
        assert!(user.favorites.is_empty());
    }

    #[test]
    fn test_order_record_defaults() {
        let json = r#"{"_id": "o-1", "total": 45000, "status": "paid"}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total, Price::new(45_000));
        assert!(order.order_number.is_none());
        assert!(order.items.is_empty());
    }
}
