//! Client for the backing REST API.
//!
//! All persistence lives behind this API; the storefront is a stateless
//! renderer in front of it. Catalog reads are cached with `moka`
//! (5-minute TTL) and the cache is flushed on every admin write. Auth'd
//! calls take the visitor's bearer token per call; the client itself holds
//! no credentials.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use amaranta_core::{Category, OrderId, OrderStatus, Product, ProductId};

use types::{
    ApiUser, AuthResponse, ContactRequest, CreateOrderRequest, FavoriteToggle, MessageResponse,
    OrderRecord, ReviewRequest,
};

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors from the backing API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Client for the backing REST API.
///
/// Cheaply cloneable; shares the HTTP connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client for the given base URL (no trailing slash).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    // =========================================================================
    // Catalog (public reads, cached)
    // =========================================================================

    /// All active products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_products("products", "/products").await
    }

    /// Products in a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category: Category,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_products(
            &format!("products:category:{category}"),
            &format!("/products/category/{category}"),
        )
        .await
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_products("products:featured", "/products/featured")
            .await
    }

    /// Products currently on promotion.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn promotions(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_products("products:promotions", "/products/promotions")
            .await
    }

    /// Free-text product search. Not cached; queries vary too much.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let path = format!("/products/search?q={}", urlencoding::encode(query));
        self.request(Method::GET, &path, None, None::<&()>).await
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Arc<Product>, ApiError> {
        let key = format!("product:{id}");
        if let Some(CacheValue::Product(p)) = self.inner.cache.get(&key).await {
            return Ok(p);
        }
        let product: Product = self
            .request(Method::GET, &format!("/products/{id}"), None, None::<&()>)
            .await?;
        let product = Arc::new(product);
        self.inner
            .cache
            .insert(key, CacheValue::Product(Arc::clone(&product)))
            .await;
        Ok(product)
    }

    async fn cached_products(
        &self,
        key: &str,
        path: &str,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(list)) = self.inner.cache.get(key).await {
            return Ok(list);
        }
        let list: Vec<Product> = self.request(Method::GET, path, None, None::<&()>).await?;
        let list = Arc::new(list);
        self.inner
            .cache
            .insert(key.to_string(), CacheValue::Products(Arc::clone(&list)))
            .await;
        Ok(list)
    }

    // =========================================================================
    // Catalog (admin writes, invalidate cache)
    // =========================================================================

    /// All products including inactive ones, for the admin list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without an admin token.
    #[instrument(skip(self, token))]
    pub async fn products_admin(&self, token: &str) -> Result<Vec<Product>, ApiError> {
        self.request(Method::GET, "/products/all", Some(token), None::<&()>)
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is unauthorized.
    #[instrument(skip(self, token, product))]
    pub async fn create_product(
        &self,
        token: &str,
        product: &Product,
    ) -> Result<Product, ApiError> {
        let created = self
            .request(Method::POST, "/products", Some(token), Some(product))
            .await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is unauthorized.
    #[instrument(skip(self, token, product))]
    pub async fn update_product(
        &self,
        token: &str,
        id: &ProductId,
        product: &Product,
    ) -> Result<Product, ApiError> {
        let updated = self
            .request(
                Method::PUT,
                &format!("/products/{id}"),
                Some(token),
                Some(product),
            )
            .await?;
        self.invalidate_catalog();
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is unauthorized.
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &str, id: &ProductId) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .request(
                Method::DELETE,
                &format!("/products/{id}"),
                Some(token),
                None::<&()>,
            )
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Submit a review; returns the product with its updated rating.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is unauthorized.
    #[instrument(skip(self, token), fields(rating = review.rating))]
    pub async fn add_review(
        &self,
        token: &str,
        id: &ProductId,
        review: &ReviewRequest,
    ) -> Result<Product, ApiError> {
        let product = self
            .request(
                Method::POST,
                &format!("/products/{id}/reviews"),
                Some(token),
                Some(review),
            )
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.request(Method::POST, "/auth/login", None, Some(&body))
            .await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the email is taken or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.request(Method::POST, "/auth/register", None, Some(&body))
            .await
    }

    /// The authoritative current-user record for a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for expired or invalid tokens.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &str) -> Result<ApiUser, ApiError> {
        self.request(Method::GET, "/auth/me", Some(token), None::<&()>)
            .await
    }

    /// Update the user's profile; returns the fresh user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token.
    #[instrument(skip(self, token))]
    pub async fn update_profile(
        &self,
        token: &str,
        name: &str,
        email: &str,
    ) -> Result<ApiUser, ApiError> {
        let body = serde_json::json!({ "name": name, "email": email });
        self.request(Method::PUT, "/auth/profile", Some(token), Some(&body))
            .await
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = serde_json::json!({ "email": email });
        self.request(Method::POST, "/auth/forgot-password", None, Some(&body))
            .await
    }

    /// Complete a password reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the token is invalid or expired.
    #[instrument(skip(self, reset_token, password))]
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = serde_json::json!({ "password": password });
        self.request(
            Method::PUT,
            &format!("/auth/reset-password/{reset_token}"),
            None,
            Some(&body),
        )
        .await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// The user's favorited products, fully populated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token.
    #[instrument(skip(self, token))]
    pub async fn favorites(&self, token: &str) -> Result<Vec<Product>, ApiError> {
        self.request(Method::GET, "/auth/favorites", Some(token), None::<&()>)
            .await
    }

    /// Toggle a product in the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token.
    #[instrument(skip(self, token))]
    pub async fn toggle_favorite(
        &self,
        token: &str,
        id: &ProductId,
    ) -> Result<FavoriteToggle, ApiError> {
        self.request(
            Method::POST,
            &format!("/products/{id}/favorite"),
            Some(token),
            None::<&()>,
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Register an order ahead of the WhatsApp handoff.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; callers treat this as
    /// best-effort.
    #[instrument(skip(self, token, order), fields(items = order.items.len()))]
    pub async fn create_order(
        &self,
        token: &str,
        order: &CreateOrderRequest,
    ) -> Result<OrderRecord, ApiError> {
        self.request(
            Method::POST,
            "/orders/whatsapp/create",
            Some(token),
            Some(order),
        )
        .await
    }

    /// The current user's order history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<OrderRecord>, ApiError> {
        self.request(Method::GET, "/orders/my-orders", Some(token), None::<&()>)
            .await
    }

    /// All orders, for the admin screen.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without an admin token.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &str) -> Result<Vec<OrderRecord>, ApiError> {
        self.request(Method::GET, "/orders", Some(token), None::<&()>)
            .await
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without an admin token.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &str,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<OrderRecord, ApiError> {
        let body = serde_json::json!({ "status": status });
        self.request(
            Method::PUT,
            &format!("/orders/{id}/status"),
            Some(token),
            Some(&body),
        )
        .await
    }

    // =========================================================================
    // Misc
    // =========================================================================

    /// Subscribe an email to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = serde_json::json!({ "email": email });
        self.request(Method::POST, "/newsletter/subscribe", None, Some(&body))
            .await
    }

    /// Send a contact form message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn send_contact(&self, form: &ContactRequest) -> Result<MessageResponse, ApiError> {
        self.request(Method::POST, "/contact/send", None, Some(form))
            .await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&impl Serialize>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut builder = self.inner.client.request(method, &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: extract_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e.to_string())
        })
    }
}

/// Pull the server-supplied `{"message": ...}` out of an error body, falling
/// back to the raw body (truncated).
fn extract_message(body: &str) -> String {
    serde_json::from_str::<MessageResponse>(body)
        .ok()
        .filter(|m| !m.message.is_empty())
        .map_or_else(
            || body.chars().take(200).collect::<String>(),
            |m| m.message,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_from_json_body() {
        assert_eq!(
            extract_message(r#"{"message": "Product not available"}"#),
            "Product not available"
        );
    }

    #[test]
    fn test_extract_message_falls_back_to_body() {
        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
        let long = "x".repeat(500);
        assert_eq!(extract_message(&long).len(), 200);
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.inner.base_url, "http://localhost:5000/api");
    }
}
