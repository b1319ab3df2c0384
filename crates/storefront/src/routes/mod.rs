//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (featured + promotions)
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /products                - Product listing (?q= searches)
//! GET  /products/{id}           - Product detail (?size=&color= selection)
//! POST /products/{id}/review    - Submit a review (requires auth)
//! GET  /products/{id}/whatsapp  - Buy-via-WhatsApp redirect
//! GET  /category/{category}     - Category listing
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add line (returns cart_count fragment)
//! POST /cart/update             - Set line quantity (returns cart_items fragment)
//! POST /cart/remove             - Remove line (returns cart_items fragment)
//! POST /cart/clear              - Empty the cart
//! GET  /cart/count              - Cart count badge (fragment)
//! POST /cart/checkout           - Register order, redirect to WhatsApp
//!
//! # Favorites (requires auth)
//! GET  /favorites               - Favorites page
//! POST /favorites/{id}/toggle   - Toggle favorite (returns button fragment)
//!
//! # Auth
//! GET/POST /auth/login          - Login
//! GET/POST /auth/register       - Register
//! GET/POST /auth/forgot-password - Request reset email
//! GET/POST /auth/reset-password/{token} - Complete reset
//! POST /auth/logout             - Logout
//!
//! # Account (requires auth)
//! GET  /account/orders          - Order history
//! GET/POST /account/profile     - Profile editing
//!
//! # Misc
//! GET/POST /contact             - Contact form
//! POST /newsletter/subscribe    - Newsletter signup (fragment)
//!
//! # Admin (requires admin role)
//! GET  /admin/products          - Product list with filters
//! GET  /admin/products/new      - Blank product editor
//! GET  /admin/products/{id}/edit - Product editor
//! POST /admin/products/draft/*  - Variant matrix editing (fragments)
//! POST /admin/products/save     - Persist the edited product
//! POST /admin/products/{id}/delete - Delete a product
//! GET  /admin/orders            - Orders list (?status= filters)
//! POST /admin/orders/{id}/status - Update order status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod favorites;
pub mod home;
pub mod newsletter;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::Authed;
use crate::models::{CurrentUser, Flash, session};
use crate::state::AppState;

/// Page chrome shared by every full-page template: the logged-in user,
/// the cart badge count, and a pending flash notification.
pub struct Shell {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub flash: Option<Flash>,
}

impl Shell {
    /// Assemble the chrome for a page render. Consumes the pending flash.
    pub async fn load(session_handle: &Session, authed: Option<&Authed>) -> Self {
        let cart = cart::load_cart(session_handle).await;
        Self {
            user: authed.map(|a| a.user.clone()),
            cart_count: cart.count(),
            flash: session::take_flash(session_handle).await,
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/review", post(products::review))
        .route("/{id}/whatsapp", get(products::buy_via_whatsapp))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route(
            "/forgot-password",
            get(auth::forgot_page).post(auth::forgot),
        )
        .route(
            "/reset-password/{token}",
            get(auth::reset_page).post(auth::reset),
        )
        .route("/logout", post(auth::logout))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/{id}/toggle", post(favorites::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/category/{category}", get(products::category))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/favorites", favorites_routes())
        .nest("/auth", auth_routes())
        .route("/account/orders", get(account::orders))
        .route(
            "/account/profile",
            get(account::profile_page).post(account::profile_update),
        )
        .route("/contact", get(contact::page).post(contact::submit))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .nest("/admin", admin::routes())
}
