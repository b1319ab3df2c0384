//! Admin route handlers.
//!
//! Admin screens live under `/admin` in the same binary; every handler
//! takes the `RequireAdmin` extractor, so non-admin users get a 403 and
//! anonymous visitors a login redirect. The backing API enforces the role
//! again on every write.

pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/new", get(products::new))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/products/save", post(products::save))
        // Variant matrix draft editing (HTMX fragments)
        .route("/products/draft/options", post(products::draft_options))
        .route("/products/draft/toggle", post(products::draft_toggle))
        .route("/products/draft/stock", post(products::draft_stock))
        .route("/products/draft/sku", post(products::draft_sku))
        .route("/products/draft/generate", post(products::draft_generate))
        .route("/products/draft/clear", post(products::draft_clear))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
}
