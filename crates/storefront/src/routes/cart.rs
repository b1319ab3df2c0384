//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; checkout registers the order with
//! the backing API (best-effort) and hands the customer to WhatsApp.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use amaranta_core::{Cart, CartItem, CartKey, OrderItem, ProductId, order_message};

use crate::api::types::CreateOrderRequest;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{session, session_keys};
use crate::services::whatsapp;
use crate::state::AppState;

use super::Shell;

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, empty when absent.
pub async fn load_cart(session_handle: &Session) -> Cart {
    session_handle
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session_handle: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session_handle.insert(session_keys::CART, cart).await
}

// =============================================================================
// Views & Forms
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub size: String,
    pub color: String,
    pub selection: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            size: item.size.clone().unwrap_or_default(),
            color: item.color.clone().unwrap_or_default(),
            selection: item.selection_label(),
            quantity: item.quantity,
            price: item.price.to_string(),
            subtotal: item.subtotal().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            total: cart.total().to_string(),
            count: cart.count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<u32>,
}

/// Line identity form data, used by update and remove.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<u32>,
}

impl LineForm {
    fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id.clone(),
            size: self.size.clone().filter(|s| !s.is_empty()),
            color: self.color.clone().filter(|c| !c.is_empty()),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub shell: Shell,
    pub cart: CartView,
}

/// Cart lines fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(session_handle, authed))]
pub async fn show(
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> impl IntoResponse {
    let cart = load_cart(&session_handle).await;
    let view = CartView::from(&cart);
    CartShowTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
        cart: view,
    }
}

/// Add an item to the cart (HTMX).
///
/// Snapshots name, price and image from the catalog at add time, merges
/// with an existing line for the same selection, and caps the requested
/// quantity at the available stock for that selection.
#[instrument(skip(state, session_handle))]
pub async fn add(
    State(state): State<AppState>,
    session_handle: Session,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let product = state.api().product(&form.product_id).await?;

    let size = form.size.filter(|s| !s.is_empty());
    let color = form.color.filter(|c| !c.is_empty());
    let available = product.stock_for(size.as_deref(), color.as_deref());
    let quantity = form.quantity.unwrap_or(1).min(available);

    let mut cart = load_cart(&session_handle).await;
    cart.add(CartItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        price: product.price,
        image: product.image.clone(),
        size,
        color,
        quantity,
    });
    save_cart(&session_handle, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count: cart.count() },
    )
        .into_response())
}

/// Set a line's quantity (HTMX). Zero removes the line.
#[instrument(skip(session_handle))]
pub async fn update(
    session_handle: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session_handle).await;
    cart.set_quantity(&form.key(), form.quantity.unwrap_or(0));
    save_cart(&session_handle, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove a line (HTMX).
#[instrument(skip(session_handle))]
pub async fn remove(
    session_handle: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session_handle).await;
    cart.remove(&form.key());
    save_cart(&session_handle, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Empty the cart (HTMX).
#[instrument(skip(session_handle))]
pub async fn clear(session_handle: Session) -> Result<Response> {
    let mut cart = load_cart(&session_handle).await;
    cart.clear();
    save_cart(&session_handle, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Cart count badge (HTMX).
#[instrument(skip(session_handle))]
pub async fn count(session_handle: Session) -> impl IntoResponse {
    let cart = load_cart(&session_handle).await;
    CartCountTemplate { count: cart.count() }
}

/// Checkout: register the order with the API, then redirect to WhatsApp.
///
/// Registration is best-effort. Logged-in visitors get the order recorded
/// and its reference embedded in the message; anonymous visitors, or a
/// failed registration, hand off with the reference shown as "none".
#[instrument(skip(state, session_handle, authed))]
pub async fn checkout(
    State(state): State<AppState>,
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> Result<Response> {
    let mut cart = load_cart(&session_handle).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let items: Vec<OrderItem> = cart
        .items()
        .iter()
        .cloned()
        .map(OrderItem::from)
        .collect();
    let total = cart.total();

    let reference = match authed {
        Some(authed) => {
            let request = CreateOrderRequest {
                items: items.clone(),
                total,
            };
            match state.api().create_order(&authed.token, &request).await {
                Ok(order) => order.order_number,
                Err(e) => {
                    tracing::warn!(error = %e, "Order registration failed, continuing handoff");
                    None
                }
            }
        }
        None => None,
    };

    let message = order_message(reference.as_deref(), &items, total);
    let link = whatsapp::wa_link(&state.config().whatsapp_phone, &message);

    cart.clear();
    save_cart(&session_handle, &cart).await?;
    session::set_flash(
        &session_handle,
        session::Flash::success("Your order was sent to WhatsApp. We will confirm it shortly."),
    )
    .await?;

    Ok(Redirect::to(&link).into_response())
}
