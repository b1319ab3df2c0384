//! Catalog route handlers.
//!
//! The product detail page drives its size/color selector buttons off the
//! variant stock resolver: a button is disabled when no in-stock variant
//! matches it given the other chosen axis, and the quantity input is capped
//! at the stock of the exact selection.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use amaranta_core::{Category, Product, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, session};
use crate::services::whatsapp;
use crate::state::AppState;

use super::Shell;

/// Product card display data for listing grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub image: String,
    pub badge: Option<&'static str>,
    pub rating: f32,
    pub reviews_count: u32,
    pub in_stock: bool,
    pub is_favorite: bool,
}

impl ProductCardView {
    pub fn new(product: &Product, user: Option<&CurrentUser>) -> Self {
        let in_stock = if product.variants.is_empty() {
            product.stock > 0
        } else {
            product.variants.iter().any(|v| v.stock > 0)
        };
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            original_price: product
                .has_discount()
                .then(|| product.original_price.unwrap_or_default().to_string()),
            image: product.image.clone(),
            badge: product.badge.map(|b| b.label()),
            rating: product.rating,
            reviews_count: product.reviews_count,
            in_stock,
            is_favorite: user.is_some_and(|u| u.is_favorite(&product.id)),
        }
    }
}

/// One size or color selector button.
#[derive(Clone)]
pub struct OptionView {
    pub label: String,
    pub available: bool,
    pub selected: bool,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: Option<String>,
    pub category: Category,
    pub gallery: Vec<String>,
    pub badge: Option<&'static str>,
    pub rating: f32,
    pub reviews_count: u32,
    pub sizes: Vec<OptionView>,
    pub colors: Vec<OptionView>,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    /// Stock of the exact current selection; caps the quantity input.
    pub stock: u32,
    pub sku: Option<String>,
    pub materials: String,
    pub care: String,
    pub features: Vec<String>,
    pub fit: String,
    pub is_favorite: bool,
}

impl ProductDetailView {
    fn new(
        product: &Product,
        size: Option<&str>,
        color: Option<&str>,
        user: Option<&CurrentUser>,
    ) -> Self {
        let sizes = product
            .sizes
            .iter()
            .map(|s| OptionView {
                label: s.clone(),
                available: product.size_in_stock(s, color),
                selected: size == Some(s.as_str()),
            })
            .collect();
        let colors = product
            .colors
            .iter()
            .map(|c| OptionView {
                label: c.clone(),
                available: product.color_in_stock(c, size),
                selected: color == Some(c.as_str()),
            })
            .collect();
        let sku = match (size, color) {
            (Some(s), Some(c)) => product.variant_sku(s, c).map(str::to_owned),
            _ => product.sku.clone(),
        };
        let details = product.details.clone().unwrap_or_default();

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            original_price: product
                .has_discount()
                .then(|| product.original_price.unwrap_or_default().to_string()),
            category: product.category,
            gallery: product.gallery().iter().map(|s| (*s).to_owned()).collect(),
            badge: product.badge.map(|b| b.label()),
            rating: product.rating,
            reviews_count: product.reviews_count,
            sizes,
            colors,
            selected_size: size.map(str::to_owned),
            selected_color: color.map(str::to_owned),
            stock: product.stock_for(size, color),
            sku,
            materials: details.materials,
            care: details.care,
            features: details.features,
            fit: details.fit,
            is_favorite: user.is_some_and(|u| u.is_favorite(&product.id)),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
}

/// Detail page query parameters: the current variant selection.
#[derive(Debug, Deserialize)]
pub struct SelectionQuery {
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Review submission form.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    pub comment: String,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub shell: Shell,
    pub heading: String,
    pub products: Vec<ProductCardView>,
    pub query: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub shell: Shell,
    pub product: ProductDetailView,
}

/// Display the product listing, or search results when `?q=` is present.
#[instrument(skip(state, session_handle, authed))]
pub async fn index(
    State(state): State<AppState>,
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let (heading, products) = match q {
        Some(q) => (
            format!("Results for \"{q}\""),
            state.api().search_products(q).await?,
        ),
        None => (
            "All products".to_string(),
            state.api().products().await?.as_ref().clone(),
        ),
    };

    let user = authed.as_ref().map(|a| &a.user);
    let cards = products
        .iter()
        .map(|p| ProductCardView::new(p, user))
        .collect();

    Ok(ProductsIndexTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
        heading,
        products: cards,
        query: q.map(str::to_owned),
    })
}

/// Display a category listing.
#[instrument(skip(state, session_handle, authed))]
pub async fn category(
    State(state): State<AppState>,
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
    Path(category): Path<String>,
) -> Result<impl IntoResponse> {
    let category: Category = category
        .parse()
        .map_err(|_| AppError::NotFound(format!("category {category}")))?;
    let products = state.api().products_by_category(category).await?;

    let user = authed.as_ref().map(|a| &a.user);
    let cards = products
        .iter()
        .map(|p| ProductCardView::new(p, user))
        .collect();

    Ok(ProductsIndexTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
        heading: category.label().to_string(),
        products: cards,
        query: None,
    })
}

/// Display the product detail page.
#[instrument(skip(state, session_handle, authed))]
pub async fn show(
    State(state): State<AppState>,
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(selection): Query<SelectionQuery>,
) -> Result<impl IntoResponse> {
    let product = state.api().product(&id).await?;

    // Fall back to the first declared label on each axis
    let (default_size, default_color) = product.default_selection();
    let size = selection.size.as_deref().or(default_size);
    let color = selection.color.as_deref().or(default_color);

    let user = authed.as_ref().map(|a| &a.user);
    let view = ProductDetailView::new(&product, size, color, user);

    Ok(ProductShowTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
        product: view,
    })
}

/// Submit a product review.
#[instrument(skip(state, session_handle, authed, form))]
pub async fn review(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAuth(authed): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Result<impl IntoResponse> {
    if !(1..=5).contains(&form.rating) {
        return Err(AppError::BadRequest("rating must be 1-5".to_string()));
    }

    let review = crate::api::types::ReviewRequest {
        rating: form.rating,
        comment: form.comment.trim().to_string(),
    };
    let flash = match state.api().add_review(&authed.token, &id, &review).await {
        Ok(_) => session::Flash::success("Thanks for your review!"),
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Review submission failed");
            session::Flash::error("Could not submit your review. Please try again.")
        }
    };
    session::set_flash(&session_handle, flash).await?;

    Ok(Redirect::to(&format!("/products/{id}")))
}

/// Redirect to a WhatsApp conversation pre-filled with a product inquiry.
#[instrument(skip(state))]
pub async fn buy_via_whatsapp(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.api().product(&id).await?;
    let product_url = format!("{}/products/{id}", state.config().base_url);
    let message = amaranta_core::product_message(&product, &product_url);
    let link = whatsapp::wa_link(&state.config().whatsapp_phone, &message);
    Ok(Redirect::to(&link))
}
