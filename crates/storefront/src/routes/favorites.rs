//! Favorites route handlers.
//!
//! The heart button is an HTMX fragment; toggling swaps the button in place
//! with the state the API reports back, so the rendered state is always the
//! persisted one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use amaranta_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, auth};
use crate::state::AppState;

use super::Shell;
use super::products::ProductCardView;

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub shell: Shell,
    pub products: Vec<ProductCardView>,
}

/// Favorite heart button fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_button.html")]
pub struct FavoriteButtonTemplate {
    pub product_id: String,
    pub is_favorite: bool,
}

/// Display the favorites page.
#[instrument(skip(state, session_handle, authed))]
pub async fn index(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAuth(authed): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = state.api().favorites(&authed.token).await?;
    let cards = products
        .iter()
        .map(|p| ProductCardView::new(p, Some(&authed.user)))
        .collect();

    Ok(FavoritesTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        products: cards,
    })
}

/// Toggle a favorite (HTMX).
///
/// Updates the session user's cached favorites list so hearts elsewhere on
/// the site render correctly on the next page load.
#[instrument(skip(state, session_handle, authed))]
pub async fn toggle(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAuth(mut authed): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let toggled = state.api().toggle_favorite(&authed.token, &id).await?;

    authed.user.favorites = toggled.favorites;
    auth::set_current_user(&session_handle, &authed.token, &authed.user).await?;

    Ok(FavoriteButtonTemplate {
        product_id: id.to_string(),
        is_favorite: toggled.is_favorite,
    })
}
