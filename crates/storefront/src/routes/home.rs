//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

use super::Shell;
use super::products::ProductCardView;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub featured: Vec<ProductCardView>,
    pub promotions: Vec<ProductCardView>,
}

/// Display the home page: featured products and current promotions.
#[instrument(skip(state, session_handle, authed))]
pub async fn home(
    State(state): State<AppState>,
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> Result<impl IntoResponse> {
    let featured = state.api().featured_products().await?;
    let promotions = state.api().promotions().await?;

    let user = authed.as_ref().map(|a| &a.user);
    Ok(HomeTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
        featured: featured
            .iter()
            .map(|p| ProductCardView::new(p, user))
            .collect(),
        promotions: promotions
            .iter()
            .map(|p| ProductCardView::new(p, user))
            .collect(),
    })
}
