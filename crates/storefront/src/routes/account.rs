//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::types::OrderRecord;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, auth};
use crate::models::session;
use crate::state::AppState;

use super::Shell;

/// Order display data for the history page.
#[derive(Clone)]
pub struct OrderView {
    pub reference: String,
    pub status: &'static str,
    pub total: String,
    pub created_at: String,
    pub lines: Vec<OrderLineView>,
}

/// One line of an order in the history page.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub selection: String,
    pub quantity: u32,
    pub subtotal: String,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            reference: order
                .order_number
                .clone()
                .unwrap_or_else(|| order.id.to_string()),
            status: order.status.label(),
            total: order.total.to_string(),
            created_at: order.created_at.clone().unwrap_or_default(),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    selection: match (item.size.as_deref(), item.color.as_deref()) {
                        (Some(s), Some(c)) => format!("{s} / {c}"),
                        (Some(s), None) => s.to_owned(),
                        (None, Some(c)) => c.to_owned(),
                        (None, None) => String::new(),
                    },
                    quantity: item.quantity,
                    subtotal: item.subtotal().to_string(),
                })
                .collect(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub shell: Shell,
    pub orders: Vec<OrderView>,
}

/// Display the visitor's order history.
#[instrument(skip(state, session_handle, authed))]
pub async fn orders(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAuth(authed): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = state.api().my_orders(&authed.token).await?;
    let views = orders.iter().map(OrderView::from).collect();

    Ok(OrdersTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        orders: views,
    })
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub shell: Shell,
    pub name: String,
    pub email: String,
}

/// Display the profile page.
#[instrument(skip(session_handle, authed))]
pub async fn profile_page(
    session_handle: Session,
    RequireAuth(authed): RequireAuth,
) -> impl IntoResponse {
    let name = authed.user.name.clone();
    let email = authed.user.email.clone();
    ProfileTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        name,
        email,
    }
}

/// Update the profile and refresh the session's cached user record.
#[instrument(skip(state, session_handle, authed, form), fields(email = %form.email))]
pub async fn profile_update(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAuth(mut authed): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let name = form.name.trim();
    let email = form.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() {
        session::set_flash(
            &session_handle,
            session::Flash::error("Name and email are required."),
        )
        .await?;
        return Ok(Redirect::to("/account/profile").into_response());
    }

    let flash = match state
        .api()
        .update_profile(&authed.token, name, &email)
        .await
    {
        Ok(user) => {
            authed.user.name = user.name;
            authed.user.email = user.email;
            auth::set_current_user(&session_handle, &authed.token, &authed.user).await?;
            session::Flash::success("Profile updated.")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            session::Flash::error("Could not update your profile. Please try again.")
        }
    };
    session::set_flash(&session_handle, flash).await?;
    Ok(Redirect::to("/account/profile").into_response())
}
