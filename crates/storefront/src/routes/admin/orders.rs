//! Admin order management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use amaranta_core::{OrderId, OrderStatus};

use crate::api::types::OrderRecord;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::session;
use crate::state::AppState;

use super::super::Shell;

/// One row of the admin order table.
#[derive(Clone)]
pub struct AdminOrderView {
    pub id: String,
    pub reference: String,
    pub customer: String,
    pub item_count: u32,
    pub total: String,
    pub status: OrderStatus,
    pub created_at: String,
}

impl From<&OrderRecord> for AdminOrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            id: order.id.to_string(),
            reference: order
                .order_number
                .clone()
                .unwrap_or_else(|| order.id.to_string()),
            customer: order
                .user
                .as_ref()
                .map(|u| {
                    if u.name.is_empty() {
                        u.email.clone()
                    } else {
                        u.name.clone()
                    }
                })
                .unwrap_or_default(),
            item_count: order.items.iter().map(|i| i.quantity).sum(),
            total: order.total.to_string(),
            status: order.status,
            created_at: order.created_at.clone().unwrap_or_default(),
        }
    }
}

/// Order list filter.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Status wire value; empty means the default working list.
    pub status: Option<String>,
}

/// Status update form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
    /// Filter to return to after the update.
    #[serde(default)]
    pub back: String,
}

/// Admin order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders_index.html")]
pub struct AdminOrdersTemplate {
    pub shell: Shell,
    pub orders: Vec<AdminOrderView>,
    pub status: String,
    pub statuses: [OrderStatus; 5],
}

/// Display the admin order list.
///
/// Without an explicit filter this shows the working list: everything not
/// yet delivered or cancelled.
#[instrument(skip(state, session_handle, authed))]
pub async fn index(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse> {
    let mut orders = state.api().orders(&authed.token).await?;

    let status = query.status.unwrap_or_default();
    let filter = OrderStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == status);
    match filter {
        Some(wanted) => orders.retain(|o| o.status == wanted),
        None => orders.retain(|o| {
            o.status != OrderStatus::Delivered && o.status != OrderStatus::Cancelled
        }),
    }

    let views = orders.iter().map(AdminOrderView::from).collect();
    Ok(AdminOrdersTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        orders: views,
        status,
        statuses: OrderStatus::ALL,
    })
}

/// Update an order's status and return to the list.
#[instrument(skip(state, session_handle, authed), fields(status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let flash = match state
        .api()
        .update_order_status(&authed.token, &id, form.status)
        .await
    {
        Ok(order) => session::Flash::success(format!(
            "Order {} marked as {}.",
            order.order_number.unwrap_or_else(|| order.id.to_string()),
            form.status.label().to_lowercase()
        )),
        Err(e) => {
            tracing::error!(order_id = %id, error = %e, "Order status update failed");
            session::Flash::error("Could not update the order status.")
        }
    };
    session::set_flash(&session_handle, flash).await?;

    let back = if form.back.is_empty() {
        "/admin/orders".to_string()
    } else {
        format!("/admin/orders?status={}", urlencoding::encode(&form.back))
    };
    Ok(Redirect::to(&back).into_response())
}
