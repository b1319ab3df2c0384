//! Contact form handlers.

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

use crate::api::types::ContactRequest;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session;
use crate::state::AppState;

use super::Shell;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact/index.html")]
pub struct ContactTemplate {
    pub shell: Shell,
}

/// Display the contact page.
#[instrument(skip(session_handle, authed))]
pub async fn page(
    session_handle: Session,
    OptionalAuth(authed): OptionalAuth,
) -> impl IntoResponse {
    ContactTemplate {
        shell: Shell::load(&session_handle, authed.as_ref()).await,
    }
}

/// Submit the contact form.
#[instrument(skip(state, session_handle, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    session_handle: Session,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let request = ContactRequest {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        subject: form.subject.trim().to_string(),
        message: form.message.trim().to_string(),
    };

    if request.name.is_empty() || request.email.is_empty() || request.message.is_empty() {
        session::set_flash(
            &session_handle,
            session::Flash::error("Please fill in your name, email and message."),
        )
        .await?;
        return Ok(Redirect::to("/contact").into_response());
    }

    let flash = match state.api().send_contact(&request).await {
        Ok(_) => session::Flash::success("Message sent. We will get back to you soon."),
        Err(e) => {
            tracing::warn!(error = %e, "Contact message failed");
            session::Flash::error("Could not send your message. Please try again.")
        }
    };
    session::set_flash(&session_handle, flash).await?;
    Ok(Redirect::to("/contact").into_response())
}
