//! Contact form route handlers.
//!
//! Each submission produces two emails over SMTP: a notification to the
//! store inbox and an acknowledgement back to the sender.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmferry_core::Email;

use crate::services::email::ContactMessage;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Submit the contact form.
///
/// POST /api/contact
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    // Validate required fields before touching SMTP
    let Ok(email) = Email::parse(&form.email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ContactResponse {
                success: false,
                message: Some("Please enter a valid email address.".to_string()),
            }),
        );
    };

    if form.name.trim().is_empty() || form.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ContactResponse {
                success: false,
                message: Some("Name and message are required.".to_string()),
            }),
        );
    }

    let contact = ContactMessage {
        name: form.name.trim().to_string(),
        email,
        phone: form.phone.as_deref().map(str::trim).map(String::from),
        subject: form.subject.as_deref().map(str::trim).map(String::from),
        message: form.message.trim().to_string(),
    };

    // Notification first - losing the acknowledgement is recoverable,
    // losing the enquiry is not
    if let Err(e) = state.email().send_contact_notification(&contact).await {
        tracing::error!(email = %contact.email, error = %e, "Failed to send contact notification");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ContactResponse {
                success: false,
                message: Some("Something went wrong. Please try again.".to_string()),
            }),
        );
    }

    if let Err(e) = state.email().send_contact_acknowledgement(&contact).await {
        // The enquiry was delivered; an undeliverable sender address should
        // not fail the submission
        tracing::warn!(email = %contact.email, error = %e, "Failed to send contact acknowledgement");
    }

    tracing::info!(email = %contact.email, "Contact form submitted");
    (
        StatusCode::OK,
        Json(ContactResponse {
            success: true,
            message: Some("Thanks! We'll get back to you shortly.".to_string()),
        }),
    )
}
