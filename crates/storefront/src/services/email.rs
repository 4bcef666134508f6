//! Email service for the contact endpoint.
//!
//! Uses SMTP via lettre. Every contact submission produces two messages: a
//! notification to the store inbox and an acknowledgement back to the
//! sender.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use farmferry_core::Email;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// Email service for transactional storefront mail.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    contact_recipient: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay host is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            contact_recipient: config.contact_recipient.clone(),
        })
    }

    /// Send the store-inbox notification for a contact submission.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_contact_notification(
        &self,
        contact: &ContactMessage,
    ) -> Result<(), EmailError> {
        let subject = format!(
            "Contact form: {}",
            contact.subject.as_deref().unwrap_or("New enquiry")
        );
        let body = format!(
            "New contact form submission\n\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\n\
             {}\n",
            contact.name,
            contact.email,
            contact.phone.as_deref().unwrap_or("-"),
            contact.message,
        );

        self.send_text_email(&self.contact_recipient, &subject, &body)
            .await
    }

    /// Send the acknowledgement back to the sender.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_contact_acknowledgement(
        &self,
        contact: &ContactMessage,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Hi {},\n\n\
             Thanks for reaching out to FarmFerry. We've received your message\n\
             and will get back to you within one working day.\n\n\
             Your message:\n{}\n\n\
             The FarmFerry team\n",
            contact.name, contact.message,
        );

        self.send_text_email(
            contact.email.as_str(),
            "We've received your message",
            &body,
        )
        .await
    }

    /// Send a plain text email.
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_message_carries_optional_fields() {
        let contact = ContactMessage {
            name: "Asha".to_owned(),
            email: Email::parse("asha@example.com").expect("valid email"),
            phone: None,
            subject: Some("Delivery window".to_owned()),
            message: "Can I pick a morning slot?".to_owned(),
        };
        assert_eq!(contact.subject.as_deref(), Some("Delivery window"));
        assert!(contact.phone.is_none());
    }
}
