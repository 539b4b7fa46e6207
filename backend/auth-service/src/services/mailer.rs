//! Password reset mail delivery over SMTP.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;
use crate::error::{AuthError, Result};

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| AuthError::Mail(e.to_string()))?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        let from = settings
            .from
            .parse()
            .map_err(|_| AuthError::Mail(format!("invalid from address: {}", settings.from)))?;

        Ok(Self { transport, from })
    }

    /// Confirmation mail sent after a successful registration. Delivery is
    /// best-effort; the caller logs failures and keeps the account.
    pub async fn send_registration_email(&self, to: &str, full_name: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|_| AuthError::Mail(format!("invalid recipient address: {to}")))?)
            .subject("Welcome - your account is ready")
            .body(format!(
                "Hi {full_name},\n\n\
                 Your customer account has been created successfully.\n\
                 You can now log in with your email address.\n"
            ))
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        tracing::info!(recipient = %to, "registration email sent");
        Ok(())
    }

    pub async fn send_reset_email(&self, to: &str, reset_url: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|_| AuthError::Mail(format!("invalid recipient address: {to}")))?)
            .subject("Password reset request")
            .body(format!(
                "A password reset was requested for your account.\n\n\
                 Follow this link to choose a new password:\n{reset_url}\n\n\
                 The link expires in one hour. If you did not request a reset,\n\
                 you can ignore this email."
            ))
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        tracing::info!(recipient = %to, "password reset email sent");
        Ok(())
    }
}
