use axum::http::StatusCode;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;
use crate::error::{Error, Result};

/// Thin wrapper over the SMTP relay; delivery guarantees are the relay's
/// problem, not ours.
#[derive(Clone)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| Error::Config(format!("Invalid EMAIL_FROM address: {}", e)))?;
        Ok(Self { transport, from })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| Error::BadRequest(format!("Invalid recipient address: {}", e)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| Error::Anyhow(anyhow::anyhow!("could not build email: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!(error = %e, "email dispatch failed");
            Error::Operational {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "There was an error sending the email. Try again later!".to_string(),
            }
        })?;
        Ok(())
    }

    pub async fn send_password_reset(&self, to: &str, reset_token: &str) -> Result<()> {
        let body = format!(
            "Forgot your password? Submit a PATCH request with your new password to \
             /auth-users/resetPassword/{}.\nIf you didn't forget your password, \
             please ignore this email!",
            reset_token
        );
        self.send(to, "Your password reset token (valid for 10 min)", &body)
            .await
    }
}
