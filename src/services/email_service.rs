use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Posts mail to a relay webhook. Without a webhook the mail is only logged,
/// which keeps local registration usable.
#[derive(Clone)]
pub struct WebhookMailer {
    client: Client,
    webhook_url: Option<String>,
    from: String,
}

impl WebhookMailer {
    pub fn new(webhook_url: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            from,
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.text, "mail relay not configured, logging mail");
            return Ok(());
        };

        let resp = self
            .client
            .post(url)
            .json(&json!({
                "from": self.from,
                "to": mail.to,
                "subject": mail.subject,
                "text": mail.text,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "mail relay rejected message");
            return Err(Error::Upstream(format!("mail relay returned {}", status)));
        }
        Ok(())
    }
}

pub fn otp_mail(to: &str, name: &str, otp: &str, ttl_minutes: i64) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "Your verification code".to_string(),
        text: format!(
            "Hi {},\n\nYour verification code is {}. It expires in {} minutes.\n\nIf you did not sign up, ignore this email.",
            name, otp, ttl_minutes
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_mail_carries_code_and_expiry() {
        let mail = otp_mail("a@b.io", "Ana", "123456", 10);
        assert_eq!(mail.to, "a@b.io");
        assert!(mail.text.contains("123456"));
        assert!(mail.text.contains("10 minutes"));
    }

    #[test]
    fn unconfigured_relay_logs_and_succeeds() {
        let mailer = WebhookMailer::new(None, "no-reply@test".into());
        tokio_test::block_on(mailer.send(otp_mail("a@b.io", "Ana", "000111", 5))).unwrap();
    }
}
