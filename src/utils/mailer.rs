use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Password-reset delivery through an HTTP mail API. Without configured
/// credentials the reset link is logged instead, which is the dev setup.
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }

    pub async fn send_password_reset(
        &self,
        email: &str,
        username: &str,
        token: &str,
    ) -> AppResult<()> {
        let reset_link = format!("{}/reset-password/{}", self.frontend_url, token);

        let (Some(api_url), Some(api_key)) = (&self.api_url, &self.api_key) else {
            tracing::info!(%email, %reset_link, "Mail API not configured, logging reset link");
            return Ok(());
        };

        let body = json!({
            "from": self.from,
            "to": email,
            "subject": "Password Reset Request",
            "text": format!(
                "Hello {},\n\n\
                 You requested to reset your password. Open the link below \
                 within one hour:\n{}\n\n\
                 If you didn't request this, you can ignore this email.",
                username, reset_link
            ),
        });

        let response = self
            .client
            .post(api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send reset email: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, %detail, "Mail API rejected the reset email");
            return Err(AppError::Internal("Failed to send reset email".to_string()));
        }

        Ok(())
    }
}
