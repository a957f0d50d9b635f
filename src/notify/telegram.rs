use async_trait::async_trait;
use tracing::debug;

use super::Notifier;
use crate::errors::RestockError;

/// Sends milestone messages through the Telegram Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.to_string(),
            chat_id,
        }
    }

    async fn send_message(&self, text: &str) -> Result<(), RestockError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RestockError::Notify(format!(
                "telegram returned {}",
                response.status()
            )));
        }
        debug!(chat_id = self.chat_id, "Telegram message delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_stock_found(&self, label: &str, url: &str) -> Result<(), RestockError> {
        self.send_message(&format!("{} available at {}", label, url))
            .await
    }

    async fn notify_final_details(&self) -> Result<(), RestockError> {
        self.send_message("Filling out Final Details Page").await
    }
}
