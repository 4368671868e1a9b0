//! Out-of-band delivery adapters for ticket-closure codes.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use crate::domain::ports::{NotifyError, OtpNotifier};
use crate::domain::ticket::OTP_TTL_MINUTES;

/// Timeout for a single gateway call; a hung gateway must surface as an
/// error, not a stalled request.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Production adapter posting messages to an HTTP SMS/WhatsApp gateway.
pub struct HttpSmsNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpSmsNotifier {
    /// Build a notifier for the configured gateway endpoint.
    pub fn new(endpoint: String, api_key: String) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|err| NotifyError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl OtpNotifier for HttpSmsNotifier {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        let body = json!({
            "to": recipient,
            "body": format!(
                "Your ticket closure code is {code}. Valid for {OTP_TTL_MINUTES} minutes."
            ),
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotifyError::unavailable(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            // Response bodies from the gateway stay in the logs, not in the
            // error surfaced to clients.
            Err(NotifyError::rejected(format!(
                "gateway returned {}",
                response.status()
            )))
        }
    }
}

/// Development adapter that logs the code instead of sending it.
#[derive(Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        info!(recipient, code, "otp delivery (log-only notifier)");
        Ok(())
    }
}
