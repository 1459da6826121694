//! Webhook delivery over HTTP.

use super::{FiringRules, Notifier};
use crate::config::NotifierConfig;
use crate::entry::LogEntry;
use reqwest::blocking::Client;
use reqwest::Method;
use std::sync::OnceLock;
use std::time::Duration;

/// POSTs the entry as JSON to a webhook URL, optionally bearer-token
/// authenticated. The client is built on first delivery: construction
/// happens on reload paths that may run inside an async runtime, where a
/// blocking client must not be created.
pub struct HttpNotifier {
    rules: FiringRules,
    url: String,
    method: String,
    token: String,
    client: OnceLock<Client>,
}

impl HttpNotifier {
    #[must_use]
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            rules: FiringRules::from_config(config),
            url: config.webhook_url.clone(),
            method: config.http_method.clone(),
            token: config.auth_token.clone(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(|| {
            Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default()
        })
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, entry: &LogEntry) -> Result<(), crate::Error> {
        if !self.rules.allows(entry) {
            return Ok(());
        }
        if self.url.is_empty() {
            return Err(crate::Error::Notify("webhook URL not configured".into()));
        }

        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())
            .unwrap_or(Method::POST);
        let mut request = self.client().request(method, &self.url).json(entry);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .map_err(|e| crate::Error::Notify(format!("webhook {}: {e}", self.url)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::Error::Notify(format!(
                "webhook {} returned {status}",
                self.url
            )));
        }
        Ok(())
    }
}
