//! Message-bus delivery over a persistent outbound socket.

use super::{FiringRules, Notifier};
use crate::config::NotifierConfig;
use crate::entry::LogEntry;
use std::io::Write as _;
use std::net::TcpStream;
use std::sync::Mutex;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pushes serialized entries over a long-lived TCP connection to a bus
/// endpoint. The connection is established lazily and re-established after
/// a write failure; records are newline-delimited JSON with the auth token
/// (when set) prefixed to each payload.
pub struct BusNotifier {
    rules: FiringRules,
    endpoint: String,
    token: String,
    conn: Mutex<Option<TcpStream>>,
}

impl BusNotifier {
    #[must_use]
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            rules: FiringRules::from_config(config),
            endpoint: config.endpoint.clone(),
            token: config.auth_token.clone(),
            conn: Mutex::new(None),
        }
    }

    fn connect(&self) -> Result<TcpStream, crate::Error> {
        let addr = self
            .endpoint
            .parse()
            .map_err(|e| crate::Error::Notify(format!("bus endpoint {}: {e}", self.endpoint)))?;
        TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| crate::Error::Notify(format!("bus connect {}: {e}", self.endpoint)))
    }
}

impl Notifier for BusNotifier {
    fn notify(&self, entry: &LogEntry) -> Result<(), crate::Error> {
        if !self.rules.allows(entry) {
            return Ok(());
        }
        if self.endpoint.is_empty() {
            return Err(crate::Error::Notify("bus endpoint not configured".into()));
        }

        let json = serde_json::to_string(entry)?;
        let payload = if self.token.is_empty() {
            format!("{json}\n")
        } else {
            format!("{} {json}\n", self.token)
        };

        let mut guard = self
            .conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        // Held connection assumed valid until a write proves otherwise; the
        // failed connection is dropped so the next call reconnects.
        if let Some(stream) = guard.as_mut() {
            if let Err(e) = stream.write_all(payload.as_bytes()) {
                *guard = None;
                return Err(crate::Error::Notify(format!(
                    "bus write {}: {e}",
                    self.endpoint
                )));
            }
        }
        Ok(())
    }
}
