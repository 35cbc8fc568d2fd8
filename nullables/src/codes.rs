//! Nullable code service: accepts one known code and records every call.

use async_trait::async_trait;
use onboard_types::{ChannelKind, CodeService, DeliveryError, InvalidCodeError, OtpCode};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// A code service that never delivers anything.
///
/// Every send succeeds unless the target was marked as undeliverable; every
/// check succeeds only for the configured code.
pub struct NullCodeService {
    accepted: String,
    undeliverable: HashSet<String>,
    delay: Option<Duration>,
    sends: Mutex<Vec<(ChannelKind, String)>>,
    checks: Mutex<Vec<(ChannelKind, String, String)>>,
}

impl NullCodeService {
    /// Accept `code` for every target.
    pub fn accepting(code: &str) -> Self {
        Self {
            accepted: code.to_string(),
            undeliverable: HashSet::new(),
            delay: None,
            sends: Mutex::new(Vec::new()),
            checks: Mutex::new(Vec::new()),
        }
    }

    /// Fail every send to `target` with a delivery error.
    pub fn rejecting_target(mut self, target: &str) -> Self {
        self.undeliverable.insert(target.to_string());
        self
    }

    /// Make every call take `delay` (on the tokio clock) before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All sends so far, in call order.
    pub fn sends(&self) -> Vec<(ChannelKind, String)> {
        self.sends.lock().unwrap().clone()
    }

    /// All checks so far as `(kind, target, code)`, in call order.
    pub fn checks(&self) -> Vec<(ChannelKind, String, String)> {
        self.checks.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CodeService for NullCodeService {
    async fn send_code(&self, kind: ChannelKind, target: &str) -> Result<(), DeliveryError> {
        self.sends.lock().unwrap().push((kind, target.to_string()));
        self.wait().await;
        if self.undeliverable.contains(target) {
            return Err(DeliveryError::new(kind, "target is not reachable"));
        }
        Ok(())
    }

    async fn check_code(
        &self,
        kind: ChannelKind,
        target: &str,
        code: &OtpCode,
    ) -> Result<(), InvalidCodeError> {
        self.checks
            .lock()
            .unwrap()
            .push((kind, target.to_string(), code.as_str().to_string()));
        self.wait().await;
        if code.as_str() == self.accepted {
            Ok(())
        } else {
            Err(InvalidCodeError { kind })
        }
    }
}
