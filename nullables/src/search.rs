//! Nullable search service: filters a fixed option list with per-query
//! latency so tests can force out-of-order resolution.

use async_trait::async_trait;
use onboard_types::{SearchService, SelectOption};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub struct NullSearchService {
    options: Vec<SelectOption>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl NullSearchService {
    /// Answer every query with the options whose label contains it
    /// (case-insensitive); the empty query returns everything.
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            delays: HashMap::new(),
            default_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Latency for queries without a specific delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Latency for one exact query.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Every query received, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchService for NullSearchService {
    async fn search(&self, query: &str) -> Vec<SelectOption> {
        self.calls.lock().unwrap().push(query.to_string());
        let delay = self
            .delays
            .get(query)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let needle = query.to_lowercase();
        self.options
            .iter()
            .filter(|o| o.label.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
