//! Receipt text to delivery status.
//!
//! Rules, first match wins:
//! 1. absent, or trimmed text equal to "não entregue" -> not delivered
//! 2. trimmed text equal to a configured exact value -> delivered
//! 3. text containing "assinatura normal" -> delivered
//! 4. text containing "na base" (when enabled) -> at base
//! 5. anything else -> not delivered

use serde::Deserialize;

use crate::models::DeliveryStatus;

const NOT_DELIVERED_PHRASE: &str = "não entregue";
const DELIVERED_MARKER: &str = "assinatura normal";
const AT_BASE_MARKER: &str = "na base";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Distinguish orders held at a base from plain non-deliveries.
    pub at_base: bool,
    /// Receipt values counted as delivered on exact (case-insensitive) match,
    /// e.g. `["sim"]` for sheets that only record yes/no.
    pub delivered_exact: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            at_base: true,
            delivered_exact: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusClassifier {
    at_base: bool,
    delivered_exact: Vec<String>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl StatusClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            at_base: config.at_base,
            delivered_exact: config
                .delivered_exact
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Variant that folds "na base" into not delivered.
    pub fn without_at_base() -> Self {
        Self::new(&ClassifierConfig {
            at_base: false,
            ..ClassifierConfig::default()
        })
    }

    pub fn supports_at_base(&self) -> bool {
        self.at_base
    }

    pub fn classify(&self, raw: Option<&str>) -> DeliveryStatus {
        let Some(raw) = raw else {
            return DeliveryStatus::NotDelivered;
        };

        let lowered = raw.to_lowercase();
        let trimmed = lowered.trim();

        if trimmed == NOT_DELIVERED_PHRASE {
            return DeliveryStatus::NotDelivered;
        }
        if self.delivered_exact.iter().any(|v| v == trimmed) {
            return DeliveryStatus::Delivered;
        }
        if lowered.contains(DELIVERED_MARKER) {
            return DeliveryStatus::Delivered;
        }
        if self.at_base && lowered.contains(AT_BASE_MARKER) {
            return DeliveryStatus::AtBase;
        }

        DeliveryStatus::NotDelivered
    }
}
