use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::StatusClassifier;

/// Source column labels, the contract with upstream acquisition.
pub const FIELD_ORDER: &str = "Pedido";
pub const FIELD_BASE: &str = "Base de entrega";
pub const FIELD_CITY: &str = "Cidade Destino";
pub const FIELD_COURIER: &str = "Entregador";
pub const FIELD_RECEIPT: &str = "Recebimento";

/// Raw row as read from the spreadsheet export
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvRecord {
    #[serde(rename = "Pedido")]
    pub order_id: String,
    #[serde(rename = "Base de entrega")]
    pub base: String,
    #[serde(rename = "Cidade Destino")]
    pub city: String,
    #[serde(rename = "Entregador")]
    pub courier: Option<String>,
    #[serde(rename = "Recebimento")]
    pub receipt: Option<String>,
}

/// Normalized delivery outcome of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Delivered,
    NotDelivered,
    AtBase,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 3] = [
        DeliveryStatus::Delivered,
        DeliveryStatus::NotDelivered,
        DeliveryStatus::AtBase,
    ];

    /// Column label used in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "ENTREGUE",
            DeliveryStatus::NotDelivered => "NÃO ENTREGUE",
            DeliveryStatus::AtBase => "NA BASE",
        }
    }

    /// Parses either the API name (`DELIVERED`) or the table label (`ENTREGUE`).
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| {
            status.label().to_lowercase() == wanted || status.api_name().to_lowercase() == wanted
        })
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::NotDelivered => "NOT_DELIVERED",
            DeliveryStatus::AtBase => "AT_BASE",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order with its derived delivery status.
///
/// Built once per input row; downstream stages only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub base: String,
    pub city: String,
    pub courier: Option<String>,
    pub receipt: Option<String>,
    pub status: DeliveryStatus,
}

impl OrderRecord {
    pub fn new(
        order_id: impl Into<String>,
        base: impl Into<String>,
        city: impl Into<String>,
        courier: Option<String>,
        receipt: Option<String>,
        classifier: &StatusClassifier,
    ) -> Self {
        let status = classifier.classify(receipt.as_deref());
        Self {
            order_id: order_id.into(),
            base: base.into(),
            city: city.into(),
            courier,
            receipt,
            status,
        }
    }
}

impl CsvRecord {
    pub fn to_order(&self, classifier: &StatusClassifier) -> OrderRecord {
        OrderRecord::new(
            self.order_id.clone(),
            self.base.trim(),
            self.city.trim(),
            non_blank(self.courier.as_deref()),
            self.receipt.clone(),
            classifier,
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
