//! Grouped counting of order statuses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{DeliveryStatus, OrderRecord};

/// Grouping dimension of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Base,
    Courier,
}

impl GroupBy {
    /// Grouping key of a record; blank values count as absent.
    pub fn key<'a>(&self, record: &'a OrderRecord) -> Option<&'a str> {
        let value = match self {
            GroupBy::Base => Some(record.base.as_str()),
            GroupBy::Courier => record.courier.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Base => "Base de entrega",
            GroupBy::Courier => "Entregador",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happens to records whose grouping key is absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Record does not take part in this grouping.
    #[default]
    Exclude,
    /// Record is counted under an explicit label.
    Bucket(String),
}

/// Per-status order counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub delivered: u64,
    pub not_delivered: u64,
    pub at_base: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: DeliveryStatus) {
        match status {
            DeliveryStatus::Delivered => self.delivered += 1,
            DeliveryStatus::NotDelivered => self.not_delivered += 1,
            DeliveryStatus::AtBase => self.at_base += 1,
        }
    }

    pub fn get(&self, status: DeliveryStatus) -> u64 {
        match status {
            DeliveryStatus::Delivered => self.delivered,
            DeliveryStatus::NotDelivered => self.not_delivered,
            DeliveryStatus::AtBase => self.at_base,
        }
    }

    /// Always the sum of the per-status counts.
    pub fn total(&self) -> u64 {
        self.delivered + self.not_delivered + self.at_base
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.delivered += other.delivered;
        self.not_delivered += other.not_delivered;
        self.at_base += other.at_base;
    }
}

impl<'a> FromIterator<&'a OrderRecord> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a OrderRecord>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for record in iter {
            counts.record(record.status);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAggregate {
    pub key: String,
    pub counts: StatusCounts,
}

impl GroupAggregate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            counts: StatusCounts::default(),
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.total()
    }
}

/// Aggregates keyed by group value, iterated in key order.
pub type Aggregates = BTreeMap<String, GroupAggregate>;

/// Single pass over `records`, one running counter per distinct key.
pub fn aggregate<'a, I>(records: I, group_by: GroupBy, unknown: &UnknownKeyPolicy) -> Aggregates
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut groups = Aggregates::new();

    for record in records {
        let key = match (group_by.key(record), unknown) {
            (Some(key), _) => key,
            (None, UnknownKeyPolicy::Bucket(label)) => label.as_str(),
            (None, UnknownKeyPolicy::Exclude) => continue,
        };

        groups
            .entry(key.to_string())
            .or_insert_with(|| GroupAggregate::new(key))
            .counts
            .record(record.status);
    }

    groups
}
