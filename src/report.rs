//! Report assembly: per-group rates, ordering and grand totals.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::aggregate::{aggregate, Aggregates, GroupBy, StatusCounts, UnknownKeyPolicy};
use crate::models::OrderRecord;
use crate::rate::{rate, RateRecord, Thresholds};

/// Ordering of report rows by delivery rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Worst performers first.
    #[default]
    Ascending,
    Descending,
    /// Group key order.
    #[serde(rename = "none")]
    #[value(name = "none")]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub key: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u64,
    #[serde(flatten)]
    pub rate: RateRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub group_by: GroupBy,
    pub rows: Vec<ReportRow>,
    pub totals: StatusCounts,
    pub total: u64,
    pub overall: RateRecord,
}

impl Report {
    pub fn row(&self, key: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Turns aggregates into an ordered report. Ties on rate fall back to key order.
pub fn assemble(
    aggregates: &Aggregates,
    group_by: GroupBy,
    order: SortOrder,
    thresholds: &Thresholds,
) -> Report {
    let mut totals = StatusCounts::default();
    let mut rows: Vec<ReportRow> = aggregates
        .values()
        .map(|g| {
            totals.merge(&g.counts);
            ReportRow {
                key: g.key.clone(),
                counts: g.counts,
                total: g.total(),
                rate: rate(&g.counts, thresholds),
            }
        })
        .collect();

    match order {
        SortOrder::Ascending => rows.sort_by(|a, b| by_rate(a, b).then_with(|| a.key.cmp(&b.key))),
        SortOrder::Descending => rows.sort_by(|a, b| by_rate(b, a).then_with(|| a.key.cmp(&b.key))),
        SortOrder::Unordered => rows.sort_by(|a, b| a.key.cmp(&b.key)),
    }

    Report {
        group_by,
        rows,
        totals,
        total: totals.total(),
        overall: rate(&totals, thresholds),
    }
}

fn by_rate(a: &ReportRow, b: &ReportRow) -> Ordering {
    a.rate.percentage.total_cmp(&b.rate.percentage)
}

/// Knobs shared by every report run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportOptions {
    pub order: SortOrder,
    pub unknown: UnknownKeyPolicy,
    pub thresholds: Thresholds,
}

/// The two reports the dashboard shows, plus the overall status mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReports {
    pub orders: u64,
    pub statuses: StatusCounts,
    pub by_base: Report,
    pub by_courier: Report,
}

pub fn build_report(records: &[OrderRecord], group_by: GroupBy, options: &ReportOptions) -> Report {
    let groups = aggregate(records, group_by, &options.unknown);
    assemble(&groups, group_by, options.order, &options.thresholds)
}

pub fn build_reports(records: &[OrderRecord], options: &ReportOptions) -> DeliveryReports {
    DeliveryReports {
        orders: records.len() as u64,
        statuses: records.iter().collect(),
        by_base: build_report(records, GroupBy::Base, options),
        by_courier: build_report(records, GroupBy::Courier, options),
    }
}
