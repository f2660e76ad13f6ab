//! Delivery rate and severity tier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregate::{GroupAggregate, StatusCounts};
use crate::error::{ReportError, Result};

pub const GREEN_THRESHOLD: f64 = 98.0;
pub const YELLOW_THRESHOLD: f64 = 95.0;

/// Severity of a delivery rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    /// Tier against the default 98/95 thresholds.
    pub fn from_percentage(percentage: f64) -> Self {
        Thresholds::default().tier(percentage)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::Green => "good",
            Tier::Yellow => "warning",
            Tier::Red => "critical",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Green => "GREEN",
            Tier::Yellow => "YELLOW",
            Tier::Red => "RED",
        };
        f.write_str(name)
    }
}

/// Inclusive lower bounds of the green and yellow tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub green: f64,
    pub yellow: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            green: GREEN_THRESHOLD,
            yellow: YELLOW_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.green) || !in_range(self.yellow) {
            return Err(ReportError::Config(format!(
                "thresholds must lie in [0, 100], got green={} yellow={}",
                self.green, self.yellow
            )));
        }
        if self.yellow > self.green {
            return Err(ReportError::Config(format!(
                "yellow threshold {} exceeds green threshold {}",
                self.yellow, self.green
            )));
        }
        Ok(())
    }

    pub fn tier(&self, percentage: f64) -> Tier {
        if percentage >= self.green {
            Tier::Green
        } else if percentage >= self.yellow {
            Tier::Yellow
        } else {
            Tier::Red
        }
    }
}

/// Delivered percentage (two decimals) and its tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateRecord {
    pub percentage: f64,
    pub tier: Tier,
}

/// Rate of a set of counts. An empty set has rate 0.
pub fn rate(counts: &StatusCounts, thresholds: &Thresholds) -> RateRecord {
    let total = counts.total();
    let percentage = if total == 0 {
        0.0
    } else {
        round2(counts.delivered as f64 / total as f64 * 100.0)
    };

    RateRecord {
        percentage,
        tier: thresholds.tier(percentage),
    }
}

pub fn rate_of(aggregate: &GroupAggregate, thresholds: &Thresholds) -> RateRecord {
    rate(&aggregate.counts, thresholds)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(delivered: u64, not_delivered: u64) -> StatusCounts {
        StatusCounts {
            delivered,
            not_delivered,
            at_base: 0,
        }
    }

    #[test]
    fn test_empty_group_rate_is_zero() {
        let r = rate(&StatusCounts::default(), &Thresholds::default());
        assert_eq!(r.percentage, 0.0);
        assert_eq!(r.tier, Tier::Red);
    }

    #[test]
    fn test_rate_rounded_to_two_places() {
        let r = rate(&counts(1, 2), &Thresholds::default());
        assert_eq!(r.percentage, 33.33);
        let r = rate(&counts(2, 1), &Thresholds::default());
        assert_eq!(r.percentage, 66.67);
    }

    #[test]
    fn test_at_base_counts_against_rate() {
        let c = StatusCounts {
            delivered: 1,
            not_delivered: 0,
            at_base: 1,
        };
        assert_eq!(rate(&c, &Thresholds::default()).percentage, 50.0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_percentage(100.0), Tier::Green);
        assert_eq!(Tier::from_percentage(98.0), Tier::Green);
        assert_eq!(Tier::from_percentage(97.999), Tier::Yellow);
        assert_eq!(Tier::from_percentage(95.0), Tier::Yellow);
        assert_eq!(Tier::from_percentage(94.999), Tier::Red);
        assert_eq!(Tier::from_percentage(0.0), Tier::Red);
    }

    #[test]
    fn test_full_delivery_is_green() {
        let r = rate(&counts(49, 1), &Thresholds::default());
        assert_eq!(r.percentage, 98.0);
        assert_eq!(r.tier, Tier::Green);
    }

    #[test]
    fn test_tier_follows_rounded_percentage() {
        // 4899 / 4999 is 97.9996%, shown and tiered as 98.00.
        let r = rate(&counts(4899, 100), &Thresholds::default());
        assert_eq!(r.percentage, 98.0);
        assert_eq!(r.tier, Tier::Green);
    }

    #[test]
    fn test_rate_of_aggregate() {
        let g = GroupAggregate {
            key: "A".to_string(),
            counts: counts(97, 3),
        };
        let r = rate_of(&g, &Thresholds::default());
        assert_eq!(r.percentage, 97.0);
        assert_eq!(r.tier, Tier::Yellow);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = Thresholds { green: 90.0, yellow: 80.0 };
        assert!(t.validate().is_ok());
        assert_eq!(t.tier(85.0), Tier::Yellow);
        assert_eq!(t.tier(90.0), Tier::Green);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(Thresholds { green: 90.0, yellow: 95.0 }.validate().is_err());
        assert!(Thresholds { green: 120.0, yellow: 95.0 }.validate().is_err());
    }
}
