//! Record selection for dashboards and exports.

use std::collections::BTreeSet;

use crate::models::{DeliveryStatus, OrderRecord};

/// Empty sets place no restriction on their field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub bases: BTreeSet<String>,
    pub couriers: BTreeSet<String>,
    pub cities: BTreeSet<String>,
    pub statuses: BTreeSet<DeliveryStatus>,
}

impl RecordFilter {
    pub fn with_bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases.extend(bases.into_iter().map(Into::into));
        self
    }

    pub fn with_couriers<I, S>(mut self, couriers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.couriers.extend(couriers.into_iter().map(Into::into));
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities.extend(cities.into_iter().map(Into::into));
        self
    }

    pub fn with_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = DeliveryStatus>,
    {
        self.statuses.extend(statuses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty() && self.couriers.is_empty() && self.cities.is_empty() && self.statuses.is_empty()
    }

    pub fn matches(&self, record: &OrderRecord) -> bool {
        (self.bases.is_empty() || self.bases.contains(&record.base))
            && (self.couriers.is_empty()
                || record.courier.as_ref().is_some_and(|c| self.couriers.contains(c)))
            && (self.cities.is_empty() || self.cities.contains(&record.city))
            && (self.statuses.is_empty() || self.statuses.contains(&record.status))
    }

    pub fn apply(&self, records: &[OrderRecord]) -> Vec<OrderRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::StatusClassifier;

    fn records() -> Vec<OrderRecord> {
        let c = StatusClassifier::default();
        vec![
            OrderRecord::new("1", "A", "Recife", Some("Ana".into()), Some("Assinatura normal".into()), &c),
            OrderRecord::new("2", "A", "Olinda", None, None, &c),
            OrderRecord::new("3", "B", "Recife", Some("Bia".into()), Some("na base".into()), &c),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records()).len(), 3);
    }

    #[test]
    fn test_filter_by_base_and_city() {
        let filter = RecordFilter::default().with_bases(["A"]).with_cities(["Recife"]);
        let kept = filter.apply(&records());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].order_id, "1");
    }

    #[test]
    fn test_courier_filter_drops_unassigned() {
        let filter = RecordFilter::default().with_couriers(["Ana", "Bia"]);
        let ids: Vec<String> = filter.apply(&records()).into_iter().map(|r| r.order_id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_by_status() {
        let filter = RecordFilter::default().with_statuses([DeliveryStatus::AtBase]);
        let kept = filter.apply(&records());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].base, "B");
    }
}
