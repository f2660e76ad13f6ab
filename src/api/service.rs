//! Shared report logic for the REST handlers
//!
//! Holds the acquired order sheet behind a TTL cache and computes reports on
//! demand. Every report is rebuilt from the cached records; nothing else is
//! retained between requests.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::classifier::StatusClassifier;
use crate::config::AppConfig;
use crate::error::{ReportError, Result};
use crate::filter::RecordFilter;
use crate::models::OrderRecord;
use crate::report::{build_reports, DeliveryReports, ReportOptions, SortOrder};
use crate::source::{DataSource, Dataset};

// ============================================================================
// Data Structures
// ============================================================================

enum Backing {
    Source(DataSource),
    Fixed(Arc<Dataset>),
}

struct CachedDataset {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

// ============================================================================
// Report Service
// ============================================================================

pub struct ReportService {
    backing: Backing,
    classifier: StatusClassifier,
    options: ReportOptions,
    timeout: Duration,
    ttl: Duration,
    cache: Arc<RwLock<Option<CachedDataset>>>,
}

impl ReportService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let source = config
            .source
            .data_source()
            .ok_or_else(|| ReportError::Config("no [source] path or url configured".to_string()))?;

        Ok(Self {
            backing: Backing::Source(source),
            classifier: StatusClassifier::new(&config.classifier),
            options: config.report.options(),
            timeout: config.source.timeout(),
            ttl: config.source.cache_ttl(),
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Service over records already in memory; reload is a no-op.
    pub fn from_records(records: Vec<OrderRecord>, options: ReportOptions) -> Self {
        Self {
            backing: Backing::Fixed(Arc::new(Dataset {
                records,
                skipped_rows: 0,
            })),
            classifier: StatusClassifier::default(),
            options,
            timeout: Duration::from_secs(30),
            ttl: Duration::MAX,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub async fn dataset(&self) -> Result<Arc<Dataset>> {
        let source = match &self.backing {
            Backing::Fixed(dataset) => return Ok(dataset.clone()),
            Backing::Source(source) => source,
        };

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(cached.dataset.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed it while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(cached.dataset.clone());
            }
        }

        match source.load(&self.classifier, self.timeout).await {
            Ok(dataset) => {
                info!("Loaded {} orders from {}", dataset.records.len(), source.describe());
                let dataset = Arc::new(dataset);
                *cache = Some(CachedDataset {
                    dataset: dataset.clone(),
                    loaded_at: Instant::now(),
                });
                Ok(dataset)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", source.describe(), e);
                Err(e)
            }
        }
    }

    /// Drops the cached sheet so the next request refetches it.
    pub async fn reload(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        info!("Order sheet cache cleared");
    }

    pub async fn orders(&self, filter: &RecordFilter, limit: Option<usize>) -> Result<Vec<OrderRecord>> {
        let dataset = self.dataset().await?;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(dataset
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    pub async fn reports(&self, filter: &RecordFilter, order: Option<SortOrder>) -> Result<DeliveryReports> {
        let dataset = self.dataset().await?;
        let records = filter.apply(&dataset.records);

        let mut options = self.options.clone();
        if let Some(order) = order {
            options.order = order;
        }
        Ok(build_reports(&records, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use std::io::Write;

    fn service() -> ReportService {
        let c = StatusClassifier::default();
        let records = vec![
            OrderRecord::new("1", "A", "Recife", Some("Ana".into()), Some("Assinatura normal".into()), &c),
            OrderRecord::new("2", "A", "Recife", Some("Bia".into()), None, &c),
            OrderRecord::new("3", "B", "Olinda", Some("Ana".into()), Some("Assinatura normal".into()), &c),
        ];
        ReportService::from_records(records, ReportOptions::default())
    }

    #[tokio::test]
    async fn test_reports_respect_filter() {
        let svc = service();
        let filter = RecordFilter::default().with_bases(["A"]);
        let reports = svc.reports(&filter, None).await.unwrap();
        assert_eq!(reports.orders, 2);
        assert_eq!(reports.by_base.rows.len(), 1);
        assert_eq!(reports.by_base.overall.percentage, 50.0);
    }

    #[tokio::test]
    async fn test_order_override() {
        let svc = service();
        let reports = svc
            .reports(&RecordFilter::default(), Some(SortOrder::Descending))
            .await
            .unwrap();
        let keys: Vec<&str> = reports.by_courier.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Ana", "Bia"]);
    }

    #[tokio::test]
    async fn test_orders_limit() {
        let svc = service();
        let orders = svc.orders(&RecordFilter::default(), Some(2)).await.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn test_requires_source() {
        assert!(matches!(
            ReportService::new(&AppConfig::default()),
            Err(ReportError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_file_source_is_cached_until_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Pedido,Base de entrega,Cidade Destino,Entregador,Recebimento").unwrap();
        writeln!(file, "1,A,Recife,Ana,Assinatura normal").unwrap();
        file.flush().unwrap();

        let config = AppConfig {
            source: SourceConfig {
                path: Some(file.path().to_path_buf()),
                ..SourceConfig::default()
            },
            ..AppConfig::default()
        };
        let svc = ReportService::new(&config).unwrap();
        assert_eq!(svc.dataset().await.unwrap().records.len(), 1);

        writeln!(file, "2,A,Recife,Ana,Não entregue").unwrap();
        file.flush().unwrap();
        assert_eq!(svc.dataset().await.unwrap().records.len(), 1);

        svc.reload().await;
        assert_eq!(svc.dataset().await.unwrap().records.len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_source_surfaces_acquisition_error() {
        let config = AppConfig {
            source: SourceConfig {
                path: Some("/nonexistent/orders.csv".into()),
                ..SourceConfig::default()
            },
            ..AppConfig::default()
        };
        let svc = ReportService::new(&config).unwrap();
        let err = svc.reports(&RecordFilter::default(), None).await.unwrap_err();
        assert!(matches!(err, ReportError::Acquisition(_)));
    }
}
