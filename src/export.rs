//! CSV and JSON exports of annotated orders and reports.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::models::OrderRecord;
use crate::report::{DeliveryReports, Report};

pub const BASE_REPORT_FILE: &str = "taxa_por_base.csv";
pub const COURIER_REPORT_FILE: &str = "taxa_por_entregador.csv";
pub const TOTALS_LABEL: &str = "TOTAL GERAL";

#[derive(Serialize)]
struct OrderRow<'a> {
    #[serde(rename = "Pedido")]
    order_id: &'a str,
    #[serde(rename = "Base de entrega")]
    base: &'a str,
    #[serde(rename = "Cidade Destino")]
    city: &'a str,
    #[serde(rename = "Entregador")]
    courier: Option<&'a str>,
    #[serde(rename = "Recebimento")]
    receipt: Option<&'a str>,
    #[serde(rename = "Status")]
    status: &'static str,
}

impl<'a> From<&'a OrderRecord> for OrderRow<'a> {
    fn from(r: &'a OrderRecord) -> Self {
        Self {
            order_id: &r.order_id,
            base: &r.base,
            city: &r.city,
            courier: r.courier.as_deref(),
            receipt: r.receipt.as_deref(),
            status: r.status.label(),
        }
    }
}

fn export_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Export(e.to_string())
}

/// Writes the annotated order list, source columns plus `Status`.
pub fn write_orders<W: Write>(records: &[OrderRecord], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for record in records {
        wtr.serialize(OrderRow::from(record)).map_err(export_err)?;
    }
    wtr.flush().map_err(export_err)?;
    Ok(())
}

/// Writes one report table followed by a grand-total row.
pub fn write_report<W: Write>(report: &Report, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        report.group_by.label(),
        "ENTREGUE",
        "NÃO ENTREGUE",
        "NA BASE",
        "TOTAL",
        "TAXA %",
        "Faixa",
    ])
    .map_err(export_err)?;

    for row in &report.rows {
        wtr.write_record(&[
            row.key.clone(),
            row.counts.delivered.to_string(),
            row.counts.not_delivered.to_string(),
            row.counts.at_base.to_string(),
            row.total.to_string(),
            format!("{:.2}", row.rate.percentage),
            row.rate.tier.to_string(),
        ])
        .map_err(export_err)?;
    }

    wtr.write_record(&[
        TOTALS_LABEL.to_string(),
        report.totals.delivered.to_string(),
        report.totals.not_delivered.to_string(),
        report.totals.at_base.to_string(),
        report.total.to_string(),
        format!("{:.2}", report.overall.percentage),
        report.overall.tier.to_string(),
    ])
    .map_err(export_err)?;

    wtr.flush().map_err(export_err)?;
    Ok(())
}

pub fn write_json<W: Write>(reports: &DeliveryReports, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, reports).map_err(export_err)
}

pub fn export_orders(records: &[OrderRecord], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| export_err(format!("{}: {}", path.display(), e)))?;
    write_orders(records, file)?;
    info!("Exported {} orders to {:?}", records.len(), path);
    Ok(())
}

/// Writes both report tables into `dir`, returning the created paths.
pub fn export_reports(reports: &DeliveryReports, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| export_err(format!("{}: {}", dir.display(), e)))?;

    let mut written = Vec::new();
    for (report, name) in [
        (&reports.by_base, BASE_REPORT_FILE),
        (&reports.by_courier, COURIER_REPORT_FILE),
    ] {
        let path = dir.join(name);
        let file = File::create(&path).map_err(|e| export_err(format!("{}: {}", path.display(), e)))?;
        write_report(report, file)?;
        info!("Exported {} rows to {:?}", report.rows.len(), path);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::StatusClassifier;
    use crate::report::{build_reports, ReportOptions};

    fn records() -> Vec<OrderRecord> {
        let c = StatusClassifier::default();
        vec![
            OrderRecord::new("007", "A", "Recife", Some("Ana".into()), Some("Assinatura normal".into()), &c),
            OrderRecord::new("008", "A", "Recife", None, None, &c),
        ]
    }

    #[test]
    fn test_orders_csv_keeps_ids_and_status() {
        let mut buf = Vec::new();
        write_orders(&records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Pedido,Base de entrega,Cidade Destino,Entregador,Recebimento,Status")
        );
        assert_eq!(lines.next(), Some("007,A,Recife,Ana,Assinatura normal,ENTREGUE"));
        assert_eq!(lines.next(), Some("008,A,Recife,,,NÃO ENTREGUE"));
    }

    #[test]
    fn test_report_csv_has_total_row() {
        let reports = build_reports(&records(), &ReportOptions::default());
        let mut buf = Vec::new();
        write_report(&reports.by_base, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Base de entrega,ENTREGUE,NÃO ENTREGUE,NA BASE,TOTAL,TAXA %,Faixa");
        assert_eq!(lines[1], "A,1,1,0,2,50.00,RED");
        assert_eq!(lines[2], "TOTAL GERAL,1,1,0,2,50.00,RED");
    }

    #[test]
    fn test_json_export() {
        let reports = build_reports(&records(), &ReportOptions::default());
        let mut buf = Vec::new();
        write_json(&reports, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["orders"], 2);
        assert_eq!(value["by_courier"]["rows"][0]["key"], "Ana");
        assert_eq!(value["by_courier"]["total"], 1);
    }
}
