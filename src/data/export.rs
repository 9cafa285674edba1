use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{SalesRecord, SalesTable, DATE_FORMAT};

/// Column headers, in the order the sample data uses.
const HEADERS: [&str; 6] = [
    "Date",
    "Sales Person",
    "Country",
    "Product",
    "Amount",
    "Boxes Shipped",
];

/// Row shape written by both exporters.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Sales Person")]
    sales_person: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Product")]
    product: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Boxes Shipped")]
    boxes_shipped: u64,
}

impl<'a> From<&'a SalesRecord> for ExportRow<'a> {
    fn from(rec: &'a SalesRecord) -> Self {
        ExportRow {
            date: rec.date.format(DATE_FORMAT).to_string(),
            sales_person: &rec.sales_person,
            country: &rec.country,
            product: &rec.product,
            amount: format!("{:.2}", rec.amount),
            boxes_shipped: rec.boxes_shipped,
        }
    }
}

fn export_rows<'a>(table: &'a SalesTable, rows: &'a [usize]) -> impl Iterator<Item = ExportRow<'a>> {
    rows.iter().map(move |&i| ExportRow::from(&table.records[i]))
}

/// Write the given table rows, in order, as CSV.
pub fn export_csv(path: &Path, table: &SalesTable, rows: &[usize]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context("creating CSV file")?;
    // Explicit header so an empty selection still produces a loadable file.
    writer.write_record(HEADERS).context("writing CSV header")?;
    for row in export_rows(table, rows) {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write the given table rows, in order, as a records-oriented JSON array.
pub fn export_json(path: &Path, table: &SalesTable, rows: &[usize]) -> Result<()> {
    let records: Vec<ExportRow<'_>> = export_rows(table, rows).collect();
    let file = std::fs::File::create(path).context("creating JSON file")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &records).context("writing JSON")?;
    writer.flush().context("flushing JSON file")?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::tests::scenario_table;

    #[test]
    fn csv_export_reloads_to_the_same_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = scenario_table();

        export_csv(&path, &table, &[2, 0]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Sales Person,Country,Product,Amount,Boxes Shipped\n"));
        assert!(text.contains("03/01/2023,C,CA,Y,5.00,1"));

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.records, vec![table.records[2].clone(), table.records[0].clone()]);
    }

    #[test]
    fn json_export_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let table = scenario_table();

        export_json(&path, &table, &[1]).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.records, vec![table.records[1].clone()]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_failures_are_reported() {
        let full = Path::new("/dev/full");
        let table = scenario_table();
        assert!(export_json(full, &table, &[0, 1, 2]).is_err());
        assert!(export_csv(full, &table, &[0, 1, 2]).is_err());
    }

    #[test]
    fn empty_selection_writes_header_only_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_csv(&path, &scenario_table(), &[]).unwrap();
        assert!(load_file(&path).unwrap().is_empty());
    }
}
