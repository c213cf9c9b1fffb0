use crate::export::ReportDocument;
use crate::format::date_dmy;
use crate::Result;
use anyhow::Context;

const HEADER: [&str; 6] = ["Tanggal", "Nama", "Kategori", "Jenis", "Jumlah", "Keterangan"];

/// One header row and one row per transaction. Amounts are plain numbers so spreadsheets can sum
/// them.
pub(super) fn render(doc: &ReportDocument) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .context("Unable to write the CSV header")?;
    for row in &doc.rows {
        writer
            .write_record([
                date_dmy(row.date),
                row.name.clone(),
                row.category.clone(),
                row.kind.label().to_string(),
                row.amount.value().normalize().to_string(),
                row.description.clone(),
            ])
            .with_context(|| format!("Unable to write the CSV row for '{}'", row.name))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the CSV export: {}", e.error()))
}
