//! Exported reports.
//!
//! A `ReportDocument` is the tabular content of a report: a header, the period totals and one row
//! per transaction. It can be rendered as a PDF or as CSV.

mod csv_export;
mod pdf;

use crate::error::{ErrorType, IntoResult};
use crate::format::{date_dmy, rupiah};
use crate::model::{Amount, Transaction, TransactionKind};
use crate::profile::Profile;
use crate::report::{summarize, DateRange, Resolved};
use crate::{utils, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const REPORT_TITLE: &str = "Laporan Keuangan";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }
}

/// One transaction line of the report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: Option<NaiveDate>,
    pub name: String,
    pub category: String,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
}

impl ReportRow {
    fn from_transaction(tx: &Transaction) -> Self {
        Self {
            date: tx.date.map(|d| d.date()),
            name: tx.name.clone(),
            category: tx.category_name().to_string(),
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    /// The business name from the profile, if one has been set.
    pub subtitle: Option<String>,
    pub period_title: String,
    pub range: DateRange,
    /// Label and formatted value, e.g. `("Saldo", "Rp 50.000")`.
    pub summary: Vec<(String, String)>,
    /// In chronological order.
    pub rows: Vec<ReportRow>,
}

impl ReportDocument {
    /// Builds the document for the transactions of `transactions` that fall inside `resolved`.
    pub fn new(profile: &Profile, resolved: &Resolved, transactions: &[Transaction]) -> Self {
        let summary = summarize(transactions, resolved);
        let mut in_range: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.date.is_some_and(|at| resolved.range().contains(at)))
            .collect();
        in_range.sort_by(|a, b| a.date.cmp(&b.date));

        let business = profile.business_name.trim();
        Self {
            title: REPORT_TITLE.to_string(),
            subtitle: (!business.is_empty()).then(|| business.to_string()),
            period_title: resolved.title(),
            range: *resolved.range(),
            summary: vec![
                ("Total Pemasukan".to_string(), rupiah(summary.income.value())),
                (
                    "Total Pengeluaran".to_string(),
                    rupiah(summary.expense.value()),
                ),
                ("Saldo".to_string(), rupiah(summary.balance.value())),
            ],
            rows: in_range
                .into_iter()
                .map(ReportRow::from_transaction)
                .collect(),
        }
    }

    /// E.g. `Periode: Januari 2024 (01/01/2024 - 31/01/2024)`.
    pub fn period_line(&self) -> String {
        format!(
            "Periode: {} ({} - {})",
            self.period_title,
            date_dmy(Some(self.range.start())),
            date_dmy(Some(self.range.end()))
        )
    }

    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let rendered = match format {
            ExportFormat::Pdf => pdf::render(self),
            ExportFormat::Csv => csv_export::render(self),
        };
        rendered.pub_result(ErrorType::Export)
    }

    /// Renders the document and writes it to `path`.
    pub async fn write(&self, format: ExportFormat, path: &Path) -> Result<()> {
        let bytes = self.render(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent).await.pub_result(ErrorType::Io)?;
        }
        utils::write(path, &bytes).await.pub_result(ErrorType::Io)?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// A file name like `laporan-keuangan-2024-01-01-2024-01-31.pdf`.
    pub fn default_file_name(&self, format: ExportFormat) -> String {
        format!(
            "laporan-keuangan-{}-{}.{}",
            self.range.start().format("%Y-%m-%d"),
            self.range.end().format("%Y-%m-%d"),
            format.extension()
        )
    }
}
