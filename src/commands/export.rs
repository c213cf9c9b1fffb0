use crate::api::{Mode, TransactionQuery};
use crate::args::ExportArgs;
use crate::commands::{connect, Out};
use crate::export::ReportDocument;
use crate::report::resolve;
use crate::{Config, Result};
use std::path::PathBuf;
use tracing::debug;

/// Handles `cuan export`: writes the selected period's report, headed with the business profile,
/// as a PDF or CSV file.
///
/// The file goes to `--out` when given, otherwise to a dated file name in the exports directory.
pub async fn export(config: &Config, mode: Mode, args: &ExportArgs) -> Result<Out<PathBuf>> {
    let resolved = resolve(args.period().period(), args.period().reference());
    let profile = config.profile_store().load().await?;
    let (backend, session) = connect(config, mode).await?;
    let transactions = backend
        .transactions(&session, &TransactionQuery::new().range(resolved.range()))
        .await?;
    debug!(
        "Exporting {} transactions for {}",
        transactions.len(),
        resolved.title()
    );

    let document = ReportDocument::new(&profile, &resolved, &transactions);
    let path = match args.out() {
        Some(out) => out.to_path_buf(),
        None => config
            .exports()
            .join(document.default_file_name(args.format())),
    };
    document.write(args.format(), &path).await?;
    Ok(Out::new(
        format!(
            "Laporan {} ({} transaksi) disimpan ke '{}'",
            document.period_title,
            document.rows.len(),
            path.display()
        ),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::PeriodArgs;
    use crate::export::ExportFormat;
    use crate::profile::Profile;
    use crate::report::Period;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn january() -> PeriodArgs {
        PeriodArgs::new(Period::Monthly, NaiveDate::from_ymd_opt(2024, 1, 20))
    }

    #[tokio::test]
    async fn test_export_csv_to_exports_dir() {
        let env = TestEnv::logged_in().await;
        let args = ExportArgs::new(january(), ExportFormat::Csv, None);
        let out = export(env.config(), env.mode(), &args).await.unwrap();
        let path = out.structure().unwrap();
        assert_eq!(
            path,
            &env.config()
                .exports()
                .join("laporan-keuangan-2024-01-01-2024-01-31.csv")
        );
        let text = std::fs::read_to_string(path).unwrap();
        // Header plus the eleven January transactions.
        assert_eq!(text.lines().count(), 12);
        assert!(text.contains("02/01/2024,Penjualan Kopi Bubuk,Penjualan Produk,Pemasukan,2500000"));
    }

    #[tokio::test]
    async fn test_export_pdf_with_profile() {
        let env = TestEnv::logged_in().await;
        env.config()
            .profile_store()
            .save(&Profile {
                business_name: "Kopi Senja".to_string(),
                ..Profile::default()
            })
            .await
            .unwrap();
        let target = env.config().root().join("out").join("januari.pdf");
        let args = ExportArgs::new(january(), ExportFormat::Pdf, Some(target.clone()));
        let out = export(env.config(), env.mode(), &args).await.unwrap();
        assert_eq!(out.structure(), Some(&target));
        assert!(std::fs::read(&target).unwrap().starts_with(b"%PDF"));
        assert!(out.message().contains("11 transaksi"));
    }
}
