//! Reporting command handlers: `cuan summary`, `cuan report` and `cuan breakdown`.
//!
//! Everything is computed locally from the transactions of the selected period (and the period
//! before it, for trends). `cuan breakdown --server` reads the backend's category report instead.

use crate::api::{Mode, TransactionQuery};
use crate::args::{BreakdownArgs, PeriodArgs, ReportArgs};
use crate::commands::{connect, table, Out};
use crate::dashboard::{fetch_period, Dashboard, DashboardView};
use crate::format::{date_dmy, day_month, rupiah};
use crate::model::TransactionKind;
use crate::report::{
    build_report, resolve, CategoryReport, CategoryShare, DateRange, KindFilter, Report, Trend,
};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use tracing::debug;

fn range_line(title: &str, range: &DateRange) -> String {
    format!(
        "{title} ({} - {})",
        date_dmy(Some(range.start())),
        date_dmy(Some(range.end()))
    )
}

fn trend_line(trend: &Trend) -> String {
    let arrow = if trend.is_up { "naik" } else { "turun" };
    format!("{} ({arrow}) dibanding periode sebelumnya", trend.display())
}

/// Handles `cuan summary`: the dashboard cards plus the latest transactions of the period.
pub async fn summary(config: &Config, mode: Mode, args: &PeriodArgs) -> Result<Out<DashboardView>> {
    let (backend, session) = connect(config, mode).await?;
    let dashboard = Dashboard::new(backend, session, KindFilter::Net);
    dashboard.select(args.period(), args.reference()).await?;
    let view = dashboard
        .view()
        .await
        .context("The dashboard has nothing to show")?;

    let s = &view.summary;
    let mut lines = vec![
        range_line(&s.title, &s.range),
        format!("Pemasukan    {}", rupiah(s.income.value())),
        format!("Pengeluaran  {}", rupiah(s.expense.value())),
        format!("Saldo        {}", rupiah(s.balance.value())),
        format!("Tren         {}", trend_line(&s.trend)),
    ];
    if !view.recent.is_empty() {
        let rows: Vec<[String; 3]> = view
            .recent
            .iter()
            .map(|t| {
                let amount = match t.kind {
                    TransactionKind::Income => format!("+{}", rupiah(t.amount.value())),
                    TransactionKind::Expense => format!("-{}", rupiah(t.amount.value())),
                };
                [day_month(t.date.map(|d| d.date())), t.name.clone(), amount]
            })
            .collect();
        lines.push(String::new());
        lines.push("Transaksi terakhir".to_string());
        lines.push(table(["Tanggal", "Nama", "Jumlah"], &rows));
    }
    Ok(Out::new(lines.join("\n"), view))
}

fn report_text(report: &Report) -> String {
    let rows: Vec<[String; 2]> = report
        .buckets
        .iter()
        .map(|b| [b.label.clone(), rupiah(b.amount.value())])
        .collect();
    let heading = match report.iso_week {
        Some(week) => format!(
            "{} (ISO {}-W{:02})",
            range_line(&report.title, &report.range),
            week.year,
            week.week
        ),
        None => range_line(&report.title, &report.range),
    };
    [
        heading,
        table(["Periode", "Jumlah"], &rows),
        format!("Total ({})  {}", report.filter, rupiah(report.total.value())),
        format!("Periode sebelumnya  {}", rupiah(report.previous_total.value())),
        format!("Tren  {}", trend_line(&report.trend)),
    ]
    .join("\n")
}

/// Handles `cuan report`: one row per bucket of the period, then the totals and the trend.
pub async fn report(config: &Config, mode: Mode, args: &ReportArgs) -> Result<Out<Report>> {
    let resolved = resolve(args.period().period(), args.period().reference());
    let (backend, session) = connect(config, mode).await?;
    let transactions = fetch_period(backend.as_ref(), &session, &resolved).await?;
    let report = build_report(&transactions, &resolved, args.kind());
    let message = if args.json() {
        serde_json::to_string_pretty(&report).context("Unable to serialize the report")?
    } else {
        report_text(&report)
    };
    Ok(Out::new(message, report))
}

/// Each category's share of a period's income and of its expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub title: String,
    pub range: DateRange,
    pub income: Vec<CategoryShare>,
    pub expense: Vec<CategoryShare>,
}

fn share_table(shares: &[CategoryShare]) -> String {
    if shares.is_empty() {
        return "Tidak ada transaksi".to_string();
    }
    let rows: Vec<[String; 3]> = shares
        .iter()
        .map(|s| {
            [
                s.name.clone(),
                rupiah(s.amount.value()),
                format!("{}%", s.percentage),
            ]
        })
        .collect();
    table(["Kategori", "Jumlah", "Persen"], &rows)
}

/// Handles `cuan breakdown`.
pub async fn breakdown(
    config: &Config,
    mode: Mode,
    args: &BreakdownArgs,
) -> Result<Out<Breakdown>> {
    let resolved = resolve(args.period().period(), args.period().reference());
    let range = *resolved.range();
    let (backend, session) = connect(config, mode).await?;
    let report = if args.server() {
        debug!("Reading the {} category report from the backend", resolved.period());
        backend.category_report(&session, &resolved).await?
    } else {
        let transactions = backend
            .transactions(&session, &TransactionQuery::new().range(&range))
            .await?;
        CategoryReport::from_transactions(&transactions, &range)
    };

    let breakdown = Breakdown {
        title: resolved.title(),
        range,
        income: report.income,
        expense: report.expense,
    };
    let message = if args.json() {
        serde_json::to_string_pretty(&breakdown).context("Unable to serialize the breakdown")?
    } else {
        [
            range_line(&breakdown.title, &breakdown.range),
            String::new(),
            TransactionKind::Income.label().to_string(),
            share_table(&breakdown.income),
            String::new(),
            TransactionKind::Expense.label().to_string(),
            share_table(&breakdown.expense),
        ]
        .join("\n")
    };
    Ok(Out::new(message, breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::report::Period;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn january() -> PeriodArgs {
        PeriodArgs::new(Period::Monthly, NaiveDate::from_ymd_opt(2024, 1, 20))
    }

    fn february() -> PeriodArgs {
        PeriodArgs::new(Period::Monthly, NaiveDate::from_ymd_opt(2024, 2, 10))
    }

    #[tokio::test]
    async fn test_summary_cards() {
        let env = TestEnv::logged_in().await;
        let out = summary(env.config(), env.mode(), &february()).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.summary.balance, Amount::from(50_000));
        assert_eq!(view.summary.previous_balance, Amount::from(7_020_000));
        assert_eq!(view.summary.trend.percentage, -99);
        assert!(!view.summary.trend.is_up);
        assert!(out.message().starts_with("Februari 2024 (01/02/2024 - 29/02/2024)"));
        assert!(out.message().contains("Saldo        Rp 50.000"));
    }

    #[tokio::test]
    async fn test_report_expense_weekly() {
        let env = TestEnv::logged_in().await;
        let args = ReportArgs::new(
            PeriodArgs::new(Period::Weekly, NaiveDate::from_ymd_opt(2024, 1, 3)),
            KindFilter::Expense,
            false,
        );
        let out = report(env.config(), env.mode(), &args).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.buckets.len(), 7);
        assert_eq!(report.buckets[1].amount, Amount::from(350_000));
        assert_eq!(report.buckets[2].amount, Amount::from(75_000));
        assert_eq!(report.total, Amount::from(3_425_000));
        // Nothing was recorded the week before.
        assert_eq!(report.previous_total, Amount::ZERO);
        assert_eq!(report.trend.percentage, 0);
        assert!(out.message().contains("ISO 2024-W01"));
    }

    #[tokio::test]
    async fn test_report_json() {
        let env = TestEnv::logged_in().await;
        let args = ReportArgs::new(january(), KindFilter::Income, true);
        let out = report(env.config(), env.mode(), &args).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(out.message()).unwrap();
        assert_eq!(value["filter"], "income");
        assert_eq!(value["buckets"].as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn test_breakdown_shares() {
        let env = TestEnv::logged_in().await;
        let out = breakdown(env.config(), env.mode(), &BreakdownArgs::new(february(), false, false))
            .await
            .unwrap();
        let breakdown = out.structure().unwrap();
        assert_eq!(breakdown.income.len(), 2);
        assert_eq!(breakdown.income[0].name, "Penjualan Produk");
        assert_eq!(breakdown.income[0].amount, Amount::from(3_100_000));
        assert_eq!(breakdown.income[0].percentage, 89);
        assert_eq!(breakdown.expense[0].name, "Gaji Karyawan");
        assert!(out.message().contains("Pengeluaran"));
    }

    #[tokio::test]
    async fn test_breakdown_from_backend_matches_local() {
        let env = TestEnv::logged_in().await;
        for period in [
            PeriodArgs::new(Period::Weekly, NaiveDate::from_ymd_opt(2024, 1, 3)),
            january(),
            february(),
        ] {
            let local = breakdown(
                env.config(),
                env.mode(),
                &BreakdownArgs::new(period.clone(), false, false),
            )
            .await
            .unwrap();
            let remote = breakdown(
                env.config(),
                env.mode(),
                &BreakdownArgs::new(period, true, false),
            )
            .await
            .unwrap();
            assert_eq!(local.structure(), remote.structure());
            assert_eq!(local.message(), remote.message());
        }
    }
}
