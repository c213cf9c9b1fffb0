//! The remote data client.
//!
//! All backend access goes through the `Backend` trait. `HttpBackend` talks to the real REST
//! service; `TestBackend` keeps everything in memory so the whole app can run top-to-bottom without
//! a server. Which one is used is decided by `Mode`.

mod http;
mod test_backend;
mod wire;

pub use http::HttpBackend;
pub use test_backend::{TestBackend, DEMO_EMAIL, DEMO_PASSWORD};

use crate::model::{Category, NewCategory, NewTransaction, Transaction, TransactionKind};
use crate::report::{CategoryReport, DateRange, Period, Resolved};
use crate::session::Session;
use crate::{Config, Result};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

/// Setting this environment variable to a non-empty value selects `Mode::Test`.
pub const TEST_MODE_ENV: &str = "CUANBOOK_IN_TEST_MODE";

/// Selects the `Backend` implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `CUANBOOK_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Filters for `GET /transactions`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    kind: Option<TransactionKind>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    limit: Option<u32>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<Option<TransactionKind>>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn start(mut self, start: impl Into<Option<NaiveDate>>) -> Self {
        self.start = start.into();
        self
    }

    pub fn end(mut self, end: impl Into<Option<NaiveDate>>) -> Self {
        self.end = end.into();
        self
    }

    /// Both ends of `range`, inclusive.
    pub fn range(self, range: &DateRange) -> Self {
        self.start(range.start()).end(range.end())
    }

    pub fn limit(mut self, limit: impl Into<Option<u32>>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Query string pairs in the backend's naming.
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(kind) = self.kind {
            pairs.push(("type", kind.as_wire_str().to_string()));
        }
        if let Some(start) = self.start {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Whether `tx` passes the kind and date filters. Undated transactions only pass when no date
    /// filter is set.
    pub(crate) fn matches(&self, tx: &Transaction) -> bool {
        if self.kind.is_some_and(|k| k != tx.kind) {
            return false;
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(day) = tx.date.map(|d| d.date()) else {
            return false;
        };
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }

    pub(crate) fn max_results(&self) -> Option<usize> {
        self.limit.map(|l| l as usize)
    }
}

/// Operations offered by the CuanBook backend.
///
/// Methods take `&self` so one backend can serve overlapping requests, e.g. when the user switches
/// the report period before the previous fetch has returned.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    async fn register(&self, email: &str, password: &str) -> Result<()>;

    async fn transactions(
        &self,
        session: &Session,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>>;

    async fn create_transaction(
        &self,
        session: &Session,
        transaction: &NewTransaction,
    ) -> Result<Transaction>;

    /// Lists the user's categories, optionally only those of one kind.
    async fn categories(
        &self,
        session: &Session,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>>;

    async fn create_category(&self, session: &Session, category: &NewCategory)
        -> Result<Category>;

    /// The backend's category analysis for the period `resolved`: each category's share of the
    /// income and of the expense.
    async fn category_report(&self, session: &Session, resolved: &Resolved)
        -> Result<CategoryReport>;
}

/// The path and query of the backend's category report for `resolved`. The backend serves daily,
/// weekly and monthly reports only, so a yearly period gives `None`.
pub(crate) fn category_report_endpoint(
    resolved: &Resolved,
) -> Option<(&'static str, Vec<(&'static str, String)>)> {
    let day = resolved.reference();
    match resolved.period() {
        Period::Daily => Some((
            "reports/daily/categories",
            vec![("date", day.format("%Y-%m-%d").to_string())],
        )),
        Period::Weekly => {
            let week = resolved.iso_week()?;
            Some((
                "reports/weekly/categories",
                vec![
                    ("year", week.year.to_string()),
                    ("week", week.week.to_string()),
                ],
            ))
        }
        Period::Monthly => Some((
            "reports/monthly/categories",
            vec![
                ("year", day.year().to_string()),
                ("month", day.month().to_string()),
            ],
        )),
        Period::Yearly => None,
    }
}

/// Creates the backend selected by `mode` for the API URL in `config`.
pub fn backend(config: &Config, mode: Mode) -> Result<Arc<dyn Backend>> {
    Ok(match mode {
        Mode::Http => Arc::new(HttpBackend::new(config.api_url().clone(), config.timeout())?),
        Mode::Test => Arc::new(TestBackend::shared(config.api_url().as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_occurred_at;
    use crate::model::Amount;

    fn tx(kind: TransactionKind, at: Option<&str>) -> Transaction {
        Transaction {
            id: "t".to_string(),
            kind,
            amount: Amount::from(1),
            date: at.and_then(parse_occurred_at),
            category_id: String::new(),
            name: String::new(),
            description: None,
            category: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_pairs() {
        let q = TransactionQuery::new()
            .kind(TransactionKind::Expense)
            .range(&DateRange::new(date(2024, 1, 1), date(2024, 1, 31)))
            .limit(5);
        assert_eq!(
            q.to_pairs(),
            vec![
                ("type", "EXPENSE".to_string()),
                ("startDate", "2024-01-01".to_string()),
                ("endDate", "2024-01-31".to_string()),
                ("limit", "5".to_string()),
            ]
        );
        assert!(TransactionQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn test_query_matches() {
        let q = TransactionQuery::new()
            .start(date(2024, 1, 1))
            .end(date(2024, 1, 31));
        assert!(q.matches(&tx(TransactionKind::Income, Some("2024-01-31T23:00:00"))));
        assert!(!q.matches(&tx(TransactionKind::Income, Some("2024-02-01"))));
        assert!(!q.matches(&tx(TransactionKind::Income, None)));
        assert!(TransactionQuery::new().matches(&tx(TransactionKind::Income, None)));
        let q = q.kind(TransactionKind::Expense);
        assert!(!q.matches(&tx(TransactionKind::Income, Some("2024-01-10"))));
    }

    #[test]
    fn test_category_report_endpoint() {
        use crate::report::resolve;

        let (path, pairs) =
            category_report_endpoint(&resolve(Period::Weekly, date(2024, 1, 3))).unwrap();
        assert_eq!(path, "reports/weekly/categories");
        assert_eq!(
            pairs,
            vec![("year", "2024".to_string()), ("week", "1".to_string())]
        );

        // 2024-12-30 belongs to ISO week 1 of 2025.
        let (_, pairs) =
            category_report_endpoint(&resolve(Period::Weekly, date(2024, 12, 30))).unwrap();
        assert_eq!(pairs[0], ("year", "2025".to_string()));

        let (path, pairs) =
            category_report_endpoint(&resolve(Period::Daily, date(2024, 2, 9))).unwrap();
        assert_eq!(path, "reports/daily/categories");
        assert_eq!(pairs, vec![("date", "2024-02-09".to_string())]);

        let (_, pairs) =
            category_report_endpoint(&resolve(Period::Monthly, date(2024, 2, 9))).unwrap();
        assert_eq!(
            pairs,
            vec![("year", "2024".to_string()), ("month", "2".to_string())]
        );

        assert!(category_report_endpoint(&resolve(Period::Yearly, date(2024, 2, 9))).is_none());
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(Mode::default(), Mode::Http);
    }
}
