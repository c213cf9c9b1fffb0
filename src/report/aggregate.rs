use crate::model::{Amount, Transaction, TransactionKind};
use crate::report::period::{DateRange, IsoWeekId, Period, Resolved};
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Which transactions a report sums.
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
pub enum KindFilter {
    Income,
    Expense,
    /// Income minus expense.
    #[default]
    Net,
}

serde_plain::derive_display_from_serialize!(KindFilter);
serde_plain::derive_fromstr_from_deserialize!(KindFilter);

impl KindFilter {
    /// The contribution of `tx` under this filter, or `None` if it does not count.
    fn contribution(&self, tx: &Transaction) -> Option<Decimal> {
        match (self, tx.kind) {
            (KindFilter::Income, TransactionKind::Income)
            | (KindFilter::Expense, TransactionKind::Expense) => Some(tx.amount.value()),
            (KindFilter::Net, _) => Some(tx.signed_amount().value()),
            _ => None,
        }
    }
}

impl From<TransactionKind> for KindFilter {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => KindFilter::Income,
            TransactionKind::Expense => KindFilter::Expense,
        }
    }
}

/// The summed amount of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBucket {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub amount: Amount,
}

/// Sums `transactions` into the buckets of `resolved`.
///
/// Every bucket is present in the output, in order, even when nothing falls into it.
/// Transactions without a date or outside every bucket are ignored. Sums saturate at the bounds
/// of `Decimal` instead of overflowing.
pub fn aggregate(
    transactions: &[Transaction],
    resolved: &Resolved,
    filter: KindFilter,
) -> Vec<ReportBucket> {
    let specs = resolved.buckets();
    let mut sums = vec![Decimal::ZERO; specs.len()];
    for tx in transactions {
        let (Some(at), Some(value)) = (tx.date, filter.contribution(tx)) else {
            continue;
        };
        if let Some(i) = specs.iter().position(|b| b.contains(at)) {
            sums[i] = sums[i].saturating_add(value);
        }
    }
    specs
        .iter()
        .zip(sums)
        .map(|(spec, sum)| ReportBucket {
            label: spec.label.clone(),
            start: spec.start,
            end: spec.end,
            amount: Amount::new(sum),
        })
        .collect()
}

/// Sums `transactions` that fall inside `range`, saturating like [`aggregate`].
pub fn total(transactions: &[Transaction], range: &DateRange, filter: KindFilter) -> Amount {
    let sum = transactions
        .iter()
        .filter(|tx| tx.date.is_some_and(|at| range.contains(at)))
        .filter_map(|tx| filter.contribution(tx))
        .fold(Decimal::ZERO, Decimal::saturating_add);
    Amount::new(sum)
}

/// Percentage change from a previous total to a current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub percentage: i64,
    pub is_up: bool,
}

impl Trend {
    /// `(current - previous) / |previous| * 100`, rounded half away from zero.
    ///
    /// A previous total of zero has no meaningful ratio and gives `0%`. The direction is up when
    /// the current total is not below the previous one.
    pub fn between(current: Decimal, previous: Decimal) -> Trend {
        let delta = current.saturating_sub(previous);
        let is_up = delta >= Decimal::ZERO;
        if previous.is_zero() {
            return Trend {
                percentage: 0,
                is_up,
            };
        }
        let percentage = delta
            .checked_div(previous.abs())
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map(|p| p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|p| p.to_i64())
            .unwrap_or_default();
        Trend { percentage, is_up }
    }

    /// E.g. `+50%` or `-12%`.
    pub fn display(&self) -> String {
        if self.percentage > 0 {
            format!("+{}%", self.percentage)
        } else {
            format!("{}%", self.percentage)
        }
    }
}

/// A bucketed report for one period, compared against the period before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub period: Period,
    pub title: String,
    pub range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_week: Option<IsoWeekId>,
    pub filter: KindFilter,
    pub buckets: Vec<ReportBucket>,
    pub total: Amount,
    pub previous_total: Amount,
    pub trend: Trend,
}

/// Builds the report for `resolved`. `transactions` should cover both the resolved range and the
/// range of `resolved.previous()`.
pub fn build_report(transactions: &[Transaction], resolved: &Resolved, filter: KindFilter) -> Report {
    let buckets = aggregate(transactions, resolved, filter);
    let current = total(transactions, resolved.range(), filter);
    let previous = total(transactions, resolved.previous().range(), filter);
    Report {
        period: resolved.period(),
        title: resolved.title(),
        range: *resolved.range(),
        iso_week: resolved.iso_week(),
        filter,
        buckets,
        total: current,
        previous_total: previous,
        trend: Trend::between(current.value(), previous.value()),
    }
}

/// The dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub period: Period,
    pub title: String,
    pub range: DateRange,
    pub income: Amount,
    pub expense: Amount,
    pub balance: Amount,
    pub previous_balance: Amount,
    pub trend: Trend,
}

pub fn summarize(transactions: &[Transaction], resolved: &Resolved) -> Summary {
    let range = resolved.range();
    let income = total(transactions, range, KindFilter::Income);
    let expense = total(transactions, range, KindFilter::Expense);
    let balance = total(transactions, range, KindFilter::Net);
    let previous_balance = total(transactions, resolved.previous().range(), KindFilter::Net);
    Summary {
        period: resolved.period(),
        title: resolved.title(),
        range: *range,
        income,
        expense,
        balance,
        previous_balance,
        trend: Trend::between(balance.value(), previous_balance.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::period::resolve;
    use chrono::NaiveDate;

    fn tx(kind: TransactionKind, amount: i64, at: &str) -> Transaction {
        Transaction {
            id: format!("{kind}-{amount}-{at}"),
            kind,
            amount: Amount::from(amount),
            date: crate::model::parse_occurred_at(at),
            category_id: "cat".to_string(),
            name: "x".to_string(),
            description: None,
            category: None,
        }
    }

    fn income(amount: i64, at: &str) -> Transaction {
        tx(TransactionKind::Income, amount, at)
    }

    fn expense(amount: i64, at: &str) -> Transaction {
        tx(TransactionKind::Expense, amount, at)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let json = r#"[
            {"id":"a","type":"INCOME","amount":"70000000000000000000000000000","date":"2024-01-02"},
            {"id":"b","type":"INCOME","amount":"70000000000000000000000000000","date":"2024-01-02"},
            {"id":"c","type":"EXPENSE","amount":"70000000000000000000000000000","date":"2023-12-02"}
        ]"#;
        let txs: Vec<Transaction> = serde_json::from_str(json).unwrap();
        let resolved = resolve(Period::Monthly, date(2024, 1, 15));

        let report = build_report(&txs, &resolved, KindFilter::Income);
        assert_eq!(report.buckets[1].amount, Amount::new(Decimal::MAX));
        assert_eq!(report.total, Amount::new(Decimal::MAX));

        let summary = summarize(&txs, &resolved);
        assert_eq!(summary.balance, Amount::new(Decimal::MAX));
        assert!(summary.trend.is_up);
    }

    #[test]
    fn test_trend_cases() {
        let d = |n: i64| Decimal::from(n);
        assert_eq!(
            Trend::between(d(0), d(0)),
            Trend {
                percentage: 0,
                is_up: true
            }
        );
        assert_eq!(
            Trend::between(d(150), d(100)),
            Trend {
                percentage: 50,
                is_up: true
            }
        );
        assert_eq!(
            Trend::between(d(50), d(100)),
            Trend {
                percentage: -50,
                is_up: false
            }
        );
        assert_eq!(Trend::between(d(10), d(0)).percentage, 0);
        assert!(Trend::between(d(10), d(0)).is_up);
        assert!(!Trend::between(d(-10), d(0)).is_up);
    }

    #[test]
    fn test_trend_negative_previous_and_rounding() {
        let t = Trend::between(Decimal::from(-50), Decimal::from(-100));
        assert_eq!(t.percentage, 50);
        assert!(t.is_up);
        // 1/8 = 12.5% rounds away from zero.
        assert_eq!(
            Trend::between(Decimal::from(9), Decimal::from(8)).percentage,
            13
        );
        assert_eq!(
            Trend::between(Decimal::from(7), Decimal::from(8)).percentage,
            -13
        );
        assert_eq!(Trend::between(Decimal::from(9), Decimal::from(8)).display(), "+13%");
    }

    #[test]
    fn test_zero_transactions_still_produce_every_bucket() {
        let r = resolve(Period::Weekly, date(2024, 1, 3));
        let buckets = aggregate(&[], &r, KindFilter::Income);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.amount.is_zero()));
    }

    #[test]
    fn test_daily_bands() {
        let r = resolve(Period::Daily, date(2024, 3, 15));
        let txs = vec![
            income(100, "2024-03-15T00:00:00"),
            income(200, "2024-03-15T03:59:59"),
            income(300, "2024-03-15T04:00:00"),
            income(400, "2024-03-15T23:59:59"),
            income(999, "2024-03-16T00:00:00"),
        ];
        let b = aggregate(&txs, &r, KindFilter::Income);
        let amounts: Vec<i64> = b
            .iter()
            .map(|b| b.amount.value().to_i64().unwrap())
            .collect();
        assert_eq!(amounts, vec![300, 300, 0, 0, 0, 400]);
    }

    #[test]
    fn test_out_of_range_and_undated_excluded() {
        let r = resolve(Period::Monthly, date(2024, 1, 15));
        let mut undated = income(5000, "2024-01-10");
        undated.date = None;
        let txs = vec![
            income(1000, "2024-01-01"),
            income(2000, "2023-12-31T23:59:59"),
            income(4000, "2024-02-01"),
            undated,
        ];
        let b = aggregate(&txs, &r, KindFilter::Income);
        assert_eq!(b.len(), 31);
        assert_eq!(b[0].amount, Amount::from(1000));
        let sum: Decimal = b.iter().map(|b| b.amount.value()).sum();
        assert_eq!(sum, Decimal::from(1000));
    }

    #[test]
    fn test_conservation_law() {
        let r = resolve(Period::Weekly, date(2024, 5, 15));
        let txs = vec![
            income(150_000, "2024-05-13T08:00:00"),
            expense(20_000, "2024-05-13T09:00:00"),
            income(75_000, "2024-05-16"),
            expense(5_000, "2024-05-19T23:00:00"),
            income(1_000_000, "2024-05-20"),
            expense(60_000, "2024-05-12"),
        ];
        for filter in [KindFilter::Income, KindFilter::Expense] {
            let bucket_sum: Decimal = aggregate(&txs, &r, filter)
                .iter()
                .map(|b| b.amount.value())
                .sum();
            let expected: Decimal = txs
                .iter()
                .filter(|t| KindFilter::from(t.kind) == filter)
                .filter(|t| r.range().contains(t.date.unwrap()))
                .map(|t| t.amount.value())
                .sum();
            assert_eq!(bucket_sum, expected);
            assert_eq!(total(&txs, r.range(), filter).value(), expected);
        }
        assert_eq!(
            total(&txs, r.range(), KindFilter::Net),
            Amount::from(150_000 - 20_000 + 75_000 - 5_000)
        );
    }

    #[test]
    fn test_build_report_and_summary() {
        let r = resolve(Period::Monthly, date(2024, 2, 10));
        let txs = vec![
            income(300_000, "2024-02-01"),
            expense(100_000, "2024-02-14"),
            income(100_000, "2024-01-20"),
        ];
        let report = build_report(&txs, &r, KindFilter::Income);
        assert_eq!(report.total, Amount::from(300_000));
        assert_eq!(report.previous_total, Amount::from(100_000));
        assert_eq!(report.trend.percentage, 200);
        assert_eq!(report.buckets.len(), 29);

        let s = summarize(&txs, &r);
        assert_eq!(s.income, Amount::from(300_000));
        assert_eq!(s.expense, Amount::from(100_000));
        assert_eq!(s.balance, Amount::from(200_000));
        assert_eq!(s.previous_balance, Amount::from(100_000));
        assert_eq!(s.trend.percentage, 100);
        assert!(s.trend.is_up);
    }
}
