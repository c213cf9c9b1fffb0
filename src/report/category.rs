use crate::model::{Amount, Transaction, TransactionKind};
use crate::report::period::DateRange;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much one category contributed to the total of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category_id: String,
    pub name: String,
    pub kind: TransactionKind,
    pub amount: Amount,
    /// Whole percent of the kind's total in the range.
    pub percentage: i64,
}

/// Category shares of a period's income and of its expense.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub income: Vec<CategoryShare>,
    pub expense: Vec<CategoryShare>,
}

impl CategoryReport {
    /// Builds both sides from `transactions` inside `range`.
    pub fn from_transactions(transactions: &[Transaction], range: &DateRange) -> Self {
        Self {
            income: category_breakdown(transactions, range, TransactionKind::Income),
            expense: category_breakdown(transactions, range, TransactionKind::Expense),
        }
    }
}

/// Groups the transactions of `kind` inside `range` by category, largest first.
pub fn category_breakdown(
    transactions: &[Transaction],
    range: &DateRange,
    kind: TransactionKind,
) -> Vec<CategoryShare> {
    let mut groups: BTreeMap<&str, (&str, Decimal)> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == kind)
        .filter(|tx| tx.date.is_some_and(|at| range.contains(at)))
    {
        let entry = groups
            .entry(tx.category_id.as_str())
            .or_insert((tx.category_name(), Decimal::ZERO));
        entry.1 = entry.1.saturating_add(tx.amount.value());
    }

    let grand_total = groups
        .values()
        .map(|(_, sum)| *sum)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let mut shares: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(id, (name, sum))| CategoryShare {
            category_id: id.to_string(),
            name: name.to_string(),
            kind,
            amount: Amount::new(sum),
            percentage: percent_of(sum, grand_total),
        })
        .collect();
    shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    shares
}

fn percent_of(part: Decimal, whole: Decimal) -> i64 {
    if whole.is_zero() {
        return 0;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|p| p.to_i64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_occurred_at, TransactionCategory};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn tx(kind: TransactionKind, category: &str, amount: i64, at: &str) -> Transaction {
        Transaction {
            id: String::new(),
            kind,
            amount: Amount::from(amount),
            date: parse_occurred_at(at),
            category_id: category.to_lowercase(),
            name: "x".to_string(),
            description: None,
            category: Some(TransactionCategory {
                name: category.to_string(),
                kind: None,
            }),
        }
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_breakdown_sorted_with_percentages() {
        let e = TransactionKind::Expense;
        let txs = vec![
            tx(e, "Transportasi", 100_000, "2024-01-03"),
            tx(e, "Operasional", 500_000, "2024-01-05"),
            tx(e, "Transportasi", 150_000, "2024-01-20"),
            tx(e, "Gaji Karyawan", 250_000, "2024-01-25"),
            tx(e, "Operasional", 999_000, "2024-02-01"),
            tx(TransactionKind::Income, "Penjualan Produk", 1_000_000, "2024-01-10"),
        ];
        let shares = category_breakdown(&txs, &january(), e);
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Operasional", "Gaji Karyawan", "Transportasi"]);
        assert_eq!(shares[0].percentage, 50);
        assert_eq!(shares[1].percentage, 25);
        assert_eq!(shares[2].amount, Amount::from(250_000));
        assert_eq!(shares[2].percentage, 25);
    }

    #[test]
    fn test_breakdown_huge_amounts_saturate() {
        let i = TransactionKind::Income;
        let mut txs = vec![
            tx(i, "Penjualan Produk", 0, "2024-01-03"),
            tx(i, "Penjualan Produk", 0, "2024-01-04"),
            tx(i, "Lainnya", 0, "2024-01-05"),
        ];
        for t in &mut txs {
            t.amount = Amount::from_str("70000000000000000000000000000").unwrap();
        }
        let shares = category_breakdown(&txs, &january(), i);
        assert_eq!(shares[0].name, "Penjualan Produk");
        assert_eq!(shares[0].amount, Amount::new(Decimal::MAX));
        assert_eq!(shares[0].percentage, 100);
    }

    #[test]
    fn test_breakdown_empty() {
        let shares = category_breakdown(&[], &january(), TransactionKind::Income);
        assert!(shares.is_empty());
        assert_eq!(percent_of(Decimal::ONE, Decimal::ZERO), 0);
    }
}
