//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{default_categories, Category, NewCategory};
pub use transaction::{NewTransaction, Transaction, TransactionCategory};
pub(crate) use transaction::parse_occurred_at;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Whether money came in or went out. On the wire this is `"INCOME"` or `"EXPENSE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
        }
    }

    /// The label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Pemasukan",
            TransactionKind::Expense => "Pengeluaran",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    /// Case-insensitive; also accepts the Indonesian labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(TransactionKind::Income),
            "expense" | "pengeluaran" => Ok(TransactionKind::Expense),
            bad => bail!("Invalid transaction type '{bad}', expected income or expense"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_string(&TransactionKind::Expense).unwrap();
        assert_eq!(json, "\"EXPENSE\"");
        let kind: TransactionKind = serde_json::from_str("\"INCOME\"").unwrap();
        assert_eq!(kind, TransactionKind::Income);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            TransactionKind::from_str("Income").unwrap(),
            TransactionKind::Income
        );
        assert_eq!(
            TransactionKind::from_str("pengeluaran").unwrap(),
            TransactionKind::Expense
        );
        assert!(TransactionKind::from_str("transfer").is_err());
    }
}
