//! Request and response bodies of the REST backend that do not map one-to-one onto model types.

use crate::model::{Amount, Category, Transaction, TransactionKind};
use crate::report::{CategoryReport, CategoryShare};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(super) struct Credentials<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct LoginResponse {
    #[serde(default)]
    pub(super) token: Option<String>,
}

/// Error bodies carry a human readable `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: Option<String>,
}

/// `GET /transactions` has been seen to return both shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum TransactionList {
    Bare(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

impl From<TransactionList> for Vec<Transaction> {
    fn from(list: TransactionList) -> Self {
        match list {
            TransactionList::Bare(v) | TransactionList::Wrapped { transactions: v } => v,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CategoryList {
    #[serde(default)]
    pub(super) categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum CreatedTransaction {
    Wrapped { transaction: Transaction },
    Bare(Transaction),
}

impl From<CreatedTransaction> for Transaction {
    fn from(created: CreatedTransaction) -> Self {
        match created {
            CreatedTransaction::Wrapped { transaction } | CreatedTransaction::Bare(transaction) => {
                transaction
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum CreatedCategory {
    Wrapped { category: Category },
    Bare(Category),
}

impl From<CreatedCategory> for Category {
    fn from(created: CreatedCategory) -> Self {
        match created {
            CreatedCategory::Wrapped { category } | CreatedCategory::Bare(category) => category,
        }
    }
}

/// One row of `GET /reports/{daily,weekly,monthly}/categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CategorySummary {
    #[serde(default)]
    pub(super) category_id: String,
    #[serde(default)]
    pub(super) category_name: String,
    #[serde(default)]
    pub(super) amount: Amount,
    #[serde(default)]
    pub(super) percentage: f64,
    #[serde(rename = "type")]
    pub(super) kind: TransactionKind,
}

impl From<CategorySummary> for CategoryShare {
    fn from(row: CategorySummary) -> Self {
        let percentage = if row.percentage.is_finite() {
            row.percentage.round() as i64
        } else {
            0
        };
        CategoryShare {
            category_id: row.category_id,
            name: row.category_name,
            kind: row.kind,
            amount: row.amount,
            percentage,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct CategoryReportBody {
    #[serde(default)]
    pub(super) income: Vec<CategorySummary>,
    #[serde(default)]
    pub(super) expense: Vec<CategorySummary>,
}

impl From<CategoryReportBody> for CategoryReport {
    fn from(body: CategoryReportBody) -> Self {
        let shares = |rows: Vec<CategorySummary>| {
            let mut shares: Vec<CategoryShare> = rows.into_iter().map(CategoryShare::from).collect();
            shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
            shares
        };
        CategoryReport {
            income: shares(body.income),
            expense: shares(body.expense),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_list_shapes() {
        let bare = r#"[{"id":"1","type":"INCOME","amount":10,"date":"2024-01-01"}]"#;
        let wrapped = r#"{"transactions":[{"id":"1","type":"INCOME","amount":10,"date":"2024-01-01"}]}"#;
        let a: Vec<Transaction> = serde_json::from_str::<TransactionList>(bare).unwrap().into();
        let b: Vec<Transaction> = serde_json::from_str::<TransactionList>(wrapped)
            .unwrap()
            .into();
        assert_eq!(a, b);
        assert_eq!(a[0].kind, TransactionKind::Income);
    }

    #[test]
    fn test_created_category_shapes() {
        let bare = r#"{"id":"c1","name":"Gaji","type":"EXPENSE"}"#;
        let wrapped = r#"{"category":{"id":"c1","name":"Gaji","type":"EXPENSE"}}"#;
        let a: Category = serde_json::from_str::<CreatedCategory>(bare).unwrap().into();
        let b: Category = serde_json::from_str::<CreatedCategory>(wrapped).unwrap().into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_category_report_body() {
        let body = r#"{
            "income": [
                {"categoryId":"c2","categoryName":"Sewa","amount":1500000,"percentage":29.4,"type":"INCOME"},
                {"categoryId":"c1","categoryName":"Penjualan Produk","amount":"3600000","percentage":70.6,"type":"INCOME"}
            ]
        }"#;
        let report: CategoryReport = serde_json::from_str::<CategoryReportBody>(body)
            .unwrap()
            .into();
        assert!(report.expense.is_empty());
        assert_eq!(report.income.len(), 2);
        // Largest first, whatever order the backend sent.
        assert_eq!(report.income[0].name, "Penjualan Produk");
        assert_eq!(report.income[0].amount, Amount::from(3_600_000));
        assert_eq!(report.income[0].percentage, 71);
        assert_eq!(report.income[1].percentage, 29);
        assert_eq!(report.income[1].kind, TransactionKind::Income);
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
    }
}
