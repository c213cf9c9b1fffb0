use crate::model::TransactionKind;
use crate::validate;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A transaction category owned by the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// The body of a create-category request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::required(&self.name, "Nama kategori")
    }
}

const DEFAULT_INCOME: [&str; 5] = [
    "Penjualan Produk",
    "Investasi Masuk",
    "Biaya Konsultasi",
    "Pendapatan Sewa",
    "Lainnya",
];

const DEFAULT_EXPENSE: [&str; 5] = [
    "Operasional",
    "Gaji Karyawan",
    "Transportasi",
    "Pembelian Kebutuhan",
    "Lainnya",
];

/// The starter categories offered to a new account, income first.
pub fn default_categories() -> Vec<NewCategory> {
    DEFAULT_INCOME
        .iter()
        .map(|n| NewCategory::new(*n, TransactionKind::Income))
        .chain(
            DEFAULT_EXPENSE
                .iter()
                .map(|n| NewCategory::new(*n, TransactionKind::Expense)),
        )
        .collect()
}
