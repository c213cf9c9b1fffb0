use crate::model::{Amount, TransactionKind};
use crate::validate;
use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A transaction as returned by the backend. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub amount: Amount,
    /// When the transaction happened. `None` if the backend sent a date we could not read, in
    /// which case the transaction never lands in a report bucket.
    #[serde(
        default,
        deserialize_with = "deserialize_occurred_at",
        serialize_with = "serialize_occurred_at"
    )]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TransactionCategory>,
}

impl Transaction {
    /// The category's display name, falling back to its id.
    pub fn category_name(&self) -> &str {
        match &self.category {
            Some(c) if !c.name.is_empty() => &c.name,
            _ => &self.category_id,
        }
    }

    /// The amount with the sign of its kind: income positive, expense negative.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => Amount::new(-self.amount.value()),
        }
    }
}

/// The category summary the backend embeds in each transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// The transaction form. Validated before it is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub category_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTransaction {
    /// Checks the form the way the transaction screen does before submitting.
    pub fn validate(&self) -> Result<()> {
        validate::required(&self.name, "Nama transaksi")?;
        validate::required(&self.category_id, "Kategori")?;
        validate::positive_amount(self.amount)?;
        Ok(())
    }
}

/// Parses the date formats the backend is known to send: RFC 3339 timestamps, naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps and bare `YYYY-MM-DD` dates.
pub(crate) fn parse_occurred_at(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn deserialize_occurred_at<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_occurred_at(&s),
        _ => None,
    })
}

fn serialize_occurred_at<S>(value: &Option<NaiveDateTime>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_date<S>(value: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format("%Y-%m-%d").to_string())
}
