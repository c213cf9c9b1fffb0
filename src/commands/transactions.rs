use crate::api::{Mode, TransactionQuery};
use crate::args::{TxAddArgs, TxListArgs};
use crate::commands::{connect, table, Out};
use crate::format::{date_dmy, rupiah};
use crate::model::{NewTransaction, Transaction};
use crate::{Config, Result};
use tracing::debug;

/// Handles `cuan tx add`. The form is validated before the backend is contacted.
///
/// # Errors
/// - `Validation` if the name or category is blank or the amount is not positive.
/// - `Auth` if nobody is logged in.
pub async fn add_transaction(
    config: &Config,
    mode: Mode,
    args: &TxAddArgs,
) -> Result<Out<Transaction>> {
    let new = NewTransaction {
        kind: args.kind(),
        amount: args.amount(),
        date: args
            .date()
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        category_id: args.category_id().trim().to_string(),
        name: args.name().trim().to_string(),
        description: args
            .description()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    };
    new.validate()?;

    let (backend, session) = connect(config, mode).await?;
    let created = backend.create_transaction(&session, &new).await?;
    Ok(Out::new(
        format!(
            "{} '{}' sebesar {} tersimpan",
            created.kind.label(),
            created.name,
            rupiah(created.amount.value())
        ),
        created,
    ))
}

/// Handles `cuan tx list`. Kind and dates are filtered by the backend, `--search` locally by a
/// case-insensitive match on the name.
pub async fn list_transactions(
    config: &Config,
    mode: Mode,
    args: &TxListArgs,
) -> Result<Out<Vec<Transaction>>> {
    let search = args
        .search()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let mut query = TransactionQuery::new()
        .kind(args.kind())
        .start(args.start())
        .end(args.end());
    // With a search the limit applies to the matches, not to what the backend returns.
    if search.is_none() {
        query = query.limit(args.limit());
    }

    let (backend, session) = connect(config, mode).await?;
    let mut transactions = backend.transactions(&session, &query).await?;
    debug!("Backend returned {} transactions", transactions.len());
    if let Some(search) = &search {
        transactions.retain(|t| t.name.to_lowercase().contains(search.as_str()));
    }
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = args.limit() {
        transactions.truncate(limit as usize);
    }

    if transactions.is_empty() {
        return Ok(Out::new("Tidak ada transaksi", transactions));
    }
    let rows: Vec<[String; 5]> = transactions
        .iter()
        .map(|t| {
            [
                date_dmy(t.date.map(|d| d.date())),
                t.name.clone(),
                t.category_name().to_string(),
                t.kind.label().to_string(),
                rupiah(t.amount.value()),
            ]
        })
        .collect();
    Ok(Out::new(
        table(["Tanggal", "Nama", "Kategori", "Jenis", "Jumlah"], &rows),
        transactions,
    ))
}
