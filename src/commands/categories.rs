use crate::api::Mode;
use crate::commands::{connect, table, Out};
use crate::model::{default_categories, Category, NewCategory, TransactionKind};
use crate::{Config, Result};
use anyhow::Context;
use tracing::{debug, info};

fn category_table(categories: &[Category]) -> String {
    let rows: Vec<[String; 3]> = categories
        .iter()
        .map(|c| [c.id.clone(), c.name.clone(), c.kind.label().to_string()])
        .collect();
    table(["ID", "Nama", "Jenis"], &rows)
}

/// Handles `cuan categories list`.
pub async fn list_categories(
    config: &Config,
    mode: Mode,
    kind: Option<TransactionKind>,
) -> Result<Out<Vec<Category>>> {
    let (backend, session) = connect(config, mode).await?;
    let categories = backend.categories(&session, kind).await?;
    if categories.is_empty() {
        return Ok(Out::new(
            "Belum ada kategori. Jalankan 'cuan categories setup' untuk membuat kategori awal",
            categories,
        ));
    }
    Ok(Out::new(category_table(&categories), categories))
}

/// Handles `cuan categories add`.
pub async fn add_category(
    config: &Config,
    mode: Mode,
    name: &str,
    kind: TransactionKind,
) -> Result<Out<Category>> {
    let new = NewCategory::new(name.trim(), kind);
    new.validate()?;
    let (backend, session) = connect(config, mode).await?;
    let created = backend.create_category(&session, &new).await?;
    Ok(Out::new(
        format!(
            "Kategori {} '{}' ditambahkan dengan ID {}",
            created.kind.label(),
            created.name,
            created.id
        ),
        created,
    ))
}

/// Handles `cuan categories setup`: gives an account with no categories the starter set. An
/// account that already has any category is left alone.
pub async fn setup_categories(config: &Config, mode: Mode) -> Result<Out<Vec<Category>>> {
    let (backend, session) = connect(config, mode).await?;
    let existing = backend.categories(&session, None).await?;
    if !existing.is_empty() {
        debug!("Found {} existing categories", existing.len());
        return Ok(Out::new_message(
            "Kategori sudah tersedia, tidak ada yang dibuat",
        ));
    }

    let mut created = Vec::new();
    for new in default_categories() {
        let category = backend
            .create_category(&session, &new)
            .await
            .with_context(|| format!("Unable to create the starter category '{}'", new.name))?;
        info!("Membuat kategori {} '{}'", category.kind.label(), category.name);
        created.push(category);
    }
    Ok(Out::new(
        format!("{} kategori awal dibuat", created.len()),
        created,
    ))
}
