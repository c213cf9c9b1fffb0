//! Implements the `Backend` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a CuanBook server.

use crate::api::{Backend, TransactionQuery};
use crate::error::{typed, ErrorType};
use crate::model::{
    default_categories, parse_occurred_at, Amount, Category, NewCategory, NewTransaction,
    Transaction, TransactionCategory, TransactionKind,
};
use crate::report::{CategoryReport, Resolved};
use crate::session::Session;
use crate::Result;
use anyhow::Context;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::trace;

/// The account that exists in every seeded `TestBackend`.
pub const DEMO_EMAIL: &str = "demo@cuanbook.id";
pub const DEMO_PASSWORD: &str = "rahasia123";

/// Backends handed out by `TestBackend::shared`, keyed by API URL.
static SHARED: Lazy<Mutex<HashMap<String, TestBackend>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// An implementation of the `Backend` trait that does not use the network. Clones share state.
#[derive(Debug, Clone)]
pub struct TestBackend {
    state: Arc<Mutex<State>>,
    latencies: Arc<Mutex<VecDeque<Duration>>>,
}

#[derive(Debug, Default)]
struct State {
    /// email -> password
    users: HashMap<String, String>,
    /// token -> email
    tokens: HashMap<String, String>,
    categories: Vec<Owned<Category>>,
    transactions: Vec<Owned<Transaction>>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct Owned<T> {
    owner: String,
    item: T,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    fn owner_of(&self, session: &Session) -> Result<String> {
        self.tokens
            .get(session.token())
            .cloned()
            .ok_or_else(|| typed(ErrorType::Auth, "Token tidak valid (HTTP 401)"))
    }

    fn add_category(&mut self, owner: &str, new: &NewCategory) -> Category {
        let category = Category {
            id: self.next_id("cat"),
            name: new.name.trim().to_string(),
            kind: new.kind,
            user_id: Some(owner.to_string()),
        };
        self.categories.push(Owned {
            owner: owner.to_string(),
            item: category.clone(),
        });
        category
    }

    fn find_category(&self, owner: &str, id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.owner == owner && c.item.id == id)
            .map(|c| &c.item)
    }
}

impl TestBackend {
    /// A backend seeded with the demo account, its categories and some transactions.
    pub fn new() -> Self {
        Self::from_state(seed_state().unwrap_or_default())
    }

    /// A backend with no accounts at all.
    pub fn empty() -> Self {
        Self::from_state(State::default())
    }

    fn from_state(state: State) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            latencies: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Returns the process-wide backend for `api_url`, creating a seeded one on first use.
    pub fn shared(api_url: &str) -> Self {
        let mut shared = SHARED.lock().unwrap_or_else(|e| e.into_inner());
        shared
            .entry(api_url.to_string())
            .or_insert_with(TestBackend::new)
            .clone()
    }

    /// Makes the next call wait `latency` before answering. Queued latencies are used in call
    /// order, one per call.
    pub fn push_latency(&self, latency: Duration) {
        self.latencies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(latency);
    }

    async fn delay(&self) {
        let latency = self
            .latencies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(latency) = latency {
            trace!("TestBackend sleeping for {latency:?}");
            tokio::time::sleep(latency).await;
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        self.delay().await;
        let mut state = self.state();
        match state.users.get(email) {
            Some(p) if p == password => {
                let token = format!("test-{}", uuid::Uuid::new_v4());
                state.tokens.insert(token.clone(), email.to_string());
                Ok(token)
            }
            _ => Err(typed(
                ErrorType::Backend,
                "Email atau password salah (HTTP 400)",
            )),
        }
    }

    async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.delay().await;
        let mut state = self.state();
        if state.users.contains_key(email) {
            return Err(typed(
                ErrorType::Backend,
                "Email sudah terdaftar (HTTP 400)",
            ));
        }
        state
            .users
            .insert(email.to_string(), password.to_string());
        Ok(())
    }

    async fn transactions(
        &self,
        session: &Session,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        self.delay().await;
        let state = self.state();
        let owner = state.owner_of(session)?;
        let mut found: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.owner == owner && query.matches(&t.item))
            .map(|t| t.item.clone())
            .collect();
        // Newest first.
        found.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = query.max_results() {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn create_transaction(
        &self,
        session: &Session,
        transaction: &NewTransaction,
    ) -> Result<Transaction> {
        self.delay().await;
        let mut state = self.state();
        let owner = state.owner_of(session)?;
        let category = state
            .find_category(&owner, &transaction.category_id)
            .cloned()
            .ok_or_else(|| typed(ErrorType::Backend, "Kategori tidak ditemukan (HTTP 404)"))?;
        if !transaction.amount.is_positive() {
            return Err(typed(ErrorType::Backend, "Jumlah tidak valid (HTTP 400)"));
        }
        let created = Transaction {
            id: state.next_id("tx"),
            kind: transaction.kind,
            amount: transaction.amount,
            date: Some(transaction.date.and_time(NaiveTime::MIN)),
            category_id: category.id.clone(),
            name: transaction.name.clone(),
            description: transaction.description.clone(),
            category: Some(TransactionCategory {
                name: category.name,
                kind: Some(category.kind.as_wire_str().to_string()),
            }),
        };
        state.transactions.push(Owned {
            owner,
            item: created.clone(),
        });
        Ok(created)
    }

    async fn categories(
        &self,
        session: &Session,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>> {
        self.delay().await;
        let state = self.state();
        let owner = state.owner_of(session)?;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.owner == owner && kind.map_or(true, |k| k == c.item.kind))
            .map(|c| c.item.clone())
            .collect())
    }

    async fn create_category(
        &self,
        session: &Session,
        category: &NewCategory,
    ) -> Result<Category> {
        self.delay().await;
        let mut state = self.state();
        let owner = state.owner_of(session)?;
        let name = category.name.trim();
        if name.is_empty() {
            return Err(typed(ErrorType::Backend, "Nama kategori wajib diisi (HTTP 400)"));
        }
        let exists = state.categories.iter().any(|c| {
            c.owner == owner && c.item.kind == category.kind && c.item.name.eq_ignore_ascii_case(name)
        });
        if exists {
            return Err(typed(ErrorType::Backend, "Kategori sudah ada (HTTP 409)"));
        }
        Ok(state.add_category(&owner, category))
    }

    async fn category_report(
        &self,
        session: &Session,
        resolved: &Resolved,
    ) -> Result<CategoryReport> {
        self.delay().await;
        let state = self.state();
        let owner = state.owner_of(session)?;
        let owned: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| t.item.clone())
            .collect();
        Ok(CategoryReport::from_transactions(&owned, resolved.range()))
    }
}

/// Builds the seeded state: the demo account with the default categories and `TRANSACTION_DATA`.
fn seed_state() -> Result<State> {
    let mut state = State::default();
    state
        .users
        .insert(DEMO_EMAIL.to_string(), DEMO_PASSWORD.to_string());
    for category in default_categories() {
        state.add_category(DEMO_EMAIL, &category);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(TRANSACTION_DATA.as_bytes()));
    for result in rdr.records() {
        let record = result.context("Bad seed transaction row")?;
        let field = |i: usize| record.get(i).unwrap_or_default().trim().to_string();
        let kind = TransactionKind::from_str(&field(0))?;
        let category = state
            .categories
            .iter()
            .map(|c| &c.item)
            .find(|c| c.kind == kind && c.name == field(2))
            .cloned()
            .with_context(|| format!("Unknown seed category '{}'", field(2)))?;
        let transaction = Transaction {
            id: state.next_id("tx"),
            kind,
            amount: Amount::from_str(&field(1)).unwrap_or_default(),
            date: parse_occurred_at(&field(3)),
            category_id: category.id.clone(),
            name: field(4),
            description: Some(field(5)).filter(|d| !d.is_empty()),
            category: Some(TransactionCategory {
                name: category.name,
                kind: Some(kind.as_wire_str().to_string()),
            }),
        };
        state.transactions.push(Owned {
            owner: DEMO_EMAIL.to_string(),
            item: transaction,
        });
    }
    Ok(state)
}

/// Seed transaction data for the demo account.
const TRANSACTION_DATA: &str = r##"type,amount,category,date,name,description
INCOME,2500000,Penjualan Produk,2024-01-02T09:15:00,Penjualan Kopi Bubuk,Pesanan grosir
EXPENSE,350000,Operasional,2024-01-02T13:40:00,Listrik Toko,
EXPENSE,75000,Transportasi,2024-01-03T07:05:00,Bensin Motor,
INCOME,1200000,Biaya Konsultasi,2024-01-05T10:00:00,Konsultasi Menu Kafe,
EXPENSE,3000000,Gaji Karyawan,2024-01-05T16:30:00,Gaji Barista,Januari
INCOME,850000,Penjualan Produk,2024-01-09T11:20:00,Penjualan Eceran,
EXPENSE,420000,Pembelian Kebutuhan,2024-01-10T08:45:00,Biji Kopi Arabika,5 kg
INCOME,1500000,Pendapatan Sewa,2024-01-15T00:00:00,Sewa Ruang Rapat,
EXPENSE,60000,Transportasi,2024-01-15T18:10:00,Ojek Antar Barang,
INCOME,5000000,Investasi Masuk,2024-01-20T14:00:00,Modal Tambahan,
EXPENSE,125000,Lainnya,2024-01-28T20:30:00,Biaya Admin Bank,
INCOME,3100000,Penjualan Produk,2024-02-01T09:00:00,Penjualan Kopi Bubuk,Pesanan grosir
EXPENSE,360000,Operasional,2024-02-02T13:00:00,Listrik Toko,
EXPENSE,3000000,Gaji Karyawan,2024-02-05T16:30:00,Gaji Barista,Februari
INCOME,400000,Lainnya,2024-02-07T12:00:00,Penjualan Ampas Kopi,
EXPENSE,90000,Transportasi,2024-02-07T17:45:00,Bensin Motor,
"##;
