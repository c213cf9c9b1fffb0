//! The dashboard view model.
//!
//! Switching periods quickly can leave several fetches in flight. Each `select` takes a ticket from
//! a `RequestGate` and only the holder of the newest ticket may replace what is shown, so a slow
//! response for an old selection can never overwrite a newer one.

use crate::api::{Backend, TransactionQuery};
use crate::model::Transaction;
use crate::report::{build_report, resolve, summarize, KindFilter, Period, Report, Resolved, Summary};
use crate::session::Session;
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// How many of the newest transactions the dashboard lists.
const RECENT: usize = 5;

/// Hands out monotonically increasing tickets. Only the most recently issued one is current.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every ticket issued before it.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Everything the dashboard shows for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub summary: Summary,
    pub report: Report,
    /// Newest first.
    pub recent: Vec<Transaction>,
}

/// Fetches every transaction needed to report on `resolved` and compare it with the previous
/// period, in a single request.
pub async fn fetch_period(
    backend: &dyn Backend,
    session: &Session,
    resolved: &Resolved,
) -> Result<Vec<Transaction>> {
    let range = resolved.range().union(resolved.previous().range());
    debug!(
        "Fetching transactions from {} to {}",
        range.start(),
        range.end()
    );
    backend
        .transactions(session, &TransactionQuery::new().range(&range))
        .await
}

/// Builds the dashboard for `resolved` from freshly fetched transactions.
pub async fn load_view(
    backend: &dyn Backend,
    session: &Session,
    resolved: &Resolved,
    filter: KindFilter,
) -> Result<DashboardView> {
    let transactions = fetch_period(backend, session, resolved).await?;
    let mut recent: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date.is_some_and(|at| resolved.range().contains(at)))
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT);
    Ok(DashboardView {
        summary: summarize(&transactions, resolved),
        report: build_report(&transactions, resolved, filter),
        recent,
    })
}

/// Holds the visible dashboard and applies period selections in latest-request-wins order.
pub struct Dashboard {
    backend: Arc<dyn Backend>,
    session: Session,
    filter: KindFilter,
    gate: RequestGate,
    view: Mutex<Option<DashboardView>>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>, session: Session, filter: KindFilter) -> Self {
        Self {
            backend,
            session,
            filter,
            gate: RequestGate::new(),
            view: Mutex::new(None),
        }
    }

    /// Loads `period` around `reference` and shows it, unless another selection was made while it
    /// was loading.
    ///
    /// # Returns
    /// `Ok(true)` if the view was replaced, `Ok(false)` if the result was stale and discarded.
    ///
    /// # Errors
    /// Fetch errors are returned only for the current selection. A stale failure is discarded like
    /// a stale success.
    pub async fn select(&self, period: Period, reference: NaiveDate) -> Result<bool> {
        let ticket = self.gate.issue();
        let resolved = resolve(period, reference);
        let loaded = load_view(self.backend.as_ref(), &self.session, &resolved, self.filter).await;

        let mut view = self.view.lock().await;
        if !self.gate.is_current(ticket) {
            debug!("Discarding stale {period} result for {reference} ({ticket:?})");
            return Ok(false);
        }
        *view = Some(loaded?);
        Ok(true)
    }

    /// The currently shown dashboard, if any selection has completed.
    pub async fn view(&self) -> Option<DashboardView> {
        self.view.lock().await.clone()
    }
}
