//! # Recurrence Projector
//!
//! A library for projecting anchored, periodically-repeating financial
//! obligations onto a calendar: when future and past instances of a recurring
//! transaction land, which monthly billing cycle each credit-card installment
//! belongs to, and which projected occurrences a user has already
//! acknowledged.
//!
//! ## Core Concepts
//!
//! - **Obligation**: a recurring transaction or an installment purchase, the
//!   engine's sole input entity. Never mutated by projection.
//! - **Occurrence**: one concrete projected calendar instance of a recurring
//!   obligation. Derived, ephemeral, always recomputable.
//! - **Cycle allocation**: the assignment of one installment to a specific
//!   monthly invoice, keyed by calendar `(year, month)`.
//! - **Read-state**: the persisted set of occurrence identifiers a user has
//!   acknowledged. Identifiers are pure functions of (obligation, date), so
//!   acknowledgements survive recomputation.
//!
//! Everything here is a deterministic function of (obligations, window,
//! `now`). Persistence and the ambient clock stay on the caller's side of the
//! [`ObligationSource`] / [`ReadStateStore`] seams.
//!
//! ## Example
//!
//! ```rust,ignore
//! use recurrence_projector::*;
//! use chrono::NaiveDate;
//!
//! let mut store = InMemoryStore::new();
//! store.add_transaction(
//!     "user-1",
//!     RecurringTransaction {
//!         id: "rent".to_string(),
//!         description: "Rent".to_string(),
//!         amount: -1500.0,
//!         anchor_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!         recurrence: Recurrence::Monthly,
//!     },
//! );
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let window = ProjectionWindow::around(now, 30, 60);
//!
//! let mut read_store = InMemoryStore::new();
//! let feed = build_notification_feed(&store, &mut read_store, "user-1", window, now).unwrap();
//! println!("{} unread", feed.unread);
//! ```

pub mod calendar;
pub mod error;
pub mod installments;
pub mod notifications;
pub mod projector;
pub mod schema;
pub mod store;

pub use calendar::{advance, last_day_of_month, months_between, PeriodUnit};
pub use error::{ProjectionError, Result};
pub use installments::{allocate, cycle_totals, BillingCycle, CycleAllocation};
pub use notifications::{
    identity_of, unread_count, AnnotatedItem, NotificationItem, ObligationKind, ReadState,
};
pub use projector::{
    project, project_all, Occurrence, Occurrences, ProjectionWindow, MAX_PROJECTION_STEPS,
};
pub use schema::*;
pub use store::{InMemoryStore, ObligationSource, ReadStateStore};

use chrono::NaiveDate;
use log::{debug, info};

/// A built feed: annotated occurrences in deterministic order plus the
/// recomputed unread total.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFeed {
    pub occurrences: Vec<AnnotatedItem>,
    pub unread: usize,
}

/// Composes the pure components over the caller's storage seams.
///
/// Listing or read-state failures degrade rather than block: a failed
/// obligation listing projects nothing, a failed read-state load shows
/// everything unread. Save failures do surface, since losing an
/// acknowledgement silently would contradict the idempotency contract.
pub struct NotificationFeedBuilder<'a, S, R> {
    source: &'a S,
    store: &'a mut R,
}

impl<'a, S: ObligationSource, R: ReadStateStore> NotificationFeedBuilder<'a, S, R> {
    pub fn new(source: &'a S, store: &'a mut R) -> Self {
        Self { source, store }
    }

    pub fn build(
        &mut self,
        owner_id: &str,
        window: ProjectionWindow,
        now: NaiveDate,
    ) -> Result<NotificationFeed> {
        window.validate()?;

        info!("Building notification feed for owner: {}", owner_id);

        let transactions = match self.source.list_transactions(owner_id) {
            Ok(transactions) => transactions,
            Err(e) => {
                debug!("Transaction listing failed, projecting nothing: {}", e);
                Vec::new()
            }
        };
        let purchases = match self.source.list_purchases(owner_id) {
            Ok(purchases) => purchases,
            Err(e) => {
                debug!("Purchase listing failed, projecting nothing: {}", e);
                Vec::new()
            }
        };

        let set = ObligationSet {
            owner_id: owner_id.to_string(),
            transactions,
            purchases,
        };
        validate_obligations(&set)?;

        debug!(
            "Projecting {} transactions and {} purchases into [{}, {}]",
            set.transactions.len(),
            set.purchases.len(),
            window.start,
            window.end
        );

        let mut items = Vec::new();

        for occurrence in project_all(&set.transactions, window, now) {
            items.push(NotificationItem {
                kind: ObligationKind::Transaction,
                obligation_id: occurrence.obligation_id,
                description: occurrence.description,
                amount: occurrence.amount,
                projected_date: occurrence.projected_date,
                is_past: occurrence.is_past,
            });
        }

        for (purchase, card) in &set.purchases {
            for allocation in allocate(purchase, card) {
                let projected_date = allocation.cycle.first_day();
                if !window.contains(projected_date) {
                    continue;
                }
                items.push(NotificationItem {
                    kind: ObligationKind::Purchase,
                    obligation_id: purchase.id.clone(),
                    description: format!(
                        "{} ({}/{})",
                        purchase.description,
                        allocation.installment_index,
                        purchase.installment_count
                    ),
                    amount: allocation.installment_amount,
                    projected_date,
                    is_past: projected_date < now,
                });
            }
        }

        items.sort_by(|a, b| {
            (a.projected_date, a.identity()).cmp(&(b.projected_date, b.identity()))
        });

        let read_state = match self.store.load(owner_id) {
            Ok(state) => state,
            Err(e) => {
                debug!("Read-state load failed, treating all as unread: {}", e);
                ReadState::new()
            }
        };

        let occurrences = read_state.annotate(items);
        let unread = unread_count(&occurrences);

        debug!("Feed built: {} items, {} unread", occurrences.len(), unread);

        Ok(NotificationFeed { occurrences, unread })
    }

    /// Acknowledges one identifier via a load-union-save round trip. Returns
    /// whether the persisted set changed; an already-read identifier is a
    /// no-op and skips the save.
    pub fn mark_read(&mut self, owner_id: &str, identity: &str) -> Result<bool> {
        let mut state = self.load_or_empty(owner_id);
        let changed = state.mark_read(identity);
        if changed {
            self.store.save(owner_id, &state)?;
        }
        Ok(changed)
    }

    /// Acknowledges every currently-unread item in one batch. Returns the
    /// number of identifiers newly persisted.
    pub fn mark_all_read(&mut self, owner_id: &str, items: &[NotificationItem]) -> Result<usize> {
        let mut state = self.load_or_empty(owner_id);
        let added = state.mark_all_read(items);
        if added > 0 {
            self.store.save(owner_id, &state)?;
        }
        Ok(added)
    }

    fn load_or_empty(&self, owner_id: &str) -> ReadState {
        match self.store.load(owner_id) {
            Ok(state) => state,
            Err(e) => {
                debug!("Read-state load failed, starting from empty: {}", e);
                ReadState::new()
            }
        }
    }
}

/// One-shot feed build over a source and a read-state store.
pub fn build_notification_feed<S: ObligationSource, R: ReadStateStore>(
    source: &S,
    store: &mut R,
    owner_id: &str,
    window: ProjectionWindow,
    now: NaiveDate,
) -> Result<NotificationFeed> {
    NotificationFeedBuilder::new(source, store).build(owner_id, window, now)
}

/// Boundary validation for caller-assembled input. Malformed values are a
/// caller bug and get a typed error here; past this point the engine is total
/// and unrecognized recurrence values simply project nothing.
pub fn validate_obligations(set: &ObligationSet) -> Result<()> {
    for (purchase, card) in &set.purchases {
        if purchase.installment_count < 1 {
            return Err(ProjectionError::InvalidInstallmentCount(
                purchase.installment_count,
            ));
        }
        if !(1..=31).contains(&card.closing_day) {
            return Err(ProjectionError::InvalidClosingDay(card.closing_day));
        }
        if !purchase.total_amount.is_finite() {
            return Err(ProjectionError::ValidationError {
                obligation: purchase.id.clone(),
                details: format!("total amount {} is not finite", purchase.total_amount),
            });
        }
    }
    Ok(())
}
