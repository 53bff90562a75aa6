use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationKind {
    Transaction,
    Purchase,
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObligationKind::Transaction => write!(f, "transaction"),
            ObligationKind::Purchase => write!(f, "purchase"),
        }
    }
}

/// Stable identifier for one projected occurrence. Derived purely from the
/// obligation and its projected date, so recomputing a projection yields the
/// same identifiers and a persisted acknowledgement keeps matching.
pub fn identity_of(kind: ObligationKind, obligation_id: &str, projected_date: NaiveDate) -> String {
    format!("{}-{}-{}", kind, obligation_id, projected_date.format("%Y-%m-%d"))
}

/// One entry of the notification feed, before read-state annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationItem {
    pub kind: ObligationKind,
    pub obligation_id: String,
    pub description: String,
    pub amount: f64,
    pub projected_date: NaiveDate,
    pub is_past: bool,
}

impl NotificationItem {
    pub fn identity(&self) -> String {
        identity_of(self.kind, &self.obligation_id, self.projected_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedItem {
    pub item: NotificationItem,
    pub is_read: bool,
}

/// The persisted set of acknowledged occurrence identifiers for one owner.
///
/// Created empty on first use, grows via the mark operations, never pruned
/// here. Serialized form is a plain JSON array of identifiers; `BTreeSet`
/// keeps it deterministically ordered across save/load round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadState {
    read_ids: BTreeSet<String>,
}

impl ReadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.read_ids.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.read_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_ids.is_empty()
    }

    /// Acknowledges one identifier. Idempotent: returns whether the set
    /// actually changed, so callers can skip a save when nothing did.
    pub fn mark_read(&mut self, identity: impl Into<String>) -> bool {
        self.read_ids.insert(identity.into())
    }

    /// Acknowledges every currently-unread item in one batch. Returns the
    /// number of identifiers newly added.
    pub fn mark_all_read<'a, I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a NotificationItem>,
    {
        items
            .into_iter()
            .filter(|item| self.read_ids.insert(item.identity()))
            .count()
    }

    /// Pure annotation: attaches `is_read` to each item without touching the
    /// set. The unread total is always recomputed from the annotated list,
    /// never tracked separately.
    pub fn annotate(&self, items: Vec<NotificationItem>) -> Vec<AnnotatedItem> {
        items
            .into_iter()
            .map(|item| {
                let is_read = self.contains(&item.identity());
                AnnotatedItem { item, is_read }
            })
            .collect()
    }

    /// Set-union merge. Read-modify-write cycles must union with the stored
    /// state rather than overwrite it, so concurrent acknowledgements for the
    /// same owner cannot erase each other.
    pub fn merge(&mut self, other: &ReadState) {
        self.read_ids
            .extend(other.read_ids.iter().cloned());
    }
}

pub fn unread_count(items: &[AnnotatedItem]) -> usize {
    items.iter().filter(|entry| !entry.is_read).count()
}
