use crate::error::Result;
use crate::notifications::ReadState;
use crate::schema::{CreditCard, InstallmentPurchase, RecurringTransaction};
use std::collections::BTreeMap;

/// Read-only listing of an owner's obligations. Implemented by the caller
/// over whatever persistence it owns; the engine only ever reads through it.
pub trait ObligationSource {
    fn list_transactions(&self, owner_id: &str) -> Result<Vec<RecurringTransaction>>;

    fn list_purchases(&self, owner_id: &str)
        -> Result<Vec<(InstallmentPurchase, CreditCard)>>;
}

/// Per-owner persistence for the acknowledged-identifier set. Any durable
/// key-value store satisfies this; the reference deployment kept one JSON
/// array per owner.
///
/// `save` implementations must union with previously stored identifiers
/// rather than overwrite them, so two interleaved read-modify-write cycles
/// for the same owner cannot erase each other's acknowledgements.
pub trait ReadStateStore {
    fn load(&self, owner_id: &str) -> Result<ReadState>;

    fn save(&mut self, owner_id: &str, state: &ReadState) -> Result<()>;
}

/// In-memory implementation of both collaborator traits. Backs the test
/// suites; also usable as a scratch store for callers without persistence.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    transactions: BTreeMap<String, Vec<RecurringTransaction>>,
    purchases: BTreeMap<String, Vec<(InstallmentPurchase, CreditCard)>>,
    read_states: BTreeMap<String, ReadState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, owner_id: &str, transaction: RecurringTransaction) {
        self.transactions
            .entry(owner_id.to_string())
            .or_default()
            .push(transaction);
    }

    pub fn add_purchase(
        &mut self,
        owner_id: &str,
        purchase: InstallmentPurchase,
        card: CreditCard,
    ) {
        self.purchases
            .entry(owner_id.to_string())
            .or_default()
            .push((purchase, card));
    }
}

impl ObligationSource for InMemoryStore {
    fn list_transactions(&self, owner_id: &str) -> Result<Vec<RecurringTransaction>> {
        Ok(self.transactions.get(owner_id).cloned().unwrap_or_default())
    }

    fn list_purchases(
        &self,
        owner_id: &str,
    ) -> Result<Vec<(InstallmentPurchase, CreditCard)>> {
        Ok(self.purchases.get(owner_id).cloned().unwrap_or_default())
    }
}

impl ReadStateStore for InMemoryStore {
    fn load(&self, owner_id: &str) -> Result<ReadState> {
        Ok(self.read_states.get(owner_id).cloned().unwrap_or_default())
    }

    fn save(&mut self, owner_id: &str, state: &ReadState) -> Result<()> {
        self.read_states
            .entry(owner_id.to_string())
            .or_default()
            .merge(state);
        Ok(())
    }
}
