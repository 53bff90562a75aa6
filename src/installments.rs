use crate::schema::{CreditCard, InstallmentPurchase};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Invoice key: the calendar month an installment is billed in. Keyed by
/// `(year, month)` rather than the literal closing date so totals aggregate
/// across cards with different closing days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BillingCycle {
    pub year: i32,
    pub month: u32,
}

impl BillingCycle {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Cycle containing `date`, shifted forward one month when the purchase
    /// day falls after the card's closing day (the books for that cycle have
    /// already closed). Plain day-number comparison: closing days 29-31 need
    /// no clamping because no date is constructed from them.
    pub fn for_purchase(date: NaiveDate, closing_day: u32) -> Self {
        let cycle = Self::new(date.year(), date.month());
        if date.day() > closing_day {
            cycle.succ()
        } else {
            cycle
        }
    }

    /// The next calendar month.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Shifted forward by `months` whole months.
    pub fn plus_months(self, months: u32) -> Self {
        let total = (self.month - 1) as i64 + months as i64;
        Self::new(self.year + (total / 12) as i32, (total % 12) as u32 + 1)
    }

    /// First day of the cycle month - the stable representative date used
    /// when a cycle needs to appear on a calendar.
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MAX)
    }
}

/// One installment assigned to one monthly invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleAllocation {
    pub card_id: String,
    pub cycle: BillingCycle,
    /// 1-based, matching how invoices label installments ("3/12").
    pub installment_index: u32,
    pub installment_amount: f64,
}

/// Maps each installment of `purchase` to the billing cycle it lands in.
///
/// Yields exactly `installment_count` allocations in strictly increasing
/// cycle order, one per consecutive cycle, each carrying the equal split of
/// the total. Rounding of the split for display is the caller's concern; the
/// raw quotient sums back to the total.
pub fn allocate(purchase: &InstallmentPurchase, card: &CreditCard) -> Vec<CycleAllocation> {
    let installment_amount = purchase.total_amount / purchase.installment_count as f64;
    let first_cycle = BillingCycle::for_purchase(purchase.purchase_date, card.closing_day);

    (0..purchase.installment_count)
        .map(|i| CycleAllocation {
            card_id: card.id.clone(),
            cycle: first_cycle.plus_months(i),
            installment_index: i + 1,
            installment_amount,
        })
        .collect()
}

/// Folds allocations into per-(card, cycle) invoice totals. The grouping rule
/// - same card, same calendar month - is part of the allocation contract;
/// this fold is the reference implementation of it.
pub fn cycle_totals(
    allocations: &[CycleAllocation],
) -> BTreeMap<(String, BillingCycle), f64> {
    let mut totals: BTreeMap<(String, BillingCycle), f64> = BTreeMap::new();
    for allocation in allocations {
        *totals
            .entry((allocation.card_id.clone(), allocation.cycle))
            .or_default() += allocation.installment_amount;
    }
    totals
}
