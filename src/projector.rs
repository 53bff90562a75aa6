use crate::calendar::{advance, months_between, PeriodUnit};
use crate::error::{ProjectionError, Result};
use crate::schema::{Recurrence, RecurringTransaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound on candidate dates examined per obligation. Projection over a
/// misconfigured window simply stops here rather than erroring; the
/// notification surface must never hang.
pub const MAX_PROJECTION_STEPS: u32 = 200;

/// Anchors further than this before the window start are fast-forwarded with
/// a closed-form starting index instead of being walked step by step.
const FAST_FORWARD_THRESHOLD_DAYS: i64 = 2 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ProjectionWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window surrounding `now`, the common notification-feed shape.
    pub fn around(now: NaiveDate, lookback_days: u32, lookahead_days: u32) -> Self {
        Self {
            start: now - chrono::Days::new(lookback_days as u64),
            end: now + chrono::Days::new(lookahead_days as u64),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(ProjectionError::InvalidWindow {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One concrete projected calendar instance of a recurring obligation.
/// Derived and ephemeral - never persisted, always recomputable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub obligation_id: String,
    pub description: String,
    pub amount: f64,
    pub projected_date: NaiveDate,
    pub is_past: bool,
}

/// Lazy, finite, restartable sequence of occurrences for one transaction.
///
/// Candidate `k` is always `advance(anchor, k)` - derived from the anchor,
/// never from the previous candidate - so the day-of-month phase survives
/// clamping, and the fast-forwarded start index visits exactly the dates
/// naive iteration from the anchor would.
pub struct Occurrences<'a> {
    transaction: &'a RecurringTransaction,
    window: ProjectionWindow,
    now: NaiveDate,
    unit: Option<PeriodUnit>,
    index: u32,
    steps: u32,
    done: bool,
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let unit = self.unit?;

        while !self.done && self.steps < MAX_PROJECTION_STEPS {
            let candidate = advance(self.transaction.anchor_date, self.index, unit);
            self.index += 1;
            self.steps += 1;

            if candidate > self.window.end {
                self.done = true;
                return None;
            }

            if candidate >= self.window.start {
                return Some(Occurrence {
                    obligation_id: self.transaction.id.clone(),
                    description: self.transaction.description.clone(),
                    amount: self.transaction.amount,
                    projected_date: candidate,
                    is_past: candidate < self.now,
                });
            }
        }

        None
    }
}

/// Projects a recurring transaction onto `window`. `now` is the caller's
/// start-of-day and only feeds the `is_past` flag.
///
/// Non-recurring transactions yield an empty sequence. Re-invoking with the
/// same arguments yields an identical sequence.
pub fn project<'a>(
    transaction: &'a RecurringTransaction,
    window: ProjectionWindow,
    now: NaiveDate,
) -> Occurrences<'a> {
    let unit = match transaction.recurrence {
        Recurrence::None => None,
        Recurrence::Weekly => Some(PeriodUnit::Week),
        Recurrence::Monthly => Some(PeriodUnit::Month),
        Recurrence::Annually => Some(PeriodUnit::Year),
    };

    let index = match unit {
        Some(u) => start_index(transaction.anchor_date, window.start, u),
        None => 0,
    };

    Occurrences {
        transaction,
        window,
        now,
        unit,
        index,
        steps: 0,
        done: false,
    }
}

/// Projects every transaction and returns the combined occurrences in a
/// deterministic order: by date, then obligation id.
pub fn project_all(
    transactions: &[RecurringTransaction],
    window: ProjectionWindow,
    now: NaiveDate,
) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = transactions
        .iter()
        .flat_map(|tx| project(tx, window, now))
        .collect();
    occurrences.sort_by(|a, b| {
        (a.projected_date, &a.obligation_id).cmp(&(b.projected_date, &b.obligation_id))
    });
    occurrences
}

/// Closed-form period index to begin iteration at. For anchors within the
/// fast-forward threshold this is 0 (plain iteration from the anchor). For
/// far-past anchors it is the number of whole periods elapsed before the
/// window start, minus one so a clamp landing exactly on the boundary is
/// never skipped. Candidates before the window start are filtered by the
/// iterator either way; only the starting point moves.
fn start_index(anchor: NaiveDate, window_start: NaiveDate, unit: PeriodUnit) -> u32 {
    let gap_days = (window_start - anchor).num_days();
    if gap_days <= FAST_FORWARD_THRESHOLD_DAYS {
        return 0;
    }

    let elapsed = match unit {
        PeriodUnit::Week => (gap_days / 7) as u32,
        PeriodUnit::Month => months_between(anchor, window_start).max(0) as u32,
        PeriodUnit::Year => (months_between(anchor, window_start).max(0) / 12) as u32,
    };
    elapsed.saturating_sub(1)
}
