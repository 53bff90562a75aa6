use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Recurrence {
    #[default]
    #[schemars(description = "One-off item. Not projected onto the calendar.")]
    None,

    #[schemars(description = "Repeats every 7 days from the anchor date.")]
    Weekly,

    #[schemars(
        description = "Repeats every month on the anchor's day-of-month, clamped to the last valid day of shorter months (an anchor on the 31st lands on Feb 28/29, Apr 30, and so on)."
    )]
    Monthly,

    #[schemars(
        description = "Repeats every year on the anchor's month and day, clamped for Feb 29 anchors in non-leap years."
    )]
    Annually,
}

// Unrecognized values degrade to `None` so a malformed record yields an empty
// projection instead of poisoning the whole feed.
impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Weekly" => Recurrence::Weekly,
            "Monthly" => Recurrence::Monthly,
            "Annually" => Recurrence::Annually,
            _ => Recurrence::None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecurringTransaction {
    #[schemars(description = "Opaque identifier, unique within the owner. Immutable once created.")]
    pub id: String,

    #[schemars(description = "Display label (e.g., 'Rent', 'Gym membership').")]
    pub description: String,

    #[schemars(
        description = "Signed monetary value of each occurrence. Negative for outflows, positive for inflows. Never altered by projection."
    )]
    pub amount: f64,

    #[schemars(
        description = "Date (YYYY-MM-DD) the obligation first occurred or is first due. Every projected occurrence derives from this date; it is never mutated."
    )]
    pub anchor_date: NaiveDate,

    #[schemars(description = "How often the transaction repeats.")]
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallmentPurchase {
    #[schemars(description = "Opaque identifier, unique within the owner.")]
    pub id: String,

    #[schemars(description = "Identifier of the credit card the purchase was made on.")]
    pub card_id: String,

    #[schemars(description = "Display label (e.g., 'Washing machine').")]
    pub description: String,

    #[schemars(
        description = "Total purchase amount. The per-installment amount is total / installment_count; the split is derived at allocation time and never stored."
    )]
    pub total_amount: f64,

    #[schemars(description = "Number of equal monthly installments. Must be at least 1.")]
    pub installment_count: u32,

    #[schemars(description = "Calendar date (YYYY-MM-DD) the purchase was made.")]
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreditCard {
    #[schemars(description = "Opaque identifier, unique within the owner.")]
    pub id: String,

    #[schemars(description = "Display name (e.g., 'Visa Gold').")]
    pub name: String,

    #[schemars(
        description = "Day of month (1-31) on which the billing cycle closes. Purchases after this day roll into the following month's invoice. Compared as a plain day number, so 29-31 are valid for every month."
    )]
    pub closing_day: u32,
}

/// Everything the engine consumes for one owner. Assembled by the caller from
/// its storage layer; the engine never fetches or persists anything itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct ObligationSet {
    #[schemars(description = "Owner these obligations belong to.")]
    pub owner_id: String,

    #[serde(default)]
    #[schemars(description = "Recurring transactions to project onto the calendar.")]
    pub transactions: Vec<RecurringTransaction>,

    #[serde(default)]
    #[schemars(description = "Installment purchases, each paired with the card it was made on.")]
    pub purchases: Vec<(InstallmentPurchase, CreditCard)>,
}

impl ObligationSet {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ObligationSet)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
