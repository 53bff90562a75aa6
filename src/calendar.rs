use chrono::{Datelike, Days, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Week,
    Month,
    Year,
}

/// Advances `date` by `periods` units, clamping the day-of-month to the last
/// valid day of the target month. The clamp is derived from `date`'s own
/// day-of-month on every call, so advancing an anchor on the 31st by 1, 2, 3
/// months visits Feb 28/29, Mar 31, Apr 30 - the clamp never sticks.
///
/// Total over any valid date and period count.
pub fn advance(date: NaiveDate, periods: u32, unit: PeriodUnit) -> NaiveDate {
    match unit {
        PeriodUnit::Week => date
            .checked_add_days(Days::new(periods as u64 * 7))
            .unwrap_or(NaiveDate::MAX),
        PeriodUnit::Month => add_months_clamped(date, periods),
        PeriodUnit::Year => add_months_clamped(date, periods * 12),
    }
}

fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.month0() as i64 + months as i64;
    let year = date.year() + (total / 12) as i32;
    let month = (total % 12) as u32 + 1;

    let day = date.day().min(last_day_of_month(year, month).day());
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 4),
            NaiveDate::from_ymd_opt(2023, 4, 30).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_weekly_advance() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            advance(anchor, 1, PeriodUnit::Week),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
        assert_eq!(
            advance(anchor, 5, PeriodUnit::Week),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
    }

    #[test]
    fn test_monthly_clamp_reapplied_each_step() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert_eq!(
            advance(anchor, 1, PeriodUnit::Month),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            advance(anchor, 2, PeriodUnit::Month),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
        assert_eq!(
            advance(anchor, 3, PeriodUnit::Month),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
        assert_eq!(
            advance(anchor, 4, PeriodUnit::Month),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );
    }

    #[test]
    fn test_monthly_year_rollover() {
        let anchor = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        assert_eq!(
            advance(anchor, 3, PeriodUnit::Month),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
    }

    #[test]
    fn test_annual_leap_day_clamp() {
        let anchor = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            advance(anchor, 1, PeriodUnit::Year),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            advance(anchor, 4, PeriodUnit::Year),
            NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_advancement_is_additive_in_the_period_index() {
        // For non-clamping origins, advancing a periods then b more equals a
        // single a+b advance.
        let origin = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
        for unit in [PeriodUnit::Week, PeriodUnit::Month, PeriodUnit::Year] {
            for a in 0..8u32 {
                for b in 0..8u32 {
                    assert_eq!(
                        advance(advance(origin, a, unit), b, unit),
                        advance(origin, a + b, unit),
                        "unit {:?}, a {}, b {}",
                        unit,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_clamped_composition_must_stay_anchored() {
        // Once a clamp fires, the intermediate date has lost the original
        // day-of-month. Re-deriving from the clamped result drifts off the
        // 31st; deriving every candidate from the anchor does not. This is
        // the invariant the projector relies on.
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let direct = advance(anchor, 2, PeriodUnit::Month);
        assert_eq!(direct, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

        let via_clamped = advance(advance(anchor, 1, PeriodUnit::Month), 1, PeriodUnit::Month);
        assert_eq!(via_clamped, NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());
    }

    #[test]
    fn test_months_between() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(months_between(start, end), 14);
        assert_eq!(months_between(end, start), -14);
        assert_eq!(months_between(start, start), 0);
    }
}
