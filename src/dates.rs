use chrono::NaiveDate;

use crate::card::MonthKey;

/// First and last calendar day of the given month
///
/// Pure: the same (year, month) always resolves to the same pair. The fare
/// API treats both query bounds as inclusive, so the end of the range is
/// the last day of the month, leap years included. Returns `None` when the
/// month is outside 1 through 12 or the year is not representable.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
    };
    let last = next_month.pred_opt()?;

    Some((first, last))
}

/// Every month a run covers, in the canonical walking order
///
/// Year ascending over `start_year..end_year` (end exclusive), then month
/// 1 through 12. Both the aggregator and the exporter iterate months in
/// exactly this order, so the report rows line up with what was fetched.
pub fn year_months(start_year: i32, end_year: i32) -> impl Iterator<Item = MonthKey> {
    (start_year..end_year)
        .flat_map(|year| (1..=12).map(move |month| MonthKey { year, month }))
}
