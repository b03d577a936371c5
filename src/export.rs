use std::io;

use crate::card::{MonthKey, Smartcard};

/// Possible errors while writing the report
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A card was never aggregated for an in-range month
    #[error("card {card} has no aggregated total for {month}")]
    MissingData { card: u64, month: MonthKey },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("failed to flush the report")]
    Io(#[from] io::Error),
}

/// Writes the monthly spend report as CSV
///
/// Three label rows come first: card numbers, card states, and nicknames,
/// cards in directory order left to right. Then one row per month in
/// `months` order, labelled `YYYY-MM`, with that month's total per card.
/// Every card must hold a total for every month in `months`; the
/// aggregator leaves one behind even for zero-spend months.
pub fn write_report<W, I>(writer: W, cards: &[Smartcard], months: I) -> Result<(), ExportError>
where
    W: io::Write,
    I: IntoIterator<Item = MonthKey>,
{
    let mut writer = csv::Writer::from_writer(writer);

    let mut row = vec!["Card Numbers".to_string()];
    row.extend(cards.iter().map(|card| card.number().to_string()));
    writer.write_record(&row)?;

    let mut row = vec!["Card States".to_string()];
    row.extend(cards.iter().map(|card| card.state().to_string()));
    writer.write_record(&row)?;

    let mut row = vec!["Dates".to_string()];
    row.extend(cards.iter().map(|card| card.nickname().to_string()));
    writer.write_record(&row)?;

    for month in months {
        let mut row = vec![month.to_string()];
        for card in cards {
            let activity = card
                .monthly_total(month)
                .ok_or(ExportError::MissingData {
                    card: card.number(),
                    month,
                })?;
            row.push(activity.total().to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;

    Ok(())
}
