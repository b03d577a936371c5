use std::thread;

use rust_decimal::Decimal;
use tracing::info;

use crate::card::Smartcard;
use crate::client::{ActivityRecord, ClientError, OpalClient};
use crate::config::Config;
use crate::dates;

/// Drives the whole run: directory fetch, month-by-month aggregation,
/// pacing between requests
///
/// The run is strictly sequential. The first transport failure aborts it
/// with nothing written; only the activity endpoint's "no data" case is
/// survivable.
pub struct Aggregator {
    client: OpalClient,
    config: Config,
}

impl Aggregator {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = OpalClient::new(&config)?;

        Ok(Self { client, config })
    }

    /// Fetches the card directory and folds every in-range month's debit
    /// total into each card
    ///
    /// Every visited month leaves a record on its card even when the total
    /// is zero, so the exporter never sees a gap. After each activity
    /// fetch the configured pacing interval is slept through.
    pub fn run(&self) -> Result<Vec<Smartcard>, ClientError> {
        let mut cards = self.client.smartcards()?;
        info!(cards = cards.len(), "fetched card directory");

        for card in &mut cards {
            info!(card = card.number(), state = %card.state(), "aggregating card");

            for month in dates::year_months(self.config.start_year, self.config.end_year) {
                let records = self.client.monthly_activity(card.number(), month)?;
                let total = debit_total(&records);
                card.add_activity(month, total);
                info!(card = card.number(), %month, %total, "month aggregated");

                if !self.config.pacing.is_zero() {
                    thread::sleep(self.config.pacing);
                }
            }
        }

        Ok(cards)
    }
}

/// The month's spend in major currency units
///
/// Only strictly negative amounts (debits) contribute; the sum is sign
/// inverted and converted from cents, so the result is a positive total
/// with two decimal places.
pub fn debit_total(records: &[ActivityRecord]) -> Decimal {
    let cents: i64 = records
        .iter()
        .map(|record| record.amount)
        .filter(|amount| *amount < 0)
        .sum();

    Decimal::new(-cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(amounts: &[i64]) -> Vec<ActivityRecord> {
        amounts
            .iter()
            .map(|&amount| ActivityRecord { amount })
            .collect()
    }

    #[test]
    fn debits_are_summed_and_sign_inverted() {
        assert_eq!(
            debit_total(&records(&[-275, 50])),
            Decimal::new(275, 2),
        );
        assert_eq!(debit_total(&records(&[-275, 50])).to_string(), "2.75");
    }

    #[test]
    fn credits_never_contribute() {
        assert_eq!(debit_total(&records(&[50, 120, 0])), Decimal::new(0, 2));
    }

    #[test]
    fn no_records_means_zero_spend() {
        assert_eq!(debit_total(&[]), Decimal::new(0, 2));
        assert_eq!(debit_total(&[]).to_string(), "0.00");
    }

    #[test]
    fn the_total_is_the_negated_debit_sum_over_100() {
        let amounts = [-350, -1025, 410, -5, 0, 80];
        let expected = -amounts.iter().filter(|&&a| a < 0).sum::<i64>();

        assert_eq!(
            debit_total(&records(&amounts)),
            Decimal::new(expected, 2),
        );
    }
}
