use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

/// The state the fare network reports for a card
///
/// The set is closed: the API only ever reports these three states, and
/// anything else in a directory entry is a malformed response.
#[derive(Clone, Copy, Debug, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardState {
    Issued,
    Blocked,
    Hotlisted,
}

impl CardState {
    /// The state string as the fare API spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::Issued => "ISSUED",
            CardState::Blocked => "BLOCKED",
            CardState::Hotlisted => "HOTLISTED",
        }
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month of a specific year
///
/// Monthly totals are keyed by this, and the exporter uses its `Display`
/// form (`YYYY-MM`) as the row label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// One calendar month's aggregated spend for one card
///
/// The total is the positive sum of debit magnitudes in major currency
/// units. It starts at zero and only ever grows as debits are folded in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyActivity {
    month: u32,
    year: i32,
    total: Decimal,
}

impl MonthlyActivity {
    fn new(key: MonthKey) -> Self {
        Self {
            month: key.month,
            year: key.year,
            total: Decimal::ZERO,
        }
    }

    /// The calendar month, 1 through 12
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The spend aggregated for this month so far
    pub fn total(&self) -> Decimal {
        self.total
    }

    fn add_total(&mut self, amount: Decimal) {
        self.total += amount;
    }
}

/// A transit smartcard and its aggregated monthly spend
///
/// One card is created per directory entry, in directory order. Cards are
/// only ever mutated by folding monthly debit totals in via
/// [`Smartcard::add_activity`]; each month's record belongs to exactly one
/// card.
#[derive(Clone, Debug)]
pub struct Smartcard {
    number: u64,
    state: CardState,
    nickname: String,
    monthly_totals: HashMap<MonthKey, MonthlyActivity>,
}

impl Smartcard {
    /// Creates a card with no aggregated activity yet
    pub fn new(number: u64, state: CardState, nickname: impl Into<String>) -> Self {
        Self {
            number,
            state,
            nickname: nickname.into(),
            monthly_totals: HashMap::new(),
        }
    }

    /// The opaque card identifier, also the API path parameter
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The state the directory listing reported
    pub fn state(&self) -> CardState {
        self.state
    }

    /// The free-text label the owner gave the card
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Folds one contribution into the month's running total
    ///
    /// The month's record is created on its first contribution, so a zero
    /// contribution still leaves a record behind. Contributions are
    /// additive: adding `a` then `b` equals adding `a + b` once.
    pub fn add_activity(&mut self, key: MonthKey, amount: Decimal) {
        self.monthly_totals
            .entry(key)
            .or_insert_with(|| MonthlyActivity::new(key))
            .add_total(amount);
    }

    /// The aggregated activity for one month, if that month was visited
    pub fn monthly_total(&self, key: MonthKey) -> Option<&MonthlyActivity> {
        self.monthly_totals.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const JAN_2020: MonthKey = MonthKey {
        year: 2020,
        month: 1,
    };
    const FEB_2020: MonthKey = MonthKey {
        year: 2020,
        month: 2,
    };

    #[test]
    fn activity_is_created_lazily() {
        let mut card = Smartcard::new(111, CardState::Issued, "Main");
        assert!(card.monthly_total(JAN_2020).is_none());

        card.add_activity(JAN_2020, Decimal::new(0, 2));
        let activity = card.monthly_total(JAN_2020).unwrap();
        assert_eq!(activity.month(), 1);
        assert_eq!(activity.year(), 2020);
        assert_eq!(activity.total(), Decimal::ZERO);
    }

    #[test]
    fn contributions_accumulate_additively() {
        let mut once = Smartcard::new(111, CardState::Issued, "Main");
        once.add_activity(JAN_2020, Decimal::new(375, 2));

        let mut twice = Smartcard::new(111, CardState::Issued, "Main");
        twice.add_activity(JAN_2020, Decimal::new(275, 2));
        twice.add_activity(JAN_2020, Decimal::new(100, 2));

        assert_eq!(
            once.monthly_total(JAN_2020).unwrap().total(),
            twice.monthly_total(JAN_2020).unwrap().total(),
        );
    }

    #[test]
    fn months_do_not_share_totals() {
        let mut card = Smartcard::new(111, CardState::Issued, "Main");
        card.add_activity(JAN_2020, Decimal::new(275, 2));
        card.add_activity(FEB_2020, Decimal::new(100, 2));

        assert_eq!(
            card.monthly_total(JAN_2020).unwrap().total(),
            Decimal::new(275, 2)
        );
        assert_eq!(
            card.monthly_total(FEB_2020).unwrap().total(),
            Decimal::new(100, 2)
        );
    }

    #[test]
    fn month_key_label_is_zero_padded() {
        assert_eq!(JAN_2020.to_string(), "2020-01");
        assert_eq!(
            MonthKey {
                year: 2019,
                month: 12
            }
            .to_string(),
            "2019-12"
        );
    }

    #[test]
    fn card_state_spells_like_the_api() {
        assert_eq!(CardState::Issued.to_string(), "ISSUED");
        assert_eq!(CardState::Blocked.to_string(), "BLOCKED");
        assert_eq!(CardState::Hotlisted.to_string(), "HOTLISTED");
    }
}
