pub use self::{
    aggregate::{debit_total, Aggregator},
    card::{CardState, MonthKey, MonthlyActivity, Smartcard},
    client::{ActivityRecord, ClientError, OpalClient},
    config::Config,
    dates::{month_bounds, year_months},
    export::{write_report, ExportError},
};

mod aggregate;
mod card;
mod client;
mod config;
mod dates;
mod export;
