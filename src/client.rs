use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::card::{CardState, MonthKey, Smartcard};
use crate::config::Config;
use crate::dates;

const CARD_DIRECTORY_PATH: &str = "/api/opal/api/customer/smartcards/";
const ACTIVITY_PATH: &str = "/api/opal/api/smartcard/activity/";

/// Possible errors while talking to the fare API
///
/// All of these abort the run; there is no retry. The one expected-absence
/// case, an activity response without its transaction list, is not an
/// error (see [`OpalClient::monthly_activity`]).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request failed outright or came back with a non-success status
    #[error("fare API request failed")]
    Transport(#[from] reqwest::Error),
    /// The API rejected the bearer token, so it has expired or been revoked
    #[error("the fare API rejected the bearer token (HTTP {0})")]
    AuthExpired(StatusCode),
    /// The body decoded but is not the shape the API documents
    #[error("malformed {context} response")]
    MalformedResponse {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A month outside 1 through 12 cannot be queried
    #[error("{0} is not a calendar month")]
    InvalidMonth(MonthKey),
}

/// One raw transaction row from the activity listing
///
/// The API reports more fields per transaction, but only the amount
/// matters for aggregation: signed cents, negative for debits.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct ActivityRecord {
    #[serde(rename = "Amount")]
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
struct SmartcardsResponse {
    #[serde(rename = "SmartcardDetails")]
    smartcards: Vec<SmartcardDetail>,
}

#[derive(Debug, Deserialize)]
struct SmartcardDetail {
    #[serde(rename = "SmartcardId")]
    id: u64,
    #[serde(rename = "CardState")]
    state: CardState,
    #[serde(rename = "CardNickName")]
    nickname: String,
}

/// A month with no recorded trips comes back without the list field at
/// all, hence the `Option`.
#[derive(Debug, Deserialize)]
struct ActivityResponse {
    #[serde(rename = "SmartcardActivityDetail")]
    records: Option<Vec<ActivityRecord>>,
}

/// Blocking client for the two fare API endpoints the export needs
///
/// Every request carries the externally supplied bearer token. The client
/// keeps no state between calls beyond the connection pool.
pub struct OpalClient {
    client: Client,
    domain: String,
    token: String,
    page_size: usize,
}

impl OpalClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            domain: config.domain.clone(),
            token: config.token.clone(),
            // a zero page size would never terminate the paging loop
            page_size: config.page_size.max(1),
        })
    }

    /// Every smartcard associated with the authenticated account
    ///
    /// Cards are returned in the order the directory lists them; the
    /// report keeps that order for its columns.
    pub fn smartcards(&self) -> Result<Vec<Smartcard>, ClientError> {
        let url = format!("{}{}", self.domain, CARD_DIRECTORY_PATH);
        debug!(%url, "requesting card directory");

        let body = self.fetch(self.client.get(url))?;
        parse_smartcards(&body)
    }

    /// Every transaction recorded for the card in the given month
    ///
    /// Pages through the activity endpoint, advancing the `start` offset
    /// until a short page comes back. A response without the activity list
    /// field means no recorded trips for the month and yields an empty
    /// list rather than an error.
    pub fn monthly_activity(
        &self,
        card_number: u64,
        month: MonthKey,
    ) -> Result<Vec<ActivityRecord>, ClientError> {
        let (from, to) = dates::month_bounds(month.year, month.month)
            .ok_or(ClientError::InvalidMonth(month))?;
        let url = format!("{}{}{}", self.domain, ACTIVITY_PATH, card_number);

        let mut records = Vec::new();
        let mut start = 0usize;

        loop {
            debug!(%url, start, %month, "requesting activity page");
            let body = self.fetch(self.client.get(&url).query(&[
                ("start", start.to_string()),
                ("nr", self.page_size.to_string()),
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
            ]))?;

            let page = match parse_activity_page(&body)? {
                Some(page) => page,
                None => {
                    if records.is_empty() {
                        info!(card = card_number, %month, "no activity recorded for this month");
                    }
                    break;
                }
            };

            let short_page = page.len() < self.page_size;
            records.extend(page);
            if short_page {
                break;
            }
            start += self.page_size;
        }

        Ok(records)
    }

    fn fetch(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.bearer_auth(&self.token).send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthExpired(status));
        }

        Ok(response.error_for_status()?.text()?)
    }
}

fn parse_smartcards(body: &str) -> Result<Vec<Smartcard>, ClientError> {
    let response: SmartcardsResponse =
        serde_json::from_str(body).map_err(|source| ClientError::MalformedResponse {
            context: "card directory",
            source,
        })?;

    Ok(response
        .smartcards
        .into_iter()
        .map(|card| Smartcard::new(card.id, card.state, card.nickname))
        .collect())
}

fn parse_activity_page(body: &str) -> Result<Option<Vec<ActivityRecord>>, ClientError> {
    let response: ActivityResponse =
        serde_json::from_str(body).map_err(|source| ClientError::MalformedResponse {
            context: "activity",
            source,
        })?;

    Ok(response.records)
}
