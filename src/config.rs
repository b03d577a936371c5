use std::fmt;
use std::time::Duration;

/// Everything a run needs, built by the binary and handed to the
/// aggregator at construction
///
/// The bearer token is a secret: `Debug` redacts it so it cannot leak
/// through logs or error output.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the fare API, without a trailing slash
    pub domain: String,
    /// Bearer token for the fare API, supplied externally and never
    /// refreshed
    pub token: String,
    /// First year to aggregate, inclusive
    pub start_year: i32,
    /// Last year to aggregate, exclusive
    pub end_year: i32,
    /// Records requested per activity page
    pub page_size: usize,
    /// Pause between consecutive activity requests; zero disables pacing
    pub pacing: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("token", &"<redacted>")
            .field("start_year", &self.start_year)
            .field("end_year", &self.end_year)
            .field("page_size", &self.page_size)
            .field("pacing", &self.pacing)
            .finish()
    }
}
