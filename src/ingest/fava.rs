/// FAVA (Fermi All-sky Variability Analysis) Data Portal Client
///
/// Retrieves the weekly flare lists published by the Fermi Science Support
/// Center. Each request returns every flare found in one week above a
/// significance threshold, as a JSON array of flat objects.
///
/// Portal: https://fermi.gsfc.nasa.gov/ssc/data/access/lat/FAVA/

use std::time::Duration;

use crate::catalog::WeeklySource;
use crate::config::FavaConfig;
use crate::logging::{self, DataSource};
use crate::model::{validate_request, FavaError, FlareRecord};

// ============================================================================
// URL Construction
// ============================================================================

/// Builds the `SourceList` query for one week.
pub fn build_source_list_url(api_url: &str, week: u32, threshold: f64) -> String {
    format!(
        "{}?typeOfRequest=SourceList&week={}&threshold={}",
        api_url, week, threshold
    )
}

/// Every URL a download of `start_week..=end_week` would request, in order.
pub fn build_catalog_urls(api_url: &str, start_week: u32, end_week: u32, threshold: f64) -> Vec<String> {
    (start_week..=end_week)
        .map(|week| build_source_list_url(api_url, week, threshold))
        .collect()
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parses a `SourceList` body into flare records.
///
/// The portal answers a week without flares with `[]` or `null`; both give
/// an empty list. Anything other than an array of objects is a parse error.
pub fn parse_source_list(body: &str) -> Result<Vec<FlareRecord>, FavaError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Option<Vec<FlareRecord>> = serde_json::from_str(trimmed)
        .map_err(|e| FavaError::ParseError(format!("SourceList body is not a list of flares: {}", e)))?;

    Ok(rows.unwrap_or_default())
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the blocking HTTP client used for every portal request.
pub fn build_client(config: &FavaConfig) -> Result<reqwest::blocking::Client, FavaError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| FavaError::Network(format!("failed to build HTTP client: {}", e)))
}

/// Fetch one week of flares above `threshold` sigma
///
/// # Parameters
/// - `client`: HTTP client
/// - `api_url`: portal query endpoint
/// - `week`: FAVA week number (1 = first week of the mission)
/// - `threshold`: significance cutoff in sigma
///
/// # Returns
/// The week's flares, in the order the portal listed them
pub fn fetch_weekly_sources(
    client: &reqwest::blocking::Client,
    api_url: &str,
    week: u32,
    threshold: f64,
) -> Result<Vec<FlareRecord>, FavaError> {
    validate_request(week, week, threshold)?;

    let url = build_source_list_url(api_url, week, threshold);
    logging::debug(DataSource::Fava, Some(week), &url);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(FavaError::HttpError(response.status().as_u16()));
    }

    let body = response.text()?;
    let records = parse_source_list(&body)?;

    logging::debug(
        DataSource::Fava,
        Some(week),
        &format!("{} sources above {} sigma", records.len(), threshold),
    );

    Ok(records)
}

/// The portal as a [`WeeklySource`]: one shared HTTP client and endpoint.
pub struct FavaClient {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl FavaClient {
    pub fn new(config: &FavaConfig) -> Result<Self, FavaError> {
        Ok(Self {
            client: build_client(config)?,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn http(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

impl WeeklySource for FavaClient {
    fn fetch_week(&self, week: u32, threshold: f64) -> Result<Vec<FlareRecord>, FavaError> {
        fetch_weekly_sources(&self.client, &self.api_url, week, threshold)
    }
}

// ============================================================================
// Tests
// ============================================================================
