/// Core data types for the FAVA client.
///
/// This module defines the shared domain model imported by all other modules:
/// the portal's flare rows, the aggregated catalog, and the error type.
/// It contains no I/O.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::coords::Equatorial;

// ---------------------------------------------------------------------------
// Portal constants
// ---------------------------------------------------------------------------

/// Query endpoint of the second FAVA catalog (2FAV) on the Fermi Science
/// Support Center.
pub const FAVA_API_URL: &str = "https://fermi.gsfc.nasa.gov/ssc/data/access/lat/FAVA/queryDB_2FAV.php";

/// FAVA weeks are numbered from 1.
pub const FIRST_WEEK: u32 = 1;

/// Default significance cutoff, in sigma.
pub const DEFAULT_THRESHOLD: f64 = 6.0;

pub const DEFAULT_START_WEEK: u32 = 1;
pub const DEFAULT_END_WEEK: u32 = 721;

/// Default half-width of the galactic-plane band, in degrees.
pub const DEFAULT_DGALB: f64 = 10.0;

// ---------------------------------------------------------------------------
// Flare records
// ---------------------------------------------------------------------------

/// One row of a `SourceList` response: a flare detected by FAVA in a single
/// week, with the best-available localisation and the low-energy (`le_*`)
/// and high-energy (`he_*`) likelihood follow-up.
///
/// The portal is loose about types: numbers arrive either as JSON numbers or
/// as strings, and missing values as `null` or `""`. Every field is therefore
/// optional. Keys this struct doesn't know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlareRecord {
    #[serde(rename = "flareID", default, deserialize_with = "de_opt_u64")]
    pub flare_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub num: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_f64")]
    pub best_ra: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub best_dec: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub best_r95: Option<f64>,
    #[serde(rename = "bestPositionSource", default, deserialize_with = "de_opt_string")]
    pub best_position_source: Option<String>,

    #[serde(default, deserialize_with = "de_opt_f64")]
    pub fava_ra: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub fava_dec: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub lbin: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub bbin: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub gall: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub galb: Option<f64>,

    /// Start of the analysis window (Fermi MET seconds).
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub tmin: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub tmax: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_f64")]
    pub sigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub avnev: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub nev: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_nev: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_avnev: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_sigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub sundist: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub varindex: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub favasrc: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub fglassoc: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub assoc: Option<String>,

    // Low-energy likelihood analysis
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_ts: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_tssigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_ra: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_dec: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_gall: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_galb: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_r95: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_contflag: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_sundist: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_dist2bb: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_ffsigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_hightsfrac: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_gtlts: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_flux: Option<f64>,
    // The portal spells this key without the "l".
    #[serde(rename = "le_fuxerr", default, deserialize_with = "de_opt_f64")]
    pub le_fluxerr: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_index: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub le_indexerr: Option<f64>,

    // High-energy likelihood analysis
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_ts: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_tssigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_ra: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_dec: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_gall: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_galb: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_r95: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_contflag: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_sundist: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_dist2bb: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_ffsigma: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_hightsfrac: Option<f64>,
    /// Separation between the high- and low-energy positions, in degrees.
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_le_dist: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_gtlts: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_flux: Option<f64>,
    #[serde(rename = "he_fuxerr", default, deserialize_with = "de_opt_f64")]
    pub he_fluxerr: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_index: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub he_indexerr: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_u32")]
    pub week: Option<u32>,
    #[serde(rename = "dateStart", default, deserialize_with = "de_opt_string")]
    pub date_start: Option<String>,
    #[serde(rename = "dateStop", default, deserialize_with = "de_opt_string")]
    pub date_stop: Option<String>,

    /// Portal keys not modelled above, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FlareRecord {
    /// The best-available localisation, if the portal supplied one.
    pub fn best_position(&self) -> Option<Equatorial> {
        match (self.best_ra, self.best_dec) {
            (Some(ra_deg), Some(dec_deg)) => Some(Equatorial { ra_deg, dec_deg }),
            _ => None,
        }
    }

    /// Looks up a value by its portal key (e.g. `"best_ra"`, `"flareID"`).
    ///
    /// Returns `None` if the key is unknown; known-but-missing fields come
    /// back as `Some(Value::Null)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.to_map().remove(key)
    }

    /// The record as a map keyed by portal column name.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_opt_f64(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64))
}

fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_opt_u64(deserializer)?;
    Ok(value.and_then(|v| u32::try_from(v).ok()))
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Flare records for a contiguous range of weeks, concatenated in week order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub start_week: u32,
    pub end_week: u32,
    pub threshold: f64,
    pub records: Vec<FlareRecord>,
}

impl Catalog {
    pub fn new(start_week: u32, end_week: u32, threshold: f64) -> Self {
        Self {
            start_week,
            end_week,
            threshold,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FlareRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlareRecord> {
        self.records.iter()
    }

    /// Appends one week's rows, keeping the order they arrived in.
    pub fn extend_week(&mut self, rows: Vec<FlareRecord>) {
        self.records.extend(rows);
    }

    /// All values of one portal key, one entry per record.
    pub fn column(&self, key: &str) -> Vec<Value> {
        self.columns(&[key]).remove(key).unwrap_or_default()
    }

    /// Several columns at once. Each record is serialized a single time
    /// however many keys are requested; unknown keys yield `null`s.
    pub fn columns(&self, keys: &[&str]) -> BTreeMap<String, Vec<Value>> {
        let mut out: BTreeMap<String, Vec<Value>> = keys
            .iter()
            .map(|k| (k.to_string(), Vec::with_capacity(self.records.len())))
            .collect();

        for record in &self.records {
            let mut map = record.to_map();
            for (key, values) in out.iter_mut() {
                values.push(map.remove(key.as_str()).unwrap_or(Value::Null));
            }
        }
        out
    }

    /// Distinct week numbers present, ascending.
    pub fn weeks(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter_map(|r| r.week)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a FlareRecord;
    type IntoIter = std::slice::Iter<'a, FlareRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing FAVA data.
#[derive(Debug, PartialEq)]
pub enum FavaError {
    /// Non-2xx HTTP response from the portal.
    HttpError(u16),
    /// The portal could not be reached (DNS, TLS, timeout, ...).
    Network(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// Start week after end week, or a week before `FIRST_WEEK`.
    InvalidWeekRange { start: u32, end: u32 },
    /// Significance threshold is negative or not finite.
    InvalidThreshold(f64),
    /// The configuration file or environment is unusable.
    Config(String),
}

impl std::fmt::Display for FavaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavaError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FavaError::Network(msg) => write!(f, "Network error: {}", msg),
            FavaError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FavaError::InvalidWeekRange { start, end } => {
                write!(f, "Invalid week range: {}..={} (weeks start at {})", start, end, FIRST_WEEK)
            }
            FavaError::InvalidThreshold(t) => {
                write!(f, "Invalid threshold: {} (must be a non-negative number)", t)
            }
            FavaError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for FavaError {}

impl From<reqwest::Error> for FavaError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FavaError::HttpError(status.as_u16()),
            None if err.is_decode() => FavaError::ParseError(err.to_string()),
            None => FavaError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FavaError {
    fn from(err: serde_json::Error) -> Self {
        FavaError::ParseError(err.to_string())
    }
}

/// Checks the week range and threshold shared by every portal request.
pub fn validate_request(start_week: u32, end_week: u32, threshold: f64) -> Result<(), FavaError> {
    if start_week < FIRST_WEEK || start_week > end_week {
        return Err(FavaError::InvalidWeekRange {
            start: start_week,
            end: end_week,
        });
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(FavaError::InvalidThreshold(threshold));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
