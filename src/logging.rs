/// Structured logging for the FAVA client
///
/// Provides context-rich logging tagged with the subsystem and, where it
/// applies, the FAVA week being processed. Messages go through the `log`
/// facade; `init_logger` installs an `env_logger` backend writing either to
/// the console or to a log file.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;

use crate::model::FavaError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Requests to the FAVA portal
    Fava,
    /// Week-range aggregation
    Catalog,
    /// Galactic selection
    Selection,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Fava => write!(f, "FAVA"),
            DataSource::Catalog => write!(f, "CAT"),
            DataSource::Selection => write!(f, "SEL"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller asked for something the portal can't serve
    Expected,
    /// Unexpected failure - portal outage, network trouble or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

/// Initialize the global logger.
///
/// With `log_file` set, entries are appended to that file instead of going
/// to stderr. Calling this more than once is harmless; later calls are
/// ignored.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), FavaError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(min_level.into());

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| FavaError::Config(format!("cannot open log file {}: {}", path, e)))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                record.level(),
                record.args()
            )
        });
    } else if !console_timestamps {
        builder.format_timestamp(None);
        builder.format_target(false);
    }

    // A logger may already be installed (tests, embedding applications).
    let _ = builder.try_init();
    Ok(())
}

fn format_entry(source: &DataSource, week: Option<u32>, message: &str) -> String {
    let week_part = week.map(|w| format!(" [week {}]", w)).unwrap_or_default();
    format!("{}{}: {}", source, week_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, week: Option<u32>, message: &str) {
    log::info!("{}", format_entry(&source, week, message));
}

/// Log a warning message
pub fn warn(source: DataSource, week: Option<u32>, message: &str) {
    log::warn!("{}", format_entry(&source, week, message));
}

/// Log an error message
pub fn error(source: DataSource, week: Option<u32>, message: &str) {
    log::error!("{}", format_entry(&source, week, message));
}

/// Log a debug message
pub fn debug(source: DataSource, week: Option<u32>, message: &str) {
    log::debug!("{}", format_entry(&source, week, message));
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a FAVA portal failure based on the error kind
pub fn classify_fava_failure(err: &FavaError) -> FailureType {
    match err {
        // Bad input never reached the portal
        FavaError::InvalidWeekRange { .. } | FavaError::InvalidThreshold(_) => FailureType::Expected,
        // Weeks past the end of the published catalog
        FavaError::HttpError(404) => FailureType::Expected,
        FavaError::HttpError(_) | FavaError::Network(_) => FailureType::Unexpected,
        // Parse errors suggest API changes
        FavaError::ParseError(_) => FailureType::Unexpected,
        FavaError::Config(_) => FailureType::Unknown,
    }
}

/// Log a portal failure with automatic classification
pub fn log_fava_failure(week: u32, operation: &str, err: &FavaError) {
    let failure_type = classify_fava_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(DataSource::Fava, Some(week), &message),
        FailureType::Unexpected => error(DataSource::Fava, Some(week), &message),
        FailureType::Unknown => warn(DataSource::Fava, Some(week), &message),
    }
}

// ---------------------------------------------------------------------------
// Download Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a multi-week download
pub fn log_download_summary(weeks_requested: usize, weeks_fetched: usize, sources: usize) {
    let message = format!(
        "Downloaded data for {} sources ({}/{} weeks)",
        sources, weeks_fetched, weeks_requested
    );

    if weeks_fetched == weeks_requested {
        info(DataSource::Catalog, None, &message);
    } else if weeks_fetched == 0 {
        error(DataSource::Catalog, None, &message);
    } else {
        warn(DataSource::Catalog, None, &message);
    }
}
