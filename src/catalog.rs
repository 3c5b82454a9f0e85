//! Multi-week catalog download.
//!
//! A catalog is every week in an inclusive range fetched in order and
//! concatenated. Fetching stops at the first failing week and the error is
//! returned; no partial catalog is produced.

use crate::logging::{self, DataSource};
use crate::model::{validate_request, Catalog, FavaError, FlareRecord};

/// Anything that can produce one week of flares.
///
/// Implemented by the HTTP client in `ingest::fava` and by in-memory fakes
/// in tests.
pub trait WeeklySource {
    fn fetch_week(&self, week: u32, threshold: f64) -> Result<Vec<FlareRecord>, FavaError>;
}

/// Downloads `start_week..=end_week` and concatenates the weeks in order.
pub fn download_catalog<S: WeeklySource + ?Sized>(
    source: &S,
    start_week: u32,
    end_week: u32,
    threshold: f64,
) -> Result<Catalog, FavaError> {
    validate_request(start_week, end_week, threshold)?;

    let weeks_requested = (end_week - start_week) as usize + 1;
    logging::info(
        DataSource::Catalog,
        None,
        &format!(
            "Downloading FAVA data for weeks {}..={} above {} sigma",
            start_week, end_week, threshold
        ),
    );

    let mut catalog = Catalog::new(start_week, end_week, threshold);

    for (fetched, week) in (start_week..=end_week).enumerate() {
        match source.fetch_week(week, threshold) {
            Ok(rows) => {
                logging::debug(DataSource::Catalog, Some(week), &format!("{} sources", rows.len()));
                catalog.extend_week(rows);
            }
            Err(e) => {
                logging::log_fava_failure(week, "weekly fetch", &e);
                logging::log_download_summary(weeks_requested, fetched, catalog.len());
                return Err(e);
            }
        }
    }

    logging::log_download_summary(weeks_requested, weeks_requested, catalog.len());
    Ok(catalog)
}
