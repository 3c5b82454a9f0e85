//! Client for the Fermi All-sky Variability Analysis (FAVA) data portal.
//!
//! Downloads weekly flare lists, concatenates them into catalogs over a
//! range of weeks, and selects flares near the galactic plane.
//!
//! ```no_run
//! use fava_client::{catalog, config::FavaConfig, ingest::fava::FavaClient, analysis};
//!
//! # fn main() -> Result<(), fava_client::model::FavaError> {
//! let config = FavaConfig::default();
//! let portal = FavaClient::new(&config)?;
//! let catalog = catalog::download_catalog(&portal, 1, 4, 6.0)?;
//! let galactic = analysis::select_galactic_sources(catalog.records(), 10.0);
//! println!("{} of {} flares within 10 deg of the plane", galactic.len(), catalog.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod coords;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod verify;

pub use analysis::{galactic_indices, select_galactic_sources};
pub use catalog::{download_catalog, WeeklySource};
pub use ingest::fava::{fetch_weekly_sources, FavaClient};
pub use model::{Catalog, FavaError, FlareRecord};
