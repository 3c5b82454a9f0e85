/// Post-download analysis of FAVA catalogs.
///
/// This module provides selection and grouping helpers that operate on
/// records already in memory. Nothing here performs I/O.
///
/// Submodules:
/// - `galactic` — keeps flares within a band around the galactic plane.
/// - `grouping` — organizes flat catalog output into per-week structures.
pub mod galactic;
pub mod grouping;

pub use galactic::{galactic_indices, select_galactic_catalog, select_galactic_sources};
pub use grouping::{group_by_week, summarize_weeks, WeekSummary};
