/// Data ingestion from remote portals.
///
/// Submodules:
/// - `fava` — weekly flare lists from the FAVA data portal.
pub mod fava;
