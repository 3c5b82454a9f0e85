//! Galactic-plane selection.
//!
//! Latitude is recomputed from each flare's best position (`best_ra`,
//! `best_dec`, FK5 J2000) rather than read from the portal's `galb` column,
//! which refers to the coarser FAVA grid position.
//!
//! Latitudes come out of a floating-point rotation, so a position on the
//! plane lands within ~1e-14 degrees of zero rather than on it. A band of
//! `dgalb = 0.0` is therefore empty for real positions; use a small positive
//! width to select sources on the plane.

use crate::logging::{self, DataSource};
use crate::model::{Catalog, FlareRecord};

/// `true` if the record's best position lies within `dgalb` degrees of the
/// galactic plane (inclusive). Records without a best position never match.
pub fn in_galactic_band(record: &FlareRecord, dgalb: f64) -> bool {
    record
        .best_position()
        .map(|pos| {
            let b = pos.to_galactic().b_deg;
            b >= -dgalb && b <= dgalb
        })
        .unwrap_or(false)
}

/// Indices of the records inside the band, ascending.
pub fn galactic_indices(records: &[FlareRecord], dgalb: f64) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| in_galactic_band(r, dgalb))
        .map(|(i, _)| i)
        .collect()
}

/// The records inside the band, in their original order.
pub fn select_galactic_sources(records: &[FlareRecord], dgalb: f64) -> Vec<FlareRecord> {
    let selected: Vec<FlareRecord> = records
        .iter()
        .filter(|r| in_galactic_band(r, dgalb))
        .cloned()
        .collect();

    logging::info(
        DataSource::Selection,
        None,
        &format!("Selected {} of {} sources within |b| <= {}", selected.len(), records.len(), dgalb),
    );

    selected
}

/// Same as [`select_galactic_sources`], keeping the catalog's week range
/// and threshold.
pub fn select_galactic_catalog(catalog: &Catalog, dgalb: f64) -> Catalog {
    Catalog {
        start_week: catalog.start_week,
        end_week: catalog.end_week,
        threshold: catalog.threshold,
        records: select_galactic_sources(catalog.records(), dgalb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::galactic_latitude;

    fn flare(id: u64, ra: f64, dec: f64) -> FlareRecord {
        FlareRecord {
            flare_id: Some(id),
            best_ra: Some(ra),
            best_dec: Some(dec),
            ..Default::default()
        }
    }

    /// Near the galactic centre, the Crab, a high-latitude blazar and the
    /// north galactic pole.
    fn sample() -> Vec<FlareRecord> {
        vec![
            flare(1, 266.4, -28.9),   // b ~ 0
            flare(2, 83.633, 22.0145), // b ~ -5.8
            flare(3, 187.2779, 2.0524), // 3C 273, b ~ +64.4
            flare(4, 192.8595, 27.1283), // b ~ +90
        ]
    }

    #[test]
    fn test_band_selects_low_latitude_sources() {
        let selected = select_galactic_sources(&sample(), 10.0);
        let ids: Vec<_> = selected.iter().filter_map(|r| r.flare_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_every_selected_source_is_inside_band() {
        let records = sample();
        for d in [0.5, 6.0, 30.0, 70.0] {
            for r in select_galactic_sources(&records, d) {
                let b = galactic_latitude(r.best_ra.unwrap(), r.best_dec.unwrap());
                assert!(b.abs() <= d, "b = {} outside band {}", b, d);
            }
        }
    }

    #[test]
    fn test_ninety_degrees_keeps_everything() {
        let records = sample();
        assert_eq!(select_galactic_sources(&records, 90.0), records);
    }

    #[test]
    fn test_zero_width_band_is_empty_off_plane() {
        assert!(select_galactic_sources(&sample()[1..], 0.0).is_empty());
    }

    /// Direction of the galactic centre as the J2000 unit vector of the
    /// rotation's first row.
    fn on_plane() -> FlareRecord {
        let (x, y, z): (f64, f64, f64) = (
            -0.054_875_560_416_215_4,
            -0.873_437_090_234_885_0,
            -0.483_835_015_548_713_2,
        );
        let ra = y.atan2(x).to_degrees().rem_euclid(360.0);
        let dec = z.asin().to_degrees();
        flare(9, ra, dec)
    }

    #[test]
    fn test_plane_source_has_latitude_within_rounding_of_zero() {
        let record = on_plane();
        let b = galactic_latitude(record.best_ra.unwrap(), record.best_dec.unwrap());
        assert!(b.abs() < 1e-9, "galactic centre should sit on the plane, got b = {}", b);
    }

    #[test]
    fn test_tiny_band_keeps_plane_source() {
        let mut records = sample();
        records.insert(0, on_plane());
        assert_eq!(galactic_indices(&records, 1e-9), vec![0]);
        assert!(in_galactic_band(&records[0], 1e-9));
    }

    #[test]
    fn test_negative_and_nan_bands_select_nothing() {
        assert!(galactic_indices(&sample(), -5.0).is_empty());
        assert!(galactic_indices(&sample(), f64::NAN).is_empty());
    }

    #[test]
    fn test_sources_without_position_are_dropped() {
        let mut records = sample();
        records.push(FlareRecord { flare_id: Some(5), best_ra: Some(266.4), ..Default::default() });
        assert_eq!(galactic_indices(&records, 90.0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_indices_match_selection() {
        let records = sample();
        let indices = galactic_indices(&records, 65.0);
        assert_eq!(indices, vec![0, 1, 2]);
        let selected = select_galactic_sources(&records, 65.0);
        let by_index: Vec<_> = indices.iter().map(|&i| records[i].clone()).collect();
        assert_eq!(selected, by_index);
    }

    #[test]
    fn test_catalog_selection_keeps_metadata() {
        let catalog = Catalog { start_week: 4, end_week: 9, threshold: 6.0, records: sample() };
        let galactic = select_galactic_catalog(&catalog, 10.0);
        assert_eq!((galactic.start_week, galactic.end_week, galactic.threshold), (4, 9, 6.0));
        assert_eq!(galactic.len(), 2);
    }
}
