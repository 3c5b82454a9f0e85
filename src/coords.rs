/// Equatorial (FK5, J2000) to galactic coordinate conversion.
///
/// The transformation is a fixed rotation of the unit vector on the sky.
/// The matrix rows are the galactic x (towards the galactic centre), y and
/// z (north galactic pole) axes expressed in J2000 equatorial coordinates.

use serde::{Deserialize, Serialize};

/// J2000 equatorial to galactic rotation matrix.
const EQ_TO_GAL: [[f64; 3]; 3] = [
    [-0.054_875_560_416_215_4, -0.873_437_090_234_885_0, -0.483_835_015_548_713_2],
    [0.494_109_427_875_583_7, -0.444_829_629_960_011_2, 0.746_982_244_497_218_9],
    [-0.867_666_149_019_004_7, -0.198_076_373_431_201_5, 0.455_983_776_175_066_9],
];

/// A position in FK5 (J2000) equatorial coordinates, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// A position in galactic coordinates, in degrees.
///
/// `l_deg` is in [0, 360), `b_deg` in [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Galactic {
    pub l_deg: f64,
    pub b_deg: f64,
}

impl Equatorial {
    pub fn to_galactic(self) -> Galactic {
        let ra = self.ra_deg.to_radians();
        let dec = self.dec_deg.to_radians();
        let v = [dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()];

        let mut g = [0.0; 3];
        for (out, row) in g.iter_mut().zip(EQ_TO_GAL.iter()) {
            *out = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
        }

        // Rounding can push |z| a hair past 1 at the poles.
        let b_deg = g[2].clamp(-1.0, 1.0).asin().to_degrees();
        let l_deg = g[1].atan2(g[0]).to_degrees().rem_euclid(360.0);
        // rem_euclid can return exactly 360.0 for tiny negative inputs.
        let l_deg = if l_deg >= 360.0 { 0.0 } else { l_deg };

        Galactic { l_deg, b_deg }
    }
}

/// Galactic latitude of an equatorial position, in degrees.
pub fn galactic_latitude(ra_deg: f64, dec_deg: f64) -> f64 {
    Equatorial { ra_deg, dec_deg }.to_galactic().b_deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_galactic_centre_maps_to_origin() {
        let g = Equatorial { ra_deg: 266.404_996, dec_deg: -28.936_172 }.to_galactic();
        assert_abs_diff_eq!(g.b_deg, 0.0, epsilon = 1e-3);
        // l wraps around 0/360 at the centre
        let l = if g.l_deg > 180.0 { g.l_deg - 360.0 } else { g.l_deg };
        assert_abs_diff_eq!(l, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_north_galactic_pole() {
        let b = galactic_latitude(192.859_481, 27.128_251);
        assert_abs_diff_eq!(b, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_south_galactic_pole() {
        let b = galactic_latitude(12.859_481, -27.128_251);
        assert_abs_diff_eq!(b, -90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_crab_nebula() {
        // Crab: RA 83.633, Dec 22.0145 -> l 184.557, b -5.784
        let g = Equatorial { ra_deg: 83.633_08, dec_deg: 22.014_5 }.to_galactic();
        assert_abs_diff_eq!(g.l_deg, 184.557, epsilon = 1e-2);
        assert_abs_diff_eq!(g.b_deg, -5.784, epsilon = 1e-2);
    }

    #[test]
    fn test_longitude_is_normalised() {
        for ra in [0.0, 45.0, 90.0, 180.0, 270.0, 359.9] {
            for dec in [-80.0, -10.0, 0.0, 33.0, 89.0] {
                let g = Equatorial { ra_deg: ra, dec_deg: dec }.to_galactic();
                assert!((0.0..360.0).contains(&g.l_deg), "l out of range: {}", g.l_deg);
                assert!((-90.0..=90.0).contains(&g.b_deg), "b out of range: {}", g.b_deg);
            }
        }
    }
}
