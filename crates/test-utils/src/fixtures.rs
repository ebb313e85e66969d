//! Fixtures for the small end-to-end scenarios.
//!
//! All of them use a 2 x 2 swath on an integer grid so that every center,
//! corner and distance is exact in binary floating point.

use crate::generators::SyntheticSwath;

/// Center of cell (0, 0) of [`scenario_swath`].
pub const ORIGIN: (f64, f64) = (10.0, 20.0);

/// A point no cell of [`scenario_swath`] comes near (lat, lon).
pub const FAR_AWAY: (f64, f64) = (-60.0, 150.0);

/// 2 x 2 swath centered on [`ORIGIN`] with 1 degree pixels:
///
/// ```text
///          lon 20   lon 21
/// lat 10   (0,0)    (0,1)
/// lat 11   (1,0)    (1,1)
/// ```
pub fn scenario_swath() -> SyntheticSwath {
    SyntheticSwath::new(2, 2).origin(ORIGIN.0, ORIGIN.1).step(1.0)
}

/// [`scenario_swath`] with the center latitude of cell (1, 0) missing.
pub fn nan_latitude_swath() -> SyntheticSwath {
    scenario_swath().with_nan_latitude(1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_geometry_is_exact() {
        let swath = scenario_swath();
        assert_eq!(swath.center(0, 0), ORIGIN);
        assert_eq!(swath.center(1, 1), (11.0, 21.0));
        assert_eq!(swath.corners(0, 0)[0], [19.5, 9.5]);
    }
}
