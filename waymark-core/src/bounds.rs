//! Bounding boxes describing which area a document covers.

use std::fmt;

use geo::{Coord, Rect};

const MAX_LAT: f64 = 90.0;
const MAX_LON: f64 = 180.0;

/// An axis-aligned WGS84 bounding box.
///
/// Coordinates use `x = longitude`, `y = latitude`. Corners are reordered
/// so that `min <= max` on both axes.
///
/// # Examples
/// ```
/// use waymark_core::Bounds;
///
/// let bounds = Bounds::new(52.0, 13.0, 53.0, 14.0);
/// assert!(!bounds.is_out_of_world());
///
/// let wide = Bounds::new(-95.0, 13.0, 53.0, 190.0);
/// assert!(wide.is_out_of_world());
/// assert_eq!(wide.normalised(), Bounds::new(-90.0, 13.0, 53.0, 180.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    rect: Rect<f64>,
}

impl Bounds {
    /// Build a box from its latitude/longitude corners.
    #[must_use]
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            rect: Rect::new(
                Coord {
                    x: min_lon,
                    y: min_lat,
                },
                Coord {
                    x: max_lon,
                    y: max_lat,
                },
            ),
        }
    }

    /// Southern edge.
    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    /// Western edge.
    #[must_use]
    pub fn min_lon(&self) -> f64 {
        self.rect.min().x
    }

    /// Northern edge.
    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    /// Eastern edge.
    #[must_use]
    pub fn max_lon(&self) -> f64 {
        self.rect.max().x
    }

    /// The box as a `geo` rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect<f64> {
        self.rect
    }

    /// Whether any edge lies outside the legal coordinate range.
    #[must_use]
    pub fn is_out_of_world(&self) -> bool {
        let lat_ok = |lat: f64| (-MAX_LAT..=MAX_LAT).contains(&lat);
        let lon_ok = |lon: f64| (-MAX_LON..=MAX_LON).contains(&lon);
        !(lat_ok(self.min_lat())
            && lat_ok(self.max_lat())
            && lon_ok(self.min_lon())
            && lon_ok(self.max_lon()))
    }

    /// A copy with every edge clamped into the legal coordinate range.
    #[must_use]
    pub fn normalised(&self) -> Self {
        let lat = |value: f64| value.clamp(-MAX_LAT, MAX_LAT);
        let lon = |value: f64| value.clamp(-MAX_LON, MAX_LON);
        Self::new(
            lat(self.min_lat()),
            lon(self.min_lon()),
            lat(self.max_lat()),
            lon(self.max_lon()),
        )
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lat(),
            self.min_lon(),
            self.max_lat(),
            self.max_lon()
        )
    }
}

/// An area a document claims to cover, together with who produced it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSource {
    /// Covered area.
    pub bounds: Bounds,
    /// Producer of the data, if stated.
    pub origin: Option<String>,
}
