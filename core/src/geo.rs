//! Conversion between geographic coordinates and grid cells.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CellRect};

/// Geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, positive toward north.
    pub lat: f64,
    /// Longitude in degrees, positive toward east.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new geographic position.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reports whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Geographic rectangle described by its south-west and north-east corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

impl GeoBounds {
    /// Creates bounds spanning both corners, in any order.
    #[must_use]
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Reports whether the position lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

/// Fixed angular tiling of the globe anchored at an absolute origin.
///
/// Cell `(0, 0)` has its south-west corner at `origin`; every cell spans
/// `tile_degrees` of latitude and of longitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridProjection {
    origin: LatLng,
    tile_degrees: f64,
}

impl GridProjection {
    /// Creates a projection. Callers validate that `tile_degrees` is positive.
    #[must_use]
    pub const fn new(origin: LatLng, tile_degrees: f64) -> Self {
        Self {
            origin,
            tile_degrees,
        }
    }

    /// Anchor of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> LatLng {
        self.origin
    }

    /// Angular size of a cell edge.
    #[must_use]
    pub const fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    /// Cell containing the position. Positions beyond the `i32` range clamp to its edge.
    #[must_use]
    pub fn cell_at(&self, point: LatLng) -> CellCoord {
        CellCoord::new(
            band_index(point.lat - self.origin.lat, self.tile_degrees),
            band_index(point.lng - self.origin.lng, self.tile_degrees),
        )
    }

    /// Geographic rectangle covered by the cell.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellCoord) -> GeoBounds {
        let south = self.origin.lat + f64::from(cell.i()) * self.tile_degrees;
        let west = self.origin.lng + f64::from(cell.j()) * self.tile_degrees;
        GeoBounds {
            south_west: LatLng::new(south, west),
            north_east: LatLng::new(south + self.tile_degrees, west + self.tile_degrees),
        }
    }

    /// Centre point of the cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> LatLng {
        let bounds = self.cell_bounds(cell);
        LatLng::new(
            (bounds.south_west.lat + bounds.north_east.lat) / 2.0,
            (bounds.south_west.lng + bounds.north_east.lng) / 2.0,
        )
    }

    /// Smallest cell-aligned rectangle covering the bounds.
    #[must_use]
    pub fn covering(&self, bounds: GeoBounds) -> CellRect {
        CellRect::from_corners(
            self.cell_at(bounds.south_west),
            self.cell_at(bounds.north_east),
        )
    }
}

fn band_index(offset: f64, tile_degrees: f64) -> i32 {
    let band = (offset / tile_degrees).floor();
    if band.is_nan() {
        return 0;
    }
    band.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
