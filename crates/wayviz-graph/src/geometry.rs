use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, types::NodeId};

/// Mean earth radius of the spherical model, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Number of decimal places kept when deriving a node id from a coordinate.
pub const NODE_ID_PRECISION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Id of the node this coordinate snaps to.
    ///
    /// Coordinates that agree to [`NODE_ID_PRECISION`] decimal places share
    /// the same id, so way endpoints digitised independently still meet.
    pub fn node_id(&self) -> NodeId {
        NodeId::from(format!(
            "{:.prec$},{:.prec$}",
            self.lat,
            self.lon,
            prec = NODE_ID_PRECISION
        ))
    }
}

impl Coordinate for LatLon {
    fn lat_lon(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

impl Coordinate for Coord<f64> {
    fn lat_lon(&self) -> (f64, f64) {
        (self.y, self.x)
    }

    fn as_coord(&self) -> Coord<f64> {
        *self
    }
}

impl Coordinate for Point<f64> {
    fn lat_lon(&self) -> (f64, f64) {
        (self.y(), self.x())
    }

    fn as_coord(&self) -> Coord<f64> {
        self.0
    }
}

impl From<LatLon> for Coord<f64> {
    fn from(value: LatLon) -> Self {
        value.as_coord()
    }
}

impl From<Coord<f64>> for LatLon {
    fn from(value: Coord<f64>) -> Self {
        LatLon::new(value.y, value.x)
    }
}

/// Great-circle distance in meters (haversine on a sphere of [`EARTH_RADIUS_M`]).
pub fn distance<A, B>(p1: &A, p2: &B) -> f64
where
    A: Coordinate + ?Sized,
    B: Coordinate + ?Sized,
{
    let (lat1_deg, lon1_deg) = p1.lat_lon();
    let (lat2_deg, lon2_deg) = p2.lat_lon();

    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let delta_lat = (lat2_deg - lat1_deg).to_radians();
    let delta_lon = (lon2_deg - lon1_deg).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
