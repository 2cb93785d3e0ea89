use ::geo_types::Coord;
use thiserror::Error;

pub mod builder;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod types;

pub use builder::{GraphBuilder, simplify::SimplifyOptions};
pub use geometry::{LatLon, distance};
pub use graph::Graph;
pub use types::{Edge, EdgeId, Node, NodeId, WayMeta, WayRef};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node_id: {0} not found in graph")]
    NodeNotFound(String),
    #[error("edge '{edge}' references node '{node}' which is not in the graph")]
    DanglingEdge { edge: EdgeId, node: NodeId },
    #[error("node '{node}' lists edge '{edge}' which does not start at it")]
    ForeignEdge { node: NodeId, edge: EdgeId },
    #[error("could not parse overpass response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Anything that can be placed on the globe.
///
/// Latitude and longitude are in degrees. When converted into a planar
/// [`Coord`], longitude becomes `x` and latitude becomes `y`.
pub trait Coordinate {
    fn lat_lon(&self) -> (f64, f64);

    fn as_coord(&self) -> Coord<f64> {
        let (lat, lon) = self.lat_lon();
        Coord { x: lon, y: lat }
    }
}
