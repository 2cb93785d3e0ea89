use std::{
    borrow::Borrow,
    collections::BTreeMap,
    fmt::{Debug, Display},
    sync::Arc,
};

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, geometry::LatLon};

macro_rules! shared_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(Arc::from(value))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:?}", &*self.0)
            }
        }
    };
}

shared_id!(
    /// Node id of the form `"<lat>,<lon>"`, see [`LatLon::node_id`].
    NodeId
);

shared_id!(
    /// Edge id of the form `"<from>-><to>"`, optionally followed by `#<n>`
    /// when several compound edges connect the same pair of nodes.
    EdgeId
);

impl EdgeId {
    pub fn between(from: &NodeId, to: &NodeId) -> Self {
        EdgeId::from(format!("{from}->{to}"))
    }

    pub fn with_suffix(&self, n: usize) -> Self {
        EdgeId::from(format!("{self}#{n}"))
    }
}

/// Metadata of the way an edge was derived from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WayMeta {
    pub id: i64,
    pub tags: BTreeMap<String, String>,
}

pub type WayRef = Arc<WayMeta>;

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    id: NodeId,
    point: LatLon,
    #[serde(skip)]
    edges: Vec<usize>,
}

impl Node {
    pub(crate) fn new(id: NodeId, point: LatLon) -> Self {
        Self {
            id,
            point,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn point(&self) -> LatLon {
        self.point
    }

    /// Indices of the outgoing edges in the owning graph.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    pub(crate) fn push_edge(&mut self, edge: usize) {
        self.edges.push(edge);
    }
}

impl Coordinate for Node {
    fn lat_lon(&self) -> (f64, f64) {
        self.point.lat_lon()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    #[serde(skip)]
    from_index: usize,
    #[serde(skip)]
    to_index: usize,
    weight: f64,
    way: WayRef,
    sub_edges: Vec<EdgeId>,
    geometry: LineString<f64>,
}

impl Edge {
    /// A single road segment between two adjacent nodes.
    pub(crate) fn segment(
        (from_index, from): (usize, &Node),
        (to_index, to): (usize, &Node),
        weight: f64,
        way: WayRef,
    ) -> Self {
        Self {
            id: EdgeId::between(from.id(), to.id()),
            from: from.id().clone(),
            to: to.id().clone(),
            from_index,
            to_index,
            weight,
            way,
            sub_edges: Vec::new(),
            geometry: LineString::new(vec![from.as_coord(), to.as_coord()]),
        }
    }

    /// A collapsed chain of raw edges.
    pub(crate) fn compound(
        id: EdgeId,
        (from_index, from): (usize, &NodeId),
        (to_index, to): (usize, &NodeId),
        weight: f64,
        way: WayRef,
        sub_edges: Vec<EdgeId>,
        geometry: Vec<Coord<f64>>,
    ) -> Self {
        Self {
            id,
            from: from.clone(),
            to: to.clone(),
            from_index,
            to_index,
            weight,
            way,
            sub_edges,
            geometry: LineString::new(geometry),
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &NodeId {
        &self.to
    }

    pub fn from_index(&self) -> usize {
        self.from_index
    }

    pub fn to_index(&self) -> usize {
        self.to_index
    }

    /// Length in meters.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn way(&self) -> &WayRef {
        &self.way
    }

    /// Raw edges replaced by this edge. Empty for raw edges.
    pub fn sub_edges(&self) -> &[EdgeId] {
        &self.sub_edges
    }

    pub fn is_compound(&self) -> bool {
        !self.sub_edges.is_empty()
    }

    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }
}
