use std::sync::Arc;

use geo::{BoundingRect, MultiPoint, Rect};
use log::{info, trace};
use rustc_hash::FxHashMap;

use crate::{
    Coordinate, GraphError,
    geometry::LatLon,
    types::{Edge, EdgeId, Node, NodeId, WayRef},
};

/// Directed, weighted multigraph of a road network.
///
/// Nodes keep their insertion order, edges are stored in one flat list and
/// every node holds the indices of its outgoing edges. A simplified graph
/// additionally keeps the raw graph it was derived from.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    node_index: FxHashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: FxHashMap<EdgeId, usize>,
    raw: Option<Arc<Graph>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the index of the node `point` snaps to, inserting it if needed.
    pub fn add_node(&mut self, point: LatLon) -> usize {
        self.insert_node(point.node_id(), point)
    }

    pub(crate) fn insert_node(&mut self, id: NodeId, point: LatLon) -> usize {
        if let Some(index) = self.node_index.get(&id) {
            return *index;
        }

        let index = self.nodes.len();
        self.node_index.insert(id.clone(), index);
        self.nodes.push(Node::new(id, point));
        index
    }

    /// Adds a single road segment from `from` to `to`.
    ///
    /// Returns `false` if either node does not exist or an edge with the same
    /// id is already present.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64, way: WayRef) -> bool {
        let (Some(from_node), Some(to_node)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };

        let edge = Edge::segment((from, from_node), (to, to_node), weight, way);
        self.insert_edge(edge)
    }

    pub(crate) fn insert_edge(&mut self, edge: Edge) -> bool {
        if self.edge_index.contains_key(edge.id()) {
            trace!("edge {} already exists", edge.id());
            return false;
        }
        if edge.to_index() >= self.nodes.len() {
            return false;
        }

        let index = self.edges.len();
        let Some(node) = self.nodes.get_mut(edge.from_index()) else {
            return false;
        };

        node.push_edge(index);
        self.edge_index.insert(edge.id().clone(), index);
        self.edges.push(edge);

        true
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    pub fn edge_by_id(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).and_then(|index| self.edges.get(*index))
    }

    /// Returns an Iterator over all nodes in insertion order.
    ///
    /// The Iterator yields pairs `(i, node)`, where `i` is the index of the node.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `node` as `(edge_index, edge)` pairs.
    ///
    /// Yields nothing for an unknown node index.
    pub fn out_edges(&self, node: usize) -> impl Iterator<Item = (usize, &Edge)> {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|node| node.edges().iter())
            .filter_map(|edge| self.edges.get(*edge).map(|e| (*edge, e)))
    }

    /// Number of outgoing edges.
    pub fn degree(&self, node: usize) -> usize {
        self.nodes.get(node).map_or(0, |node| node.edges().len())
    }

    /// The node traversals start from when no source is given.
    pub fn first_node(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(0)
    }

    /// The pre-simplification graph, if this graph was simplified.
    pub fn raw(&self) -> Option<&Graph> {
        self.raw.as_deref()
    }

    pub fn raw_shared(&self) -> Option<Arc<Graph>> {
        self.raw.clone()
    }

    pub(crate) fn set_raw(&mut self, raw: Arc<Graph>) {
        self.raw = Some(raw);
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        MultiPoint::from(
            self.nodes
                .iter()
                .map(|node| node.as_coord())
                .collect::<Vec<_>>(),
        )
        .bounding_rect()
    }

    /// Checks the structural invariants of the graph.
    ///
    /// Every edge must reference nodes of this graph and every node may only
    /// list edges that start at it.
    pub fn validate(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            for id in [edge.from(), edge.to()] {
                if !self.node_index.contains_key(id) {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id().clone(),
                        node: id.clone(),
                    });
                }
            }
        }

        for (index, node) in self.nodes() {
            for edge in node.edges() {
                let Some(edge) = self.edges.get(*edge) else {
                    return Err(GraphError::NodeNotFound(format!(
                        "edge index {edge} of node {}",
                        node.id()
                    )));
                };
                if edge.from_index() != index || edge.from() != node.id() {
                    return Err(GraphError::ForeignEdge {
                        node: node.id().clone(),
                        edge: edge.id().clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn log_summary(&self, kind: &str) {
        info!(
            "Created {kind} graph (node_count: {:?}, edge_count = {:?})",
            self.node_count(),
            self.edge_count()
        );
    }
}
