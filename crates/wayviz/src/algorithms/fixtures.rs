use std::sync::Arc;

use wayviz_graph::{Graph, LatLon, NodeId, WayMeta};

use super::{Frame, Outcome, Phase, Run};

/// Undirected graph with one node per point and an edge pair per link.
pub fn graph(points: &[(f64, f64)], links: &[(usize, usize, f64)]) -> Graph {
    let mut graph = Graph::new();
    let way = Arc::new(WayMeta::default());

    let nodes: Vec<usize> = points
        .iter()
        .map(|(lat, lon)| graph.add_node(LatLon::new(*lat, *lon)))
        .collect();
    for (a, b, weight) in links {
        graph.add_edge(nodes[*a], nodes[*b], *weight, way.clone());
        graph.add_edge(nodes[*b], nodes[*a], *weight, way.clone());
    }

    graph
}

/// A-B-C-D-A with unit weights.
pub fn square() -> Graph {
    graph(
        &[(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)],
        &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)],
    )
}

/// Two separate unit-weight segments.
pub fn split() -> Graph {
    graph(
        &[(0.0, 0.0), (0.0, 0.001), (1.0, 1.0), (1.0, 1.001)],
        &[(0, 1, 1.0), (2, 3, 1.0)],
    )
}

pub fn id(graph: &Graph, index: usize) -> NodeId {
    graph.node(index).unwrap().id().clone()
}

/// Drains a run, returning its frames and its outcome.
pub fn drain(mut run: Run<'_>) -> (Vec<Frame>, Outcome) {
    let frames: Vec<Frame> = run.by_ref().collect();
    (frames, run.finish())
}

pub fn assert_monotonic(frames: &[Frame]) {
    for pair in frames.windows(2) {
        if pair[0].phase == pair[1].phase {
            assert!(pair[1].snapshot.is_superset(&pair[0].snapshot));
        } else {
            assert_eq!((pair[0].phase, pair[1].phase), (Phase::Explore, Phase::Path));
        }
    }
}
