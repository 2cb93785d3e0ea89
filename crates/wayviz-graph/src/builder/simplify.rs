use std::{collections::VecDeque, iter, sync::Arc};

use geo::Coord;
use log::{debug, info};
use tracing::instrument;

use crate::{
    Coordinate,
    graph::Graph,
    types::{Edge, EdgeId},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Promote one node of every cycle made only of degree-2 nodes, so the
    /// cycle survives as a self-loop instead of vanishing.
    pub promote_isolated_cycles: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    pub raw_nodes: usize,
    pub raw_edges: usize,
    pub nodes: usize,
    pub edges: usize,
    pub dropped_walks: usize,
    pub promoted_nodes: usize,
}

struct Chain {
    end: usize,
    weight: f64,
    sub_edges: Vec<EdgeId>,
    points: Vec<Coord<f64>>,
}

/// Collapses every chain of degree-2 nodes of `raw` into one compound edge.
///
/// Nodes whose degree is not 2 survive unchanged. Walks start at each of
/// them along every outgoing edge and follow the only continuation at each
/// degree-2 node until the next surviving node is reached. Cycles without any
/// surviving node produce no edge unless
/// [`SimplifyOptions::promote_isolated_cycles`] is set.
#[instrument(level = "debug", skip_all, fields(nodes = raw.node_count(), edges = raw.edge_count()))]
pub fn simplify(raw: Arc<Graph>, options: SimplifyOptions) -> (Graph, SimplifyStats) {
    let mut important: Vec<bool> = raw.nodes().map(|(i, _)| raw.degree(i) != 2).collect();

    let promoted_nodes = if options.promote_isolated_cycles {
        promote_isolated_cycles(&raw, &mut important)
    } else {
        0
    };

    let mut graph = Graph::new();
    let mut mapping: Vec<Option<usize>> = vec![None; raw.node_count()];
    for (index, node) in raw.nodes().filter(|(i, _)| important[*i]) {
        mapping[index] = Some(graph.insert_node(node.id().clone(), node.point()));
    }

    let mut dropped_walks = 0;
    for (start, _) in raw.nodes().filter(|(i, _)| important[*i]) {
        for (edge, _) in raw.out_edges(start) {
            let Some(chain) = walk(&raw, &important, edge) else {
                dropped_walks += 1;
                continue;
            };

            let (Some(from), Some(to)) = (mapping[start], mapping[chain.end]) else {
                continue;
            };
            emit(&mut graph, &raw, (from, to), edge, chain);
        }
    }

    if dropped_walks > 0 {
        info!("Dropped {dropped_walks} walks that did not end at a surviving node");
    }

    let stats = SimplifyStats {
        raw_nodes: raw.node_count(),
        raw_edges: raw.edge_count(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        dropped_walks,
        promoted_nodes,
    };

    graph.set_raw(raw);
    graph.log_summary("simplified");

    (graph, stats)
}

/// Follows the chain starting with `first_edge` until it reaches an
/// important node.
///
/// Returns `None` on a dead end, i.e. a degree-2 node without an edge that
/// continues away from its predecessor, or when the walk runs longer than the
/// graph has edges.
fn walk(raw: &Graph, important: &[bool], first_edge: usize) -> Option<Chain> {
    let mut edge = raw.edge(first_edge)?;
    let mut chain = Chain {
        end: edge.from_index(),
        weight: 0.0,
        sub_edges: Vec::new(),
        points: vec![raw.node(edge.from_index())?.as_coord()],
    };

    loop {
        chain.weight += edge.weight();
        chain.sub_edges.push(edge.id().clone());
        chain.points.extend(edge.geometry().coords().skip(1).copied());
        chain.end = edge.to_index();

        if important.get(chain.end).copied().unwrap_or(true) {
            return Some(chain);
        }

        if chain.sub_edges.len() > raw.edge_count() {
            debug!("Walk from edge {} does not terminate", first_edge);
            return None;
        }

        let predecessor = edge.from_index();
        let Some((_, next)) = raw
            .out_edges(chain.end)
            .find(|(_, next)| next.to_index() != predecessor)
        else {
            debug!(
                "Walk from {} ends in a dead end at {}",
                raw.edge(first_edge)?.from(),
                edge.to()
            );
            return None;
        };

        edge = next;
    }
}

fn emit(
    graph: &mut Graph,
    raw: &Graph,
    (from, to): (usize, usize),
    first_edge: usize,
    chain: Chain,
) {
    let (Some(from_node), Some(to_node), Some(first)) =
        (graph.node(from), graph.node(to), raw.edge(first_edge))
    else {
        return;
    };
    let from_id = from_node.id().clone();
    let to_id = to_node.id().clone();

    // parallel chains and both directions of a loop share endpoints
    let base = EdgeId::between(&from_id, &to_id);
    let Some(id) = iter::once(base.clone())
        .chain((2..).map(|n| base.with_suffix(n)))
        .find(|id| !graph.contains_edge(id.as_str()))
    else {
        return;
    };

    let edge = Edge::compound(
        id,
        (from, &from_id),
        (to, &to_id),
        chain.weight,
        first.way().clone(),
        chain.sub_edges,
        chain.points,
    );

    graph.insert_edge(edge);
}

/// Marks the lowest-index node of every component consisting only of
/// degree-2 nodes as important. Returns the number of promoted nodes.
fn promote_isolated_cycles(raw: &Graph, important: &mut [bool]) -> usize {
    let mut seen = vec![false; raw.node_count()];
    let mut promoted = 0;

    for start in 0..raw.node_count() {
        if seen[start] || important[start] {
            continue;
        }

        let mut queue = VecDeque::from([start]);
        let mut isolated = true;
        seen[start] = true;

        while let Some(node) = queue.pop_front() {
            for (_, edge) in raw.out_edges(node) {
                let next = edge.to_index();
                if important[next] {
                    isolated = false;
                }
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }

        if isolated {
            debug!(
                "Promoting {} to keep an isolated cycle",
                raw.node(start).map_or("?", |n| n.id().as_str())
            );
            important[start] = true;
            promoted += 1;
        }
    }

    promoted
}
