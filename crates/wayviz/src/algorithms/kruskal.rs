use std::time::Duration;

use log::debug;
use ordered_float::OrderedFloat;
use wayviz_graph::Graph;

use super::{Phase, Run, RunOptions, Status, Step, Stepper, Tracker, reachable, union_find::UnionFind};

/// Kruskal's minimum spanning tree of the component around the start node.
///
/// Emits a frame for every accepted edge.
pub fn kruskal<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(start) = options.start_node(graph) else {
        return Run::skipped();
    };

    Run::new(Kruskal {
        graph,
        start,
        queue: None,
        position: 0,
        sets: UnionFind::new(graph.node_count()),
        weight: 0.0,
        accepted: 0,
        tracker: Tracker::default(),
        delay: options.delay(),
    })
}

struct Kruskal<'g> {
    graph: &'g Graph,
    start: usize,
    /// Component edges by ascending weight, sorted on the first step.
    queue: Option<Vec<usize>>,
    position: usize,
    sets: UnionFind,
    weight: f64,
    accepted: usize,
    tracker: Tracker,
    delay: Duration,
}

impl Kruskal<'_> {
    fn queue(&mut self) -> &[usize] {
        self.queue.get_or_insert_with(|| {
            let (nodes, mut edges) = reachable(self.graph, self.start);
            edges.sort_by_key(|edge| {
                OrderedFloat(self.graph.edge(*edge).map_or(f64::INFINITY, |e| e.weight()))
            });
            debug!("Spanning {} nodes over {} edges", nodes.len(), edges.len());
            edges
        })
    }
}

impl Stepper for Kruskal<'_> {
    fn step(&mut self) -> Step {
        loop {
            let position = self.position;
            let Some(edge_index) = self.queue().get(position).copied() else {
                return self.tracker.done(Status::Spanning {
                    weight: self.weight,
                    edges: self.accepted,
                });
            };
            self.position += 1;

            let Some(edge) = self.graph.edge(edge_index) else {
                continue;
            };
            if !self.sets.union(edge.from_index(), edge.to_index()) {
                continue;
            }

            self.weight += edge.weight();
            self.accepted += 1;
            self.tracker.visit_edge(edge);
            return self.tracker.frame(Phase::Explore, self.delay);
        }
    }
}
