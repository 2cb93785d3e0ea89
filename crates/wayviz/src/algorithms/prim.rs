use std::{cmp::Reverse, time::Duration};

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use rustc_hash::{FxBuildHasher, FxHashSet};
use wayviz_graph::Graph;

use super::{Phase, Run, RunOptions, Status, Step, Stepper, Tracker};

/// Prim's minimum spanning tree grown from the start node.
///
/// Components the start node cannot reach are never visited.
pub fn prim<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(start) = options.start_node(graph) else {
        return Run::skipped();
    };

    Run::new(Prim {
        graph,
        start: Some(start),
        frontier: PriorityQueue::with_hasher(FxBuildHasher),
        in_tree: FxHashSet::default(),
        weight: 0.0,
        accepted: 0,
        tracker: Tracker::default(),
        delay: options.delay(),
    })
}

struct Prim<'g> {
    graph: &'g Graph,
    /// Taken on the first step.
    start: Option<usize>,
    /// Edges leaving the tree, keyed by their weight.
    frontier: PriorityQueue<usize, Reverse<OrderedFloat<f64>>, FxBuildHasher>,
    in_tree: FxHashSet<usize>,
    weight: f64,
    accepted: usize,
    tracker: Tracker,
    delay: Duration,
}

impl Prim<'_> {
    fn grow(&mut self, node: usize) {
        self.in_tree.insert(node);
        for (index, edge) in self.graph.out_edges(node) {
            if !self.in_tree.contains(&edge.to_index()) {
                self.frontier
                    .push(index, Reverse(OrderedFloat(edge.weight())));
            }
        }
    }
}

impl Stepper for Prim<'_> {
    fn step(&mut self) -> Step {
        if let Some(start) = self.start.take() {
            self.grow(start);
        }

        let graph = self.graph;
        while let Some((edge_index, _)) = self.frontier.pop() {
            let Some(edge) = graph.edge(edge_index) else {
                continue;
            };
            if self.in_tree.contains(&edge.to_index()) {
                continue;
            }

            self.weight += edge.weight();
            self.accepted += 1;
            self.tracker.visit_edge(edge);
            self.grow(edge.to_index());

            return self.tracker.frame(Phase::Explore, self.delay);
        }

        self.tracker.done(Status::Spanning {
            weight: self.weight,
            edges: self.accepted,
        })
    }
}
