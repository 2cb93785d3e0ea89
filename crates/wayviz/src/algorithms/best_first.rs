use std::{cmp::Reverse, collections::BinaryHeap, time::Duration};

use log::{debug, trace};
use ordered_float::OrderedFloat;
use rustc_hash::{FxHashMap, FxHashSet};
use wayviz_graph::{Graph, LatLon, distance};

use super::{Parents, PathReplay, Phase, Step, Stepper, Tracker};

/// Best-first shortest path search with lazy deletion.
///
/// Without a goal this is Dijkstra's algorithm. With a goal every queue key is
/// raised by the great-circle distance to it, which turns the search into A*.
/// Once the sink is settled or the queue runs dry the best path is replayed
/// with twice the exploration delay.
pub(crate) struct BestFirst<'g> {
    graph: &'g Graph,
    source: usize,
    sink: usize,
    goal: Option<LatLon>,
    frontier: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>>,
    distances: FxHashMap<usize, f64>,
    parents: Parents,
    finalized: FxHashSet<usize>,
    /// Node being expanded and the position of its next out-edge.
    expanding: Option<(usize, usize)>,
    tracker: Tracker,
    delay: Duration,
    replay: Option<PathReplay<'g>>,
}

impl<'g> BestFirst<'g> {
    pub fn new(graph: &'g Graph, (source, sink): (usize, usize), delay: Duration) -> Self {
        Self {
            graph,
            source,
            sink,
            goal: None,
            frontier: BinaryHeap::from([Reverse((OrderedFloat(0.0), source))]),
            distances: FxHashMap::from_iter([(source, 0.0)]),
            parents: Parents::default(),
            finalized: FxHashSet::default(),
            expanding: None,
            tracker: Tracker::default(),
            delay,
            replay: None,
        }
    }

    /// Guides the search towards the sink.
    pub fn with_heuristic(mut self) -> Self {
        self.goal = self.graph.node(self.sink).map(|node| node.point());
        self
    }

    fn estimate(&self, node: usize) -> f64 {
        match (self.goal, self.graph.node(node)) {
            (Some(goal), Some(node)) => distance(node, &goal),
            _ => 0.0,
        }
    }

    fn relax(&mut self, node: usize, edge_index: usize) -> Option<Step> {
        let graph = self.graph;
        let edge = graph.edge(edge_index)?;
        let next = edge.to_index();
        if self.finalized.contains(&next) {
            return None;
        }

        let cost = self.distances.get(&node)? + edge.weight();
        if self.distances.get(&next).is_some_and(|known| cost >= *known) {
            return None;
        }

        trace!("{} improves {} to {cost}", edge.id(), edge.to());
        self.distances.insert(next, cost);
        self.parents.insert(next, (node, edge_index));
        self.frontier
            .push(Reverse((OrderedFloat(cost + self.estimate(next)), next)));
        self.tracker.visit_edge(edge);

        Some(self.tracker.frame(Phase::Explore, self.delay))
    }

    fn start_replay(&mut self) {
        debug!(
            "Search settled {} nodes, replaying path",
            self.finalized.len()
        );
        self.replay = Some(PathReplay::new(
            self.graph,
            (self.source, self.sink),
            std::mem::take(&mut self.parents),
            self.distances.get(&self.sink).copied(),
            self.delay * 2,
        ));
    }
}

impl Stepper for BestFirst<'_> {
    fn step(&mut self) -> Step {
        loop {
            if let Some(replay) = &mut self.replay {
                return replay.step();
            }

            if let Some((node, position)) = self.expanding {
                let Some(&edge_index) = self
                    .graph
                    .node(node)
                    .and_then(|n| n.edges().get(position))
                else {
                    self.expanding = None;
                    continue;
                };

                self.expanding = Some((node, position + 1));
                if let Some(step) = self.relax(node, edge_index) {
                    return step;
                }
                continue;
            }

            let Some(Reverse((_, node))) = self.frontier.pop() else {
                self.start_replay();
                continue;
            };

            // stale entry of an already settled node
            if !self.finalized.insert(node) {
                continue;
            }

            if node == self.sink {
                self.start_replay();
                continue;
            }

            self.expanding = Some((node, 0));
        }
    }
}
