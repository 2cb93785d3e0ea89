use std::time::Duration;

use log::debug;
use rustc_hash::FxHashMap;
use wayviz_graph::Graph;

use super::{Parents, PathReplay, Phase, Run, RunOptions, Step, Stepper, Tracker, reachable};

/// Bellman-Ford shortest path from `options.source` to `options.sink`.
///
/// Relaxes every edge of the part of the graph reachable from the source for
/// `|reachable| - 1` full rounds, emitting a frame per improving relaxation,
/// then replays the path like [`dijkstra`](super::dijkstra::dijkstra).
///
/// Only non-negative weights are supported; negative cycles are not detected.
pub fn bellman_ford<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(endpoints) = options.endpoints(graph) else {
        return Run::skipped();
    };

    Run::new(BellmanFord {
        graph,
        endpoints,
        edges: None,
        rounds: 0,
        round: 0,
        position: 0,
        distances: FxHashMap::default(),
        parents: Parents::default(),
        tracker: Tracker::default(),
        delay: options.delay(),
        replay: None,
    })
}

struct BellmanFord<'g> {
    graph: &'g Graph,
    endpoints: (usize, usize),
    /// Edges leaving the reachable subgraph, computed on the first step.
    edges: Option<Vec<usize>>,
    rounds: usize,
    round: usize,
    position: usize,
    distances: FxHashMap<usize, f64>,
    parents: Parents,
    tracker: Tracker,
    delay: Duration,
    replay: Option<PathReplay<'g>>,
}

impl BellmanFord<'_> {
    fn prepare(&mut self) -> &[usize] {
        self.edges.get_or_insert_with(|| {
            let (source, _) = self.endpoints;
            let (nodes, edges) = reachable(self.graph, source);
            debug!(
                "{} nodes and {} edges reachable from {source}",
                nodes.len(),
                edges.len()
            );

            self.rounds = nodes.len().saturating_sub(1);
            self.distances.insert(source, 0.0);
            edges
        })
    }

    fn relax(&mut self, edge_index: usize) -> Option<Step> {
        let graph = self.graph;
        let edge = graph.edge(edge_index)?;
        let cost = self.distances.get(&edge.from_index())? + edge.weight();
        if self
            .distances
            .get(&edge.to_index())
            .is_some_and(|known| cost >= *known)
        {
            return None;
        }

        self.distances.insert(edge.to_index(), cost);
        self.parents
            .insert(edge.to_index(), (edge.from_index(), edge_index));
        self.tracker.visit_edge(edge);

        Some(self.tracker.frame(Phase::Explore, self.delay))
    }
}

impl Stepper for BellmanFord<'_> {
    fn step(&mut self) -> Step {
        loop {
            if let Some(replay) = &mut self.replay {
                return replay.step();
            }

            let position = self.position;
            let next = self.prepare().get(position).copied();
            if self.round >= self.rounds {
                let (_, sink) = self.endpoints;
                debug!("Finished {} relaxation rounds", self.rounds);
                self.replay = Some(PathReplay::new(
                    self.graph,
                    self.endpoints,
                    std::mem::take(&mut self.parents),
                    self.distances.get(&sink).copied(),
                    self.delay,
                ));
                continue;
            }

            let Some(edge_index) = next else {
                self.round += 1;
                self.position = 0;
                continue;
            };

            self.position += 1;
            if let Some(step) = self.relax(edge_index) {
                return step;
            }
        }
    }
}
