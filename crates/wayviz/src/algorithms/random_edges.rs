use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use wayviz_graph::Graph;

use super::{Phase, Run, RunOptions, Status, Step, Stepper, Tracker};

/// Visits every edge of the graph exactly once in uniformly random order.
///
/// Set [`RunOptions::seed`] for a reproducible order.
pub fn random_edges<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let rng = match options.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };

    Run::new(RandomEdges {
        graph,
        unvisited: (0..graph.edge_count()).collect(),
        rng,
        tracker: Tracker::default(),
        delay: options.delay(),
    })
}

struct RandomEdges<'g> {
    graph: &'g Graph,
    unvisited: Vec<usize>,
    rng: SmallRng,
    tracker: Tracker,
    delay: Duration,
}

impl Stepper for RandomEdges<'_> {
    fn step(&mut self) -> Step {
        while !self.unvisited.is_empty() {
            let pick = self.rng.random_range(0..self.unvisited.len());
            let index = self.unvisited.swap_remove(pick);
            let Some(edge) = self.graph.edge(index) else {
                continue;
            };

            self.tracker.visit_edge(edge);
            return self.tracker.frame(Phase::Explore, self.delay);
        }

        self.tracker.done(Status::Completed)
    }
}
