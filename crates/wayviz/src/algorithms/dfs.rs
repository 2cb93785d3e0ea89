use std::time::Duration;

use rustc_hash::FxHashSet;
use wayviz_graph::Graph;

use super::{Phase, Run, RunOptions, Status, Step, Stepper, Tracker};

/// Depth-first traversal from the start node, emitting a frame for every
/// edge that discovers a new node.
pub fn dfs<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(start) = options.start_node(graph) else {
        return Run::skipped();
    };

    Run::new(Dfs {
        graph,
        stack: vec![(start, 0)],
        discovered: FxHashSet::from_iter([start]),
        tracker: Tracker::default(),
        delay: options.delay(),
    })
}

struct Dfs<'g> {
    graph: &'g Graph,
    /// Path from the start node, each entry with its next out-edge position.
    stack: Vec<(usize, usize)>,
    discovered: FxHashSet<usize>,
    tracker: Tracker,
    delay: Duration,
}

impl Stepper for Dfs<'_> {
    fn step(&mut self) -> Step {
        let graph = self.graph;

        while let Some((node, position)) = self.stack.last_mut() {
            let Some(edge) = graph
                .node(*node)
                .and_then(|n| n.edges().get(*position))
                .and_then(|index| graph.edge(*index))
            else {
                self.stack.pop();
                continue;
            };
            *position += 1;

            if self.discovered.insert(edge.to_index()) {
                self.stack.push((edge.to_index(), 0));
                self.tracker.visit_edge(edge);
                return self.tracker.frame(Phase::Explore, self.delay);
            }
        }

        self.tracker.done(Status::Completed)
    }
}
