use std::{collections::VecDeque, time::Duration};

use rustc_hash::FxHashSet;
use wayviz_graph::Graph;

use super::{Phase, Run, RunOptions, Status, Step, Stepper, Tracker};

/// Breadth-first traversal from the start node, emitting a frame for every
/// edge that discovers a new node.
pub fn bfs<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(start) = options.start_node(graph) else {
        return Run::skipped();
    };

    Run::new(Bfs {
        graph,
        queue: VecDeque::from([start]),
        discovered: FxHashSet::from_iter([start]),
        expanding: None,
        tracker: Tracker::default(),
        delay: options.delay(),
    })
}

struct Bfs<'g> {
    graph: &'g Graph,
    queue: VecDeque<usize>,
    discovered: FxHashSet<usize>,
    expanding: Option<(usize, usize)>,
    tracker: Tracker,
    delay: Duration,
}

impl Stepper for Bfs<'_> {
    fn step(&mut self) -> Step {
        let graph = self.graph;

        loop {
            let Some((node, position)) = self.expanding else {
                let Some(next) = self.queue.pop_front() else {
                    return self.tracker.done(Status::Completed);
                };
                self.expanding = Some((next, 0));
                continue;
            };

            let Some(edge) = graph
                .node(node)
                .and_then(|n| n.edges().get(position))
                .and_then(|index| graph.edge(*index))
            else {
                self.expanding = None;
                continue;
            };
            self.expanding = Some((node, position + 1));

            if self.discovered.insert(edge.to_index()) {
                self.queue.push_back(edge.to_index());
                self.tracker.visit_edge(edge);
                return self.tracker.frame(Phase::Explore, self.delay);
            }
        }
    }
}
