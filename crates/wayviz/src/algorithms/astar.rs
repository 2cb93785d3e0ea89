use wayviz_graph::Graph;

use super::{Run, RunOptions, best_first::BestFirst};

/// A* search guided by the great-circle distance to the sink.
///
/// The heuristic never overestimates as long as edge weights are at least the
/// great-circle distance between their endpoints, which holds for every
/// graph built from map ways.
pub fn astar<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(endpoints) = options.endpoints(graph) else {
        return Run::skipped();
    };

    Run::new(BestFirst::new(graph, endpoints, options.delay()).with_heuristic())
}
