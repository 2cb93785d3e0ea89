use wayviz_graph::Graph;

use super::{Run, RunOptions, best_first::BestFirst};

/// Dijkstra's shortest path from `options.source` to `options.sink`.
///
/// Emits a frame for every relaxation that improves a distance, then replays
/// the shortest path backwards from the sink.
pub fn dijkstra<'g>(graph: &'g Graph, options: &RunOptions) -> Run<'g> {
    let Some(endpoints) = options.endpoints(graph) else {
        return Run::skipped();
    };

    Run::new(BestFirst::new(graph, endpoints, options.delay()))
}
