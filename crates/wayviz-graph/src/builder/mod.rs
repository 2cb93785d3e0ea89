use std::sync::Arc;

use log::debug;
use tracing::instrument;

use crate::{
    geometry::distance,
    graph::Graph,
    input::{self, OverpassResponse, RoutableFilter, Way},
};

pub mod simplify;

use simplify::{SimplifyOptions, SimplifyStats, simplify};

pub struct Uninitialized {}

pub struct FromWays {
    ways: Vec<Way>,
}

#[derive(Debug)]
pub struct GraphBuilder<State> {
    state: State,
    options: SimplifyOptions,
}

impl GraphBuilder<Uninitialized> {
    pub fn new() -> Self {
        Self {
            state: Uninitialized {},
            options: SimplifyOptions::default(),
        }
    }

    pub fn ways<I>(self, ways: I) -> GraphBuilder<FromWays>
    where
        I: IntoIterator<Item = Way>,
    {
        GraphBuilder {
            state: FromWays {
                ways: ways.into_iter().collect(),
            },
            options: self.options,
        }
    }

    pub fn overpass(
        self,
        response: &OverpassResponse,
        filter: &RoutableFilter,
    ) -> GraphBuilder<FromWays> {
        self.ways(input::ways(response, filter))
    }
}

impl Default for GraphBuilder<Uninitialized> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> GraphBuilder<State> {
    pub fn simplify_options(mut self, options: SimplifyOptions) -> Self {
        self.options = options;
        self
    }
}

impl GraphBuilder<FromWays> {
    /// Builds the routable graph without simplification.
    pub fn build_raw(self) -> Graph {
        build_raw(&self.state.ways)
    }

    /// Builds the raw graph and collapses its degree-2 chains.
    ///
    /// The returned graph owns the raw graph, see [`Graph::raw`].
    pub fn build(self) -> Graph {
        self.build_with_stats().0
    }

    pub fn build_with_stats(self) -> (Graph, SimplifyStats) {
        let raw = Arc::new(build_raw(&self.state.ways));
        simplify(raw, self.options)
    }
}

/// Turns every consecutive point pair of every way into a pair of directed edges.
///
/// Segments whose endpoints snap to the same node are skipped.
#[instrument(level = "debug", skip_all, fields(ways = ways.len()))]
pub fn build_raw(ways: &[Way]) -> Graph {
    let mut graph = Graph::new();
    let mut degenerate = 0;

    for way in ways.iter().filter(|way| way.geometry.len() >= 2) {
        for pair in way.geometry.windows(2) {
            let [a, b] = pair else {
                continue;
            };

            let from = graph.add_node(*a);
            let to = graph.add_node(*b);
            if from == to {
                degenerate += 1;
                continue;
            }

            let (Some(from_node), Some(to_node)) = (graph.node(from), graph.node(to)) else {
                continue;
            };
            // measured between the snapped nodes so weights obey the triangle inequality
            let weight = distance(from_node, to_node);
            graph.add_edge(from, to, weight, way.meta.clone());
            graph.add_edge(to, from, weight, way.meta.clone());
        }
    }

    if degenerate > 0 {
        debug!("Skipped {degenerate} zero-length segments");
    }
    graph.log_summary("raw");

    graph
}
