use std::fmt::{self, Debug};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use wayviz_graph::Graph;

use crate::algorithms::{
    Run, RunOptions, astar::astar, bellman_ford::bellman_ford, bfs::bfs, dfs::dfs,
    dijkstra::dijkstra, kruskal::kruskal, prim::prim, random_edges::random_edges,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Traversal,
    ShortestPath,
    Mst,
    Demo,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Traversal => "traversal",
            Category::ShortestPath => "shortest-path",
            Category::Mst => "mst",
            Category::Demo => "demo",
        };
        f.pad(name)
    }
}

pub type Producer = for<'g> fn(&'g Graph, &RunOptions) -> Run<'g>;

#[derive(Clone, Copy, Serialize)]
pub struct AlgorithmMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub requires_source: bool,
    pub requires_sink: bool,
    #[serde(skip)]
    pub run: Producer,
}

impl AlgorithmMetadata {
    pub fn start<'g>(&self, graph: &'g Graph, options: &RunOptions) -> Run<'g> {
        (self.run)(graph, options)
    }
}

impl Debug for AlgorithmMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmMetadata")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("requires_source", &self.requires_source)
            .field("requires_sink", &self.requires_sink)
            .finish_non_exhaustive()
    }
}

static ALGORITHMS: [AlgorithmMetadata; 8] = [
    AlgorithmMetadata {
        id: "dfs",
        name: "Depth-First Search",
        description: "Follows each street as far as possible before backtracking",
        category: Category::Traversal,
        requires_source: false,
        requires_sink: false,
        run: dfs,
    },
    AlgorithmMetadata {
        id: "bfs",
        name: "Breadth-First Search",
        description: "Spreads out from the start one intersection at a time",
        category: Category::Traversal,
        requires_source: false,
        requires_sink: false,
        run: bfs,
    },
    AlgorithmMetadata {
        id: "dijkstra",
        name: "Dijkstra",
        description: "Settles intersections in order of their distance from the source",
        category: Category::ShortestPath,
        requires_source: true,
        requires_sink: true,
        run: dijkstra,
    },
    AlgorithmMetadata {
        id: "astar",
        name: "A*",
        description: "Dijkstra guided by the straight-line distance to the sink",
        category: Category::ShortestPath,
        requires_source: true,
        requires_sink: true,
        run: astar,
    },
    AlgorithmMetadata {
        id: "bellman-ford",
        name: "Bellman-Ford",
        description: "Relaxes every reachable street until all distances are final",
        category: Category::ShortestPath,
        requires_source: true,
        requires_sink: true,
        run: bellman_ford,
    },
    AlgorithmMetadata {
        id: "kruskal",
        name: "Kruskal",
        description: "Builds a minimum spanning tree from the shortest streets up",
        category: Category::Mst,
        requires_source: false,
        requires_sink: false,
        run: kruskal,
    },
    AlgorithmMetadata {
        id: "prim",
        name: "Prim",
        description: "Grows a minimum spanning tree from the start intersection",
        category: Category::Mst,
        requires_source: false,
        requires_sink: false,
        run: prim,
    },
    AlgorithmMetadata {
        id: "random-edges",
        name: "Random Edges",
        description: "Lights up streets in random order",
        category: Category::Demo,
        requires_source: false,
        requires_sink: false,
        run: random_edges,
    },
];

pub fn algorithms() -> impl Iterator<Item = &'static AlgorithmMetadata> {
    ALGORITHMS.iter()
}

pub fn get_algorithm_by_id(id: &str) -> Option<&'static AlgorithmMetadata> {
    ALGORITHMS.iter().find(|algorithm| algorithm.id == id)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static AlgorithmMetadata> {
    algorithms().filter(move |algorithm| algorithm.category == category)
}
