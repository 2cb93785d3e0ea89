#![allow(dead_code)]

use std::{fs::File, io::BufReader, sync::Arc};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use wayviz_graph::{
    Graph, GraphBuilder, LatLon, NodeId, WayMeta,
    input::{RoutableFilter, Way, read_overpass},
};

pub const SMALL_TOWN: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/small_town.json");

/// 5x5 street grid with a dead-end spur and one detached street.
pub fn small_town() -> Graph {
    let file = File::open(SMALL_TOWN).unwrap();
    let response = read_overpass(BufReader::new(file)).unwrap();

    GraphBuilder::new()
        .overpass(&response, &RoutableFilter::any_highway())
        .build()
}

/// `size` x `size` grid of streets with jittered intersections and one
/// intermediate point per block.
pub fn grid(size: usize, seed: u64) -> Graph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let step = 0.001;
    let points: Vec<Vec<LatLon>> = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| {
                    LatLon::new(
                        47.66 + row as f64 * step + rng.random_range(-0.0001..0.0001),
                        9.17 + col as f64 * step + rng.random_range(-0.0001..0.0001),
                    )
                })
                .collect()
        })
        .collect();

    let mut ways = Vec::new();
    let mut id = 0;
    for row in 0..size {
        for col in 0..size {
            let here = points[row][col];
            if col + 1 < size {
                id += 1;
                ways.push(street(id, line(here, points[row][col + 1], &mut rng)));
            }
            if row + 1 < size {
                id += 1;
                ways.push(street(id, line(here, points[row + 1][col], &mut rng)));
            }
        }
    }

    GraphBuilder::new().ways(ways).build()
}

fn line(from: LatLon, to: LatLon, rng: &mut SmallRng) -> Vec<LatLon> {
    let middle = LatLon::new(
        (from.lat + to.lat) / 2.0 + rng.random_range(-0.00003..0.00003),
        (from.lon + to.lon) / 2.0 + rng.random_range(-0.00003..0.00003),
    );
    vec![from, middle, to]
}

pub fn street(id: i64, geometry: Vec<LatLon>) -> Way {
    Way::new(
        id,
        [("highway".to_string(), "residential".to_string())],
        geometry,
    )
}

/// Graph from explicit nodes and undirected links with the given weights.
pub fn linked(points: &[(f64, f64)], links: &[(usize, usize, f64)]) -> Graph {
    let mut graph = Graph::new();
    let way = Arc::new(WayMeta::default());
    let nodes: Vec<usize> = points
        .iter()
        .map(|(lat, lon)| graph.add_node(LatLon::new(*lat, *lon)))
        .collect();

    for (a, b, weight) in links {
        graph.add_edge(nodes[*a], nodes[*b], *weight, way.clone());
        graph.add_edge(nodes[*b], nodes[*a], *weight, way.clone());
    }

    graph
}

/// A-B-C-D-A with unit weights. Nodes are returned in that order.
pub fn square() -> (Graph, [NodeId; 4]) {
    let graph = linked(
        &[(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)],
        &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)],
    );
    let ids = [0, 1, 2, 3].map(|i| id(&graph, i));

    (graph, ids)
}

pub fn id(graph: &Graph, index: usize) -> NodeId {
    graph.node(index).unwrap().id().clone()
}
