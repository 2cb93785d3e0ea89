use std::{fs, iter};

use approx::assert_relative_eq;
use rand::{SeedableRng, rngs::SmallRng, seq::index::sample};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use wayviz::{
    Category, Frame, Outcome, Phase, Run, RunOptions, Status, algorithms,
    algorithms::{
        astar::astar, bellman_ford::bellman_ford, dijkstra::dijkstra, kruskal::kruskal,
        prim::prim, random_edges::random_edges,
    },
    get_algorithm_by_id,
    registry::{Producer, by_category},
};
use wayviz_graph::{
    Graph, GraphBuilder, LatLon, NodeId, distance,
    input::{RoutableFilter, parse_overpass},
};

mod common;

fn drain(mut run: Run<'_>) -> (Vec<Frame>, Outcome) {
    let frames: Vec<Frame> = run.by_ref().collect();
    (frames, run.finish())
}

fn explored_nodes(frames: &[Frame]) -> usize {
    frames
        .iter()
        .filter(|frame| frame.phase == Phase::Explore)
        .last()
        .map_or(0, |frame| frame.snapshot.visited_nodes.len())
}

fn endpoint_pairs(graph: &Graph, count: usize, seed: u64) -> Vec<(NodeId, NodeId)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    iter::repeat_with(|| {
        let picked = sample(&mut rng, graph.node_count(), 2);
        (
            common::id(graph, picked.index(0)),
            common::id(graph, picked.index(1)),
        )
    })
    .take(count)
    .collect()
}

#[test]
fn distance_is_symmetric() {
    let graph = common::grid(4, 1);

    for (_, a) in graph.nodes() {
        assert_eq!(distance(a, a), 0.0);
        for (_, b) in graph.nodes() {
            assert_relative_eq!(distance(a, b), distance(b, a));
        }
    }
}

#[test]
fn shared_endpoints_become_one_node() {
    let graph = GraphBuilder::new()
        .ways([
            common::street(1, vec![LatLon::new(47.66, 9.17), LatLon::new(47.661, 9.17)]),
            common::street(
                2,
                vec![LatLon::new(47.6610000004, 9.1700000003), LatLon::new(47.661, 9.171)],
            ),
        ])
        .build_raw();

    assert_eq!(graph.node_count(), 3);
    let shared = graph.index_of(LatLon::new(47.661, 9.17).node_id().as_str()).unwrap();
    assert_eq!(graph.degree(shared), 2);
}

#[test]
fn fixture_filters_elements() {
    let json = fs::read_to_string(common::SMALL_TOWN).unwrap();
    let response = parse_overpass(&json).unwrap();

    let all = wayviz_graph::input::ways(&response, &RoutableFilter::any_highway());
    let streets = wayviz_graph::input::ways(&response, &RoutableFilter::street_classes());

    assert_eq!(all.len(), 12);
    assert_eq!(streets.len(), 11);
    assert!(all.iter().all(|way| way.geometry.len() >= 2));
}

#[test]
fn simplification_keeps_exact_weights() {
    let graph = common::small_town();
    let raw = graph.raw().unwrap();

    assert!(graph.node_count() < raw.node_count());
    assert!(graph.validate().is_ok());
    assert!(raw.validate().is_ok());

    for edge in graph.edges() {
        let sum = edge
            .sub_edges()
            .iter()
            .map(|id| raw.edge_by_id(id.as_str()).unwrap().weight())
            .fold(0.0, |acc, weight| acc + weight);
        assert_eq!(edge.weight(), sum, "weight of {}", edge.id());
        assert_eq!(edge.geometry().0.len(), edge.sub_edges().len() + 1);
    }

    // the detached street survives as one edge pair
    let far = LatLon::new(47.70, 9.25).node_id();
    let far = graph.index_of(far.as_str()).unwrap();
    assert_eq!(graph.degree(far), 1);
}

#[test]
fn shortest_paths_agree() {
    let graph = common::grid(6, 7);

    for (source, sink) in endpoint_pairs(&graph, 12, 3) {
        let options = RunOptions::new()
            .with_source(source.clone())
            .with_sink(sink.clone())
            .with_delay_ms(0);

        let (d_frames, d_outcome) = drain(dijkstra(&graph, &options));
        let (a_frames, a_outcome) = drain(astar(&graph, &options));
        let bellman_ford = bellman_ford(&graph, &options).finish();

        let d = d_outcome.path_distance().unwrap();
        assert_relative_eq!(a_outcome.path_distance().unwrap(), d, max_relative = 1e-9);
        assert_relative_eq!(bellman_ford.path_distance().unwrap(), d, max_relative = 1e-9);
        assert!(
            explored_nodes(&a_frames) <= explored_nodes(&d_frames),
            "{source} -> {sink}"
        );

        let Status::PathFound { edges, .. } = &d_outcome.status else {
            unreachable!();
        };
        let first = graph.edge_by_id(edges[0].as_str()).unwrap();
        let last = graph.edge_by_id(edges[edges.len() - 1].as_str()).unwrap();
        assert_eq!(first.from(), &source);
        assert_eq!(last.to(), &sink);
        let length: f64 = edges
            .iter()
            .map(|id| graph.edge_by_id(id.as_str()).unwrap().weight())
            .sum();
        assert_relative_eq!(length, d, max_relative = 1e-9);
    }
}

#[test]
fn square_scenario() {
    let (graph, [a, b, c, d]) = common::square();
    let options = RunOptions::new().with_source(a.clone()).with_sink(c.clone());

    let outcome = dijkstra(&graph, &options).finish();

    let Status::PathFound { distance, edges } = outcome.status else {
        panic!("no path in square");
    };
    assert_eq!(distance, 2.0);
    let hops: Vec<&str> = edges.iter().map(|id| id.as_str()).collect();
    let via_b = [format!("{a}->{b}"), format!("{b}->{c}")];
    let via_d = [format!("{a}->{d}"), format!("{d}->{c}")];
    assert!(hops == via_b || hops == via_d, "unexpected path {hops:?}");
}

#[test]
fn disconnected_sink_is_no_path() {
    let graph = common::small_town();
    let source = graph.first_node().map(|i| common::id(&graph, i)).unwrap();
    let sink = LatLon::new(47.70, 9.25).node_id();
    let options = RunOptions::new().with_source(source).with_sink(sink);

    let producers: [Producer; 3] = [bellman_ford, dijkstra, astar];
    for run in producers {
        let (frames, outcome) = drain(run(&graph, &options));
        assert_eq!(outcome.status, Status::NoPath);
        assert!(frames.iter().all(|frame| frame.phase == Phase::Explore));
    }
}

#[test]
fn single_node_graph_is_silent() {
    let graph = common::linked(&[(47.66, 9.17)], &[]);
    let options = RunOptions::new().with_source(common::id(&graph, 0));

    for algorithm in algorithms() {
        let (frames, outcome) = drain(algorithm.start(&graph, &options));
        assert!(frames.is_empty(), "{} produced frames", algorithm.id);
        assert!(outcome.snapshot.is_empty(), "{}", algorithm.id);
    }
}

#[test]
fn minimum_spanning_tree() {
    let graph = common::small_town();
    let start = graph.first_node().unwrap();
    let options = RunOptions::new().with_source(common::id(&graph, start));

    let (frames, kruskal) = drain(kruskal(&graph, &options));
    let prim = prim(&graph, &options).finish();

    let Status::Spanning { weight, edges } = kruskal.status else {
        panic!("kruskal did not span");
    };
    let Status::Spanning {
        weight: prim_weight,
        edges: prim_edges,
    } = prim.status
    else {
        panic!("prim did not span");
    };
    assert_relative_eq!(weight, prim_weight, max_relative = 1e-9);
    assert_eq!(edges, prim_edges);
    assert_eq!(frames.len(), edges);

    // a forest spanning exactly the component: n - 1 edges, no cycle
    let component = kruskal.snapshot.visited_nodes.len();
    assert_eq!(edges, component - 1);
    let mut roots: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    fn root(roots: &FxHashMap<NodeId, NodeId>, mut node: NodeId) -> NodeId {
        while let Some(parent) = roots.get(&node) {
            node = parent.clone();
        }
        node
    }
    for id in &kruskal.snapshot.visited_edges {
        let edge = graph.edge_by_id(id.as_str()).unwrap();
        let (from, to) = (
            root(&roots, edge.from().clone()),
            root(&roots, edge.to().clone()),
        );
        assert_ne!(from, to, "{id} closes a cycle");
        roots.insert(from, to);
    }

    let far = LatLon::new(47.70, 9.25).node_id();
    assert!(!kruskal.snapshot.visited_nodes.contains(&far));
}

#[test]
fn snapshots_only_grow_within_a_phase() {
    let graph = common::small_town();
    let options = RunOptions::new()
        .with_source(common::id(&graph, 0))
        .with_sink(common::id(&graph, graph.node_count() / 2))
        .with_seed(5);

    for algorithm in algorithms() {
        let (frames, outcome) = drain(algorithm.start(&graph, &options));
        assert!(!frames.is_empty(), "{} produced no frames", algorithm.id);

        let mut resets = 0;
        for pair in frames.windows(2) {
            if pair[0].phase == pair[1].phase {
                assert!(
                    pair[1].snapshot.is_superset(&pair[0].snapshot),
                    "{} shrank within a phase",
                    algorithm.id
                );
            } else {
                assert_eq!(pair[1].phase, Phase::Path);
                resets += 1;
            }
        }
        assert!(resets <= 1);

        if let Some(last) = frames.last() {
            assert!(outcome.snapshot.is_superset(&last.snapshot));
        }
    }
}

#[test]
fn random_edges_covers_every_edge_once() {
    let graph = common::small_town();

    let (frames, outcome) = drain(random_edges(&graph, &RunOptions::new()));

    assert_eq!(frames.len(), graph.edge_count());
    let all: FxHashSet<_> = graph.edges().iter().map(|e| e.id().clone()).collect();
    assert_eq!(outcome.snapshot.visited_edges, all);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.snapshot.visited_edges.len(), i + 1);
    }
}

#[test]
fn concurrent_runs_do_not_interfere() {
    let graph = common::grid(5, 11);
    let options = RunOptions::new()
        .with_source(common::id(&graph, 0))
        .with_sink(common::id(&graph, graph.node_count() - 1))
        .with_seed(9)
        .with_delay_ms(0);

    let sequential: Vec<Outcome> = algorithms()
        .map(|algorithm| algorithm.start(&graph, &options).finish())
        .collect();

    let parallel: Vec<Outcome> = algorithms()
        .collect::<Vec<_>>()
        .par_iter()
        .flat_map(|algorithm| {
            (0..4)
                .into_par_iter()
                .map(|_| algorithm.start(&graph, &options).finish())
                .collect::<Vec<_>>()
        })
        .collect();

    for (i, outcome) in parallel.iter().enumerate() {
        assert_eq!(outcome, &sequential[i / 4]);
    }
}

#[test]
fn interleaved_runs_share_one_graph() {
    let graph = common::grid(4, 2);
    let options = RunOptions::new()
        .with_source(common::id(&graph, 0))
        .with_sink(common::id(&graph, graph.node_count() - 1));

    let mut first = dijkstra(&graph, &options);
    let mut second = dijkstra(&graph, &options);
    let mut first_frames = Vec::new();
    let mut second_frames = Vec::new();
    loop {
        let (a, b) = (first.next(), second.next());
        if a.is_none() && b.is_none() {
            break;
        }
        first_frames.extend(a);
        second_frames.extend(b.map(|frame| frame.snapshot));
    }

    let first_frames: Vec<_> = first_frames.into_iter().map(|f| f.snapshot).collect();
    assert_eq!(first_frames, second_frames);
    assert_eq!(first.finish(), second.finish());
}

#[test]
fn abandoned_run_leaves_no_state() {
    let graph = common::grid(4, 3);
    let options = RunOptions::new().with_seed(1);

    let mut run = random_edges(&graph, &options);
    let partial: Vec<Frame> = run.by_ref().take(3).collect();
    drop(run);

    let fresh: Vec<Frame> = random_edges(&graph, &options).take(3).collect();
    for (a, b) in partial.iter().zip(&fresh) {
        assert_eq!(a.snapshot, b.snapshot);
    }
}

#[test]
fn registry_runs_every_algorithm() {
    let graph = common::grid(3, 4);
    let options = RunOptions::new()
        .with_source(common::id(&graph, 0))
        .with_sink(common::id(&graph, graph.node_count() - 1));

    for category in [
        Category::Traversal,
        Category::ShortestPath,
        Category::Mst,
        Category::Demo,
    ] {
        for algorithm in by_category(category) {
            let looked_up = get_algorithm_by_id(algorithm.id).unwrap();
            let outcome = looked_up.start(&graph, &options).finish();
            assert_ne!(outcome.status, Status::Skipped, "{}", algorithm.id);

            let without_endpoints = looked_up.start(&graph, &RunOptions::new()).finish();
            assert_eq!(
                without_endpoints.status == Status::Skipped,
                looked_up.requires_source || looked_up.requires_sink,
                "{}",
                algorithm.id
            );
        }
    }
}
