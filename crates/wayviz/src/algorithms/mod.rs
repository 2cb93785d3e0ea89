//! Step-streaming graph algorithms.
//!
//! Every algorithm is an explicit state machine implementing [`Stepper`]. A
//! [`Run`] drives the state machine lazily: nothing happens until the next
//! [`Frame`] is requested, and dropping the run cancels it. Runs only borrow
//! the graph, so any number of them can walk the same graph at once.

use std::{iter::FusedIterator, time::Duration};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use wayviz_graph::{Edge, EdgeId, Graph, Node, NodeId};

pub mod astar;
pub mod bellman_ford;
mod best_first;
pub mod bfs;
pub mod dfs;
pub mod dijkstra;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod kruskal;
pub mod prim;
pub mod random_edges;
pub mod union_find;

pub const DEFAULT_DELAY_MS: u64 = 50;

/// Visited edges and nodes at one instant of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub visited_edges: FxHashSet<EdgeId>,
    pub visited_nodes: FxHashSet<NodeId>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.visited_edges.is_empty() && self.visited_nodes.is_empty()
    }

    pub fn is_superset(&self, other: &Snapshot) -> bool {
        self.visited_edges.is_superset(&other.visited_edges)
            && self.visited_nodes.is_superset(&other.visited_nodes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// The algorithm explores the graph. Snapshots only grow.
    Explore,
    /// A shortest path is replayed from the sink back to the source. The
    /// visited sets start empty again when this phase begins.
    Path,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub phase: Phase,
    /// How long to wait before requesting the next frame.
    #[serde(skip)]
    pub pause: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Status {
    /// A required endpoint was missing or unknown; nothing ran.
    #[default]
    Skipped,
    Completed,
    PathFound {
        distance: f64,
        edges: Vec<EdgeId>,
    },
    /// The sink is unreachable from the source.
    NoPath,
    Spanning {
        weight: f64,
        edges: usize,
    },
}

/// Terminal state of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    #[serde(flatten)]
    pub status: Status,
}

impl Outcome {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn path_distance(&self) -> Option<f64> {
        match self.status {
            Status::PathFound { distance, .. } => Some(distance),
            _ => None,
        }
    }
}

pub enum Step {
    Frame(Frame),
    Done(Outcome),
}

/// One algorithm run as a resumable state machine.
///
/// `step` advances the algorithm to its next snapshot. Once it returned
/// [`Step::Done`] it must not be called again.
pub trait Stepper: Send {
    fn step(&mut self) -> Step;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub source: Option<NodeId>,
    pub sink: Option<NodeId>,
    pub delay_ms: u64,
    /// Seed for algorithms that make random choices.
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            source: None,
            sink: None,
            delay_ms: DEFAULT_DELAY_MS,
            seed: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<NodeId>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_sink(mut self, sink: impl Into<NodeId>) -> Self {
        self.sink = Some(sink.into());
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Index of the given source node, or of the first node if none was given.
    pub(crate) fn start_node(&self, graph: &Graph) -> Option<usize> {
        match &self.source {
            Some(source) => graph.index_of(source.as_str()),
            None => graph.first_node(),
        }
    }

    /// Indices of source and sink, if both are given and known.
    pub(crate) fn endpoints(&self, graph: &Graph) -> Option<(usize, usize)> {
        let source = graph.index_of(self.source.as_ref()?.as_str())?;
        let sink = graph.index_of(self.sink.as_ref()?.as_str())?;
        Some((source, sink))
    }
}

/// A lazy, finite sequence of frames produced by one algorithm.
///
/// Iterating yields the frames; [`Run::outcome`] holds the terminal state
/// once the iterator is exhausted.
pub struct Run<'g> {
    stepper: Option<Box<dyn Stepper + 'g>>,
    outcome: Option<Outcome>,
}

impl<'g> Run<'g> {
    pub fn new(stepper: impl Stepper + 'g) -> Self {
        Self {
            stepper: Some(Box::new(stepper)),
            outcome: None,
        }
    }

    /// A run that yields no frames and ends with [`Status::Skipped`].
    pub fn skipped() -> Self {
        Self {
            stepper: None,
            outcome: Some(Outcome::skipped()),
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.stepper.is_none()
    }

    /// Drains the remaining frames without pausing and returns the outcome.
    pub fn finish(mut self) -> Outcome {
        while self.next().is_some() {}
        self.outcome.take().unwrap_or_default()
    }
}

impl Iterator for Run<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let stepper = self.stepper.as_mut()?;

        match stepper.step() {
            Step::Frame(frame) => Some(frame),
            Step::Done(outcome) => {
                self.outcome = Some(outcome);
                self.stepper = None;
                None
            }
        }
    }
}

impl FusedIterator for Run<'_> {}

/// Working set of visited edges and nodes owned by a single run.
#[derive(Debug, Default)]
pub(crate) struct Tracker {
    snapshot: Snapshot,
}

impl Tracker {
    pub fn visit_edge(&mut self, edge: &Edge) {
        self.snapshot.visited_edges.insert(edge.id().clone());
        self.snapshot.visited_nodes.insert(edge.from().clone());
        self.snapshot.visited_nodes.insert(edge.to().clone());
    }

    pub fn visit_node(&mut self, node: &Node) {
        self.snapshot.visited_nodes.insert(node.id().clone());
    }

    pub fn frame(&self, phase: Phase, pause: Duration) -> Step {
        Step::Frame(Frame {
            snapshot: self.snapshot.clone(),
            phase,
            pause,
        })
    }

    pub fn done(&self, status: Status) -> Step {
        Step::Done(Outcome {
            snapshot: self.snapshot.clone(),
            status,
        })
    }
}

/// Best known predecessor of a node: `(node, edge)` indices.
pub(crate) type Parents = FxHashMap<usize, (usize, usize)>;

/// Replays the parent chain from the sink back to the source.
///
/// Starts with empty visited sets. Ends with [`Status::NoPath`] as soon as a
/// node without a parent is met before the source is reached.
pub(crate) struct PathReplay<'g> {
    graph: &'g Graph,
    source: usize,
    current: usize,
    parents: Parents,
    distance: Option<f64>,
    edges: Vec<EdgeId>,
    tracker: Tracker,
    pause: Duration,
}

impl<'g> PathReplay<'g> {
    pub fn new(
        graph: &'g Graph,
        (source, sink): (usize, usize),
        parents: Parents,
        distance: Option<f64>,
        pause: Duration,
    ) -> Self {
        Self {
            graph,
            source,
            current: sink,
            parents,
            distance,
            edges: Vec::new(),
            tracker: Tracker::default(),
            pause,
        }
    }

    pub fn step(&mut self) -> Step {
        if self.current == self.source {
            if let Some(node) = self.graph.node(self.source) {
                self.tracker.visit_node(node);
            }
            let mut edges = std::mem::take(&mut self.edges);
            edges.reverse();
            return self.tracker.done(Status::PathFound {
                distance: self.distance.unwrap_or_default(),
                edges,
            });
        }

        let Some((edge, parent)) = self
            .parents
            .get(&self.current)
            .and_then(|(parent, edge)| Some((self.graph.edge(*edge)?, *parent)))
        else {
            return self.tracker.done(Status::NoPath);
        };

        self.tracker.visit_edge(edge);
        self.edges.push(edge.id().clone());
        self.current = parent;

        self.tracker.frame(Phase::Path, self.pause)
    }
}

/// Nodes reachable from `start` in breadth-first order, and every edge
/// leaving one of them.
pub(crate) fn reachable(graph: &Graph, start: usize) -> (Vec<usize>, Vec<usize>) {
    let mut seen = FxHashSet::from_iter([start]);
    let mut nodes = vec![start];
    let mut edges = Vec::new();
    let mut head = 0;

    while let Some(&node) = nodes.get(head) {
        head += 1;
        for (index, edge) in graph.out_edges(node) {
            edges.push(index);
            if seen.insert(edge.to_index()) {
                nodes.push(edge.to_index());
            }
        }
    }

    (nodes, edges)
}
