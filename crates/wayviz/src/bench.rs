use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use log::debug;
use rayon::prelude::*;
use wayviz::{AlgorithmMetadata, RunOptions, Status, algorithms};
use wayviz_graph::Graph;

pub struct Measurement {
    pub id: &'static str,
    pub frames: usize,
    pub elapsed: Duration,
    pub status: Status,
}

/// Drains every registered algorithm `repeat` times over the same graph,
/// with all runs in flight at once.
pub fn run_all(graph: &Graph, options: &RunOptions, repeat: usize) -> Vec<Measurement> {
    let runs: Vec<(&'static AlgorithmMetadata, usize)> = algorithms()
        .flat_map(|algorithm| (0..repeat).map(move |i| (algorithm, i)))
        .collect();

    let mut measurements: Vec<Measurement> = runs
        .par_iter()
        .map(|(algorithm, i)| {
            let start = Instant::now();
            let mut run = algorithm.start(graph, options);
            let frames = run.by_ref().count();
            let outcome = run.finish();
            debug!("{} #{i} finished after {frames} frames", algorithm.id);

            Measurement {
                id: algorithm.id,
                frames,
                elapsed: start.elapsed(),
                status: outcome.status,
            }
        })
        .collect();

    measurements.sort_by_key(|m| m.id);
    measurements
}

pub struct Measurements(pub Vec<Measurement>);

impl Display for Measurements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "algorithm \t frames \t time \t result")?;
        for m in &self.0 {
            writeln!(
                f,
                "{} \t {} \t {:?} \t {}",
                m.id,
                m.frames,
                m.elapsed,
                describe(&m.status)
            )?;
        }
        Ok(())
    }
}

pub fn describe(status: &Status) -> String {
    match status {
        Status::Skipped => "skipped".to_string(),
        Status::Completed => "completed".to_string(),
        Status::PathFound { distance, edges } => {
            format!("path of {distance:.1} m over {} edges", edges.len())
        }
        Status::NoPath => "no path".to_string(),
        Status::Spanning { weight, edges } => {
            format!("spanning tree of {weight:.1} m over {edges} edges")
        }
    }
}
