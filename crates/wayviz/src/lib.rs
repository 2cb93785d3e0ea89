pub mod algorithms;
pub mod playback;
pub mod registry;

pub use algorithms::{Frame, Outcome, Phase, Run, RunOptions, Snapshot, Status, Step, Stepper};
pub use registry::{AlgorithmMetadata, Category, algorithms, get_algorithm_by_id};
pub use wayviz_graph as graph;
