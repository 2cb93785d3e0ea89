use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::{SeedableRng, rng, rngs::SmallRng, seq::index::sample};
use serde::Serialize;
use wayviz::{
    Category, Frame, RunOptions, algorithms, get_algorithm_by_id, playback::Playback,
};
use wayviz_graph::{
    Edge, Graph, GraphBuilder, Node, SimplifyOptions,
    builder::simplify::SimplifyStats,
    input::{RoutableFilter, read_overpass},
};

mod bench;

#[derive(Parser)]
#[command(version, about = "Animate graph algorithms on street networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct GraphArgs {
    /// Overpass JSON response ('out geom') with the ways to route on
    in_file: PathBuf,

    /// Only use the street classes of the default viewer query
    #[arg(long)]
    streets: bool,

    /// Keep rings without junctions as self-loops
    #[arg(long)]
    promote_cycles: bool,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// List the available algorithms
    List {
        #[arg(short, long)]
        category: Option<Category>,

        #[arg(long)]
        json: bool,
    },
    /// Build and simplify a graph
    Graph {
        #[command(flatten)]
        graph: GraphArgs,

        /// Write nodes and edges of the simplified graph as JSON to <FILE>
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,
    },
    /// Run one algorithm and print its frames
    Run {
        /// Algorithm id, see `wayviz list`
        algorithm: String,

        #[command(flatten)]
        graph: GraphArgs,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        sink: Option<String>,

        /// Pick source and sink at random
        #[arg(short, long, conflicts_with_all = ["source", "sink"])]
        random_endpoints: bool,

        /// Pause between frames
        #[arg(short, long, value_name = "MS", default_value_t = wayviz::algorithms::DEFAULT_DELAY_MS)]
        delay_ms: u64,

        #[arg(long)]
        seed: Option<u64>,

        /// Do not wait between frames
        #[arg(long)]
        no_pause: bool,

        /// Print every frame as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Run all algorithms concurrently on one graph
    Bench {
        #[command(flatten)]
        graph: GraphArgs,

        #[arg(short = 'n', long, default_value_t = 1)]
        repeat: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct GraphExport<'a> {
    nodes: Vec<&'a Node>,
    edges: &'a [Edge],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    tracing_log::LogTracer::init().context("failed to forward log records")?;

    match cli.command {
        Commands::List { category, json } => {
            let selected = algorithms().filter(|a| category.is_none_or(|c| a.category == c));
            for algorithm in selected {
                if json {
                    println!("{}", serde_json::to_string(algorithm)?);
                } else {
                    println!(
                        "{:<14}{:<15}{}",
                        algorithm.id, algorithm.category, algorithm.description
                    );
                }
            }
        }
        Commands::Graph { graph, out_file } => {
            let (graph, stats) = load_graph(&graph)?;
            println!("{stats:#?}");
            if let Some(rect) = graph.bounding_rect() {
                println!("bounds: {:?} - {:?}", rect.min(), rect.max());
            }

            if let Some(out_file) = out_file {
                let writer = BufWriter::new(
                    File::create(&out_file)
                        .with_context(|| format!("cannot create {}", out_file.display()))?,
                );
                let export = GraphExport {
                    nodes: graph.nodes().map(|(_, node)| node).collect(),
                    edges: graph.edges(),
                };
                serde_json::to_writer(writer, &export)?;
                info!("Wrote graph to {}", out_file.display());
            }
        }
        Commands::Run {
            algorithm,
            graph,
            source,
            sink,
            random_endpoints,
            delay_ms,
            seed,
            no_pause,
            json,
        } => {
            let algorithm = get_algorithm_by_id(&algorithm)
                .with_context(|| format!("unknown algorithm '{algorithm}', see `wayviz list`"))?;
            let (graph, _) = load_graph(&graph)?;

            let mut options = RunOptions::new().with_delay_ms(delay_ms);
            options.source = source.map(Into::into);
            options.sink = sink.map(Into::into);
            options.seed = seed;
            if random_endpoints {
                options = with_random_endpoints(&graph, options)?;
            }
            if algorithm.requires_source && options.source.is_none() {
                warn!("{} needs --source, the run will be skipped", algorithm.id);
            }
            if algorithm.requires_sink && options.sink.is_none() {
                warn!("{} needs --sink, the run will be skipped", algorithm.id);
            }

            let spinner = ProgressBar::new_spinner().with_message(algorithm.name);
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}: {pos} frames")?);
            let mut stdout = std::io::stdout().lock();
            let mut report = |frame: &Frame| -> anyhow::Result<()> {
                spinner.inc(1);
                if json {
                    serde_json::to_writer(&mut stdout, frame)?;
                    writeln!(stdout)?;
                }
                Ok(())
            };

            let mut run = algorithm.start(&graph, &options);
            if no_pause {
                for frame in run.by_ref() {
                    report(&frame)?;
                }
            } else {
                let mut playback = Playback::new(run);
                for frame in playback.by_ref() {
                    report(&frame)?;
                }
                run = playback.into_run();
            }
            spinner.finish();

            let outcome = run.finish();
            if json {
                println!("{}", serde_json::to_string(&outcome.status)?);
            } else {
                println!("{}: {}", algorithm.id, bench::describe(&outcome.status));
            }
        }
        Commands::Bench {
            graph,
            repeat,
            seed,
        } => {
            let (graph, _) = load_graph(&graph)?;
            let mut options = RunOptions::new().with_delay_ms(0);
            options.seed = seed;
            let options = with_random_endpoints(&graph, options)?;

            println!(
                "{}",
                bench::Measurements(bench::run_all(&graph, &options, repeat))
            );
        }
    }

    Ok(())
}

fn load_graph(args: &GraphArgs) -> anyhow::Result<(Graph, SimplifyStats)> {
    info!("Build graph from {:?}", args.in_file);
    let response = read_overpass(BufReader::new(open(&args.in_file)?))
        .with_context(|| format!("cannot read {}", args.in_file.display()))?;

    let filter = if args.streets {
        RoutableFilter::street_classes()
    } else {
        RoutableFilter::any_highway()
    };

    let (graph, stats) = GraphBuilder::new()
        .overpass(&response, &filter)
        .simplify_options(SimplifyOptions {
            promote_isolated_cycles: args.promote_cycles,
        })
        .build_with_stats();
    graph.validate()?;

    Ok((graph, stats))
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

fn with_random_endpoints(graph: &Graph, mut options: RunOptions) -> anyhow::Result<RunOptions> {
    if graph.node_count() < 2 {
        bail!("graph has {} nodes, need at least two", graph.node_count());
    }

    let picked = match options.seed {
        Some(seed) => sample(&mut SmallRng::seed_from_u64(seed), graph.node_count(), 2),
        None => sample(&mut rng(), graph.node_count(), 2),
    };
    let mut ids = picked
        .into_iter()
        .filter_map(|index| graph.node(index).map(|node| node.id().clone()));
    options.source = ids.next();
    options.sink = ids.next();
    debug!("Picked endpoints {:?} -> {:?}", options.source, options.sink);

    Ok(options)
}
