//! Command implementations and argument parsing for the algoscope CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use algoscope_core::{
    Algorithm, AnimationDriver, AnimationFrame, ConfigError, Graph, GraphKind, Outcome,
    PlaybackConfig, RunParams, Side, StepSequence, TreeMode, Workbench, WorkbenchError,
    parse_tree_value, spawn_playback,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{Span, debug, field, info, instrument};

use super::scenario::{GraphScenario, TreeScenario};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "algoscope",
    about = "Step through graph and tree algorithms one state at a time."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run BFS, DFS, Kruskal or Prim over a graph.
    Graph(GraphCommand),
    /// Run a pre-, in- or post-order traversal over a binary tree.
    Tree(TreeCommand),
}

/// Options accepted by the `graph` command.
#[derive(Debug, Args, Clone)]
pub struct GraphCommand {
    /// Algorithm to sequence: `bfs`, `dfs`, `kruskal` or `prim`.
    #[arg(long, value_parser = Algorithm::from_str)]
    pub algorithm: Algorithm,

    /// Start node; required for BFS and DFS.
    #[arg(long)]
    pub start: Option<String>,

    /// Graph kind: `undirected`, `directed` or `weighted`.
    #[arg(long, value_parser = GraphKind::from_str, conflicts_with = "sample")]
    pub kind: Option<GraphKind>,

    /// Node to add; repeat for several nodes.
    #[arg(long = "node", conflicts_with = "sample")]
    pub nodes: Vec<String>,

    /// Edge to add as `SOURCE:TARGET[:WEIGHT]`; missing endpoints are created.
    #[arg(long = "edge", value_parser = EdgeArg::from_str, conflicts_with = "sample")]
    pub edges: Vec<EdgeArg>,

    /// JSON scenario describing the graph.
    #[arg(long, conflicts_with = "sample")]
    pub scenario: Option<PathBuf>,

    /// Use the built-in six-node weighted sample graph.
    #[arg(long)]
    pub sample: bool,

    /// Output and playback options.
    #[command(flatten)]
    pub playback: PlaybackArgs,
}

/// Options accepted by the `tree` command.
#[derive(Debug, Args, Clone)]
pub struct TreeCommand {
    /// Traversal to sequence: `preorder`, `inorder` or `postorder`.
    #[arg(long, value_parser = Algorithm::from_str)]
    pub algorithm: Algorithm,

    /// Insertion mode: `bst` or `binary`.
    #[arg(long, value_parser = TreeMode::from_str)]
    pub mode: Option<TreeMode>,

    /// Comma-separated values inserted in BST mode.
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_tree_value,
        allow_hyphen_values = true
    )]
    pub values: Vec<i64>,

    /// Root value. Starts a binary-mode tree, or is inserted first in BST mode.
    #[arg(long, allow_negative_numbers = true)]
    pub root: Option<i64>,

    /// Explicit placement as `VALUE:PARENT:SIDE`; binary mode only.
    #[arg(long = "insert", value_parser = BinaryInsert::from_str, allow_hyphen_values = true)]
    pub inserts: Vec<BinaryInsert>,

    /// JSON scenario describing the tree.
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Output and playback options.
    #[command(flatten)]
    pub playback: PlaybackArgs,
}

/// Output and playback options shared by both commands.
#[derive(Debug, Args, Clone, Default)]
pub struct PlaybackArgs {
    /// Play the sequence back one frame per step after printing it.
    #[arg(long)]
    pub animate: bool,

    /// Delay between frames in milliseconds, overriding the per-algorithm
    /// defaults.
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Rendering used for the summary and animation frames.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one explanation per line.
    #[default]
    Human,
    /// JSON documents.
    Json,
}

/// An edge given on the command line as `SOURCE:TARGET[:WEIGHT]`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EdgeArg {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Optional weight.
    pub weight: Option<u32>,
}

/// A binary-mode placement given as `VALUE:PARENT:SIDE`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BinaryInsert {
    /// Value to insert.
    pub value: i64,
    /// Value of the parent node.
    pub parent: i64,
    /// Child slot under the parent.
    pub side: Side,
}

/// A structured command-line value that could not be parsed.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("malformed argument `{raw}`; expected {expected}")]
pub struct MalformedArgument {
    raw: String,
    expected: &'static str,
}

impl FromStr for EdgeArg {
    type Err = MalformedArgument;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedArgument {
            raw: raw.to_owned(),
            expected: "SOURCE:TARGET[:WEIGHT]",
        };
        let mut parts = raw.split(':').map(str::trim);
        let (Some(source), Some(target)) = (parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let weight = parts
            .next()
            .map(str::parse::<u32>)
            .transpose()
            .map_err(|_| malformed())?;
        if parts.next().is_some() || source.is_empty() || target.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            source: source.to_owned(),
            target: target.to_owned(),
            weight,
        })
    }
}

impl FromStr for BinaryInsert {
    type Err = MalformedArgument;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedArgument {
            raw: raw.to_owned(),
            expected: "VALUE:PARENT:left|right",
        };
        let mut parts = raw.split(':').map(str::trim);
        let (Some(value), Some(parent), Some(side), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        Ok(Self {
            value: value.parse().map_err(|_| malformed())?,
            parent: parent.parse().map_err(|_| malformed())?,
            side: side.parse().map_err(|_| malformed())?,
        })
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading a scenario.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The scenario file is not valid JSON for the command.
    #[error("failed to parse scenario `{path}`: {source}")]
    Scenario {
        /// Scenario path.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The scenario parsed but names an unknown kind, mode or side.
    #[error("invalid scenario `{path}`: {reason}")]
    InvalidScenario {
        /// Scenario path.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
    /// The algorithm belongs to the other command.
    #[error("{algorithm} is not available under the `{command}` command")]
    WrongCommand {
        /// Requested algorithm.
        algorithm: Algorithm,
        /// Command that was invoked.
        command: &'static str,
    },
    /// The combination of options is not supported.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What was wrong.
        reason: &'static str,
    },
    /// The model or run was rejected by the core.
    #[error(transparent)]
    Workbench(#[from] WorkbenchError),
    /// The playback delay was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Writing frames to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// The playback runtime could not be started.
    #[error("failed to start the playback runtime: {source}")]
    Runtime {
        /// Underlying runtime builder error.
        #[source]
        source: io::Error,
    },
    /// The playback task panicked.
    #[error("playback task failed: {source}")]
    Playback {
        /// Join failure reported by tokio.
        #[source]
        source: JoinError,
    },
}

/// Shape of the model a sequence was computed over.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelSummary {
    /// A graph.
    Graph {
        /// Graph kind.
        kind: GraphKind,
        /// Node count.
        nodes: usize,
        /// Edge count.
        edges: usize,
    },
    /// A binary tree.
    Tree {
        /// Insertion mode used to build it.
        mode: TreeMode,
        /// Node count.
        nodes: usize,
        /// Height; a single node has height 1.
        height: usize,
    },
}

impl std::fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph { kind, nodes, edges } => {
                write!(f, "{kind} graph with {nodes} nodes and {edges} edges")
            }
            Self::Tree {
                mode,
                nodes,
                height,
            } => write!(f, "{mode} tree with {nodes} nodes, height {height}"),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Model the sequence was computed over.
    pub model: ModelSummary,
    /// The computed step sequence.
    pub sequence: StepSequence,
    /// Requested output format.
    pub format: OutputFormat,
    /// Frame delay when playback was requested.
    pub animation: Option<Duration>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the model cannot be built or the run is refused.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use algoscope_core::Algorithm;
/// # use algoscope_cli::cli::{Cli, Command, GraphCommand, PlaybackArgs, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli {
///     command: Command::Graph(GraphCommand {
///         algorithm: Algorithm::Kruskal,
///         start: None,
///         kind: None,
///         nodes: Vec::new(),
///         edges: Vec::new(),
///         scenario: None,
///         sample: true,
///         playback: PlaybackArgs::default(),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.sequence.total_cost(), Some(24));
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let summary = match cli.command {
        Command::Graph(graph) => {
            Span::current().record("command", field::display("graph"));
            run_graph(graph)?
        }
        Command::Tree(tree) => {
            Span::current().record("command", field::display("tree"));
            run_tree(tree)?
        }
    };

    info!(
        algorithm = %summary.sequence.algorithm(),
        steps = summary.sequence.len(),
        outcome = ?summary.sequence.outcome(),
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.graph",
    err,
    skip(command),
    fields(algorithm = %command.algorithm, source = field::Empty),
)]
pub(super) fn run_graph(command: GraphCommand) -> Result<ExecutionSummary, CliError> {
    let GraphCommand {
        algorithm,
        start,
        kind,
        nodes,
        edges,
        scenario,
        sample,
        playback,
    } = command;
    if algorithm.runs_on_tree() {
        return Err(CliError::WrongCommand {
            algorithm,
            command: "graph",
        });
    }

    let mut bench = Workbench::with_config(playback_config(&playback)?);
    let span = Span::current();
    let mut scenario_start = None;
    if sample {
        span.record("source", field::display("sample"));
        bench.replace_graph(Graph::sample())?;
    } else if let Some(path) = scenario.as_deref() {
        span.record("source", field::display("scenario"));
        let loaded: GraphScenario = load_scenario(path)?;
        scenario_start.clone_from(&loaded.start);
        apply_graph_scenario(&mut bench, loaded, kind, path)?;
    } else {
        span.record("source", field::display("flags"));
        bench.set_graph_kind(kind.unwrap_or_default())?;
    }

    for id in &nodes {
        bench.add_node(id)?;
    }
    for edge in &edges {
        add_edge(&mut bench, &edge.source, &edge.target, edge.weight)?;
    }

    let params = RunParams {
        start: start.or(scenario_start),
    };
    let sequence = bench.compute(algorithm, &params)?;
    let graph = bench.graph();
    Ok(ExecutionSummary {
        model: ModelSummary::Graph {
            kind: graph.kind(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        },
        sequence,
        format: playback.format,
        animation: playback
            .animate
            .then(|| bench.config().delay_for(algorithm)),
    })
}

fn apply_graph_scenario(
    bench: &mut Workbench,
    scenario: GraphScenario,
    kind_override: Option<GraphKind>,
    path: &Path,
) -> Result<(), CliError> {
    let declared = scenario
        .kind
        .as_deref()
        .map(GraphKind::from_str)
        .transpose()
        .map_err(|err| invalid_scenario(path, &err))?;
    bench.set_graph_kind(kind_override.or(declared).unwrap_or_default())?;
    for id in &scenario.nodes {
        bench.add_node(id)?;
    }
    for edge in &scenario.edges {
        add_edge(bench, &edge.source, &edge.target, edge.weight)?;
    }
    Ok(())
}

fn add_edge(
    bench: &mut Workbench,
    source: &str,
    target: &str,
    weight: Option<u32>,
) -> Result<(), CliError> {
    for id in [source.trim(), target.trim()] {
        if bench.graph().node_index(id).is_none() {
            bench.add_node(id)?;
        }
    }
    bench.add_edge(source, target, weight)?;
    Ok(())
}

#[instrument(
    name = "cli.tree",
    err,
    skip(command),
    fields(algorithm = %command.algorithm, mode = field::Empty),
)]
pub(super) fn run_tree(command: TreeCommand) -> Result<ExecutionSummary, CliError> {
    let TreeCommand {
        algorithm,
        mode,
        values,
        root,
        inserts,
        scenario,
        playback,
    } = command;
    if !algorithm.runs_on_tree() {
        return Err(CliError::WrongCommand {
            algorithm,
            command: "tree",
        });
    }

    let mut layout = TreeLayout {
        mode,
        root,
        values: Vec::new(),
        inserts: Vec::new(),
    };
    if let Some(path) = scenario.as_deref() {
        let loaded: TreeScenario = load_scenario(path)?;
        layout.absorb(loaded, path)?;
    }
    layout.values.extend(values);
    layout.inserts.extend(inserts);

    let tree_mode = layout.mode.unwrap_or_default();
    Span::current().record("mode", field::display(tree_mode));

    let mut bench = Workbench::with_config(playback_config(&playback)?);
    layout.build(&mut bench, tree_mode)?;

    let sequence = bench.compute(algorithm, &RunParams::default())?;
    let tree = bench.tree();
    Ok(ExecutionSummary {
        model: ModelSummary::Tree {
            mode: tree_mode,
            nodes: tree.len(),
            height: tree.height(),
        },
        sequence,
        format: playback.format,
        animation: playback
            .animate
            .then(|| bench.config().delay_for(algorithm)),
    })
}

/// Tree contents gathered from a scenario and the command line.
struct TreeLayout {
    mode: Option<TreeMode>,
    root: Option<i64>,
    values: Vec<i64>,
    inserts: Vec<BinaryInsert>,
}

impl TreeLayout {
    /// Merges a scenario underneath the command-line options.
    fn absorb(&mut self, scenario: TreeScenario, path: &Path) -> Result<(), CliError> {
        if self.mode.is_none() {
            self.mode = scenario
                .mode
                .as_deref()
                .map(TreeMode::from_str)
                .transpose()
                .map_err(|err| invalid_scenario(path, &err))?;
        }
        if self.root.is_none() {
            self.root = scenario.root;
        }
        self.values.extend(scenario.values);
        for entry in scenario.inserts {
            let side = entry
                .side
                .parse::<Side>()
                .map_err(|err| invalid_scenario(path, &err))?;
            self.inserts.push(BinaryInsert {
                value: entry.value,
                parent: entry.parent,
                side,
            });
        }
        Ok(())
    }

    fn build(self, bench: &mut Workbench, mode: TreeMode) -> Result<(), CliError> {
        match mode {
            TreeMode::Bst => {
                if !self.inserts.is_empty() {
                    return Err(CliError::InvalidOptions {
                        reason: "explicit placements need `--mode binary`",
                    });
                }
                for value in self.root.into_iter().chain(self.values) {
                    bench.insert_bst(value)?;
                }
            }
            TreeMode::Binary => {
                if !self.values.is_empty() {
                    return Err(CliError::InvalidOptions {
                        reason: "binary mode takes `--root` and `--insert`, not `--values`",
                    });
                }
                if let Some(value) = self.root {
                    bench.insert_root(value)?;
                }
                for insert in self.inserts {
                    bench.insert_binary(insert.value, insert.parent, insert.side)?;
                }
            }
        }
        Ok(())
    }
}

fn playback_config(args: &PlaybackArgs) -> Result<PlaybackConfig, CliError> {
    let Some(delay_ms) = args.delay_ms else {
        return Ok(PlaybackConfig::default());
    };
    Ok(PlaybackConfig::builder()
        .with_uniform_delay(Duration::from_millis(delay_ms))
        .build()?)
}

fn invalid_scenario(path: &Path, err: &impl std::fmt::Display) -> CliError {
    CliError::InvalidScenario {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[instrument(name = "cli.load_scenario", err, fields(path = field::Empty))]
pub(super) fn load_scenario<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Scenario {
        path: path.to_path_buf(),
        source,
    })
}

/// Human-readable description of how a run ended.
pub(super) fn describe_outcome(outcome: Outcome) -> String {
    match outcome {
        Outcome::Complete => "complete".to_owned(),
        Outcome::Partial { reached, total } => {
            format!("partial: reached {reached} of {total} nodes")
        }
        Outcome::Forest { components } => format!("spanning forest of {components} trees"),
    }
}

#[derive(Serialize)]
struct SummaryView<'a> {
    model: ModelSummary,
    #[serde(flatten)]
    sequence: &'a StepSequence,
    total_cost: Option<u64>,
}

/// Renders `summary` to `writer` as text or pretty-printed JSON.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use algoscope_core::Algorithm;
/// # use algoscope_cli::cli::{Cli, Command, TreeCommand, PlaybackArgs, render_summary, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = run_cli(Cli {
///     command: Command::Tree(TreeCommand {
///         algorithm: Algorithm::Inorder,
///         mode: None,
///         values: vec![2, 1, 3],
///         root: None,
///         inserts: Vec::new(),
///         scenario: None,
///         playback: PlaybackArgs::default(),
///     }),
/// })?;
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.contains("2\tinorder visits 3 after 2"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let sequence = &summary.sequence;
    match summary.format {
        OutputFormat::Human => {
            writeln!(writer, "algorithm: {}", sequence.algorithm())?;
            writeln!(writer, "model: {}", summary.model)?;
            writeln!(writer, "steps: {}", sequence.len())?;
            writeln!(writer, "outcome: {}", describe_outcome(sequence.outcome()))?;
            if let Some(cost) = sequence.total_cost() {
                writeln!(writer, "total cost: {cost}")?;
            }
            for record in sequence.steps() {
                writeln!(writer, "{}\t{record}", record.index())?;
            }
            for rejected in sequence.trailing_rejected() {
                writeln!(writer, "skipped: {rejected} would close a cycle")?;
            }
        }
        OutputFormat::Json => {
            let view = SummaryView {
                model: summary.model,
                sequence,
                total_cost: sequence.total_cost(),
            };
            serde_json::to_writer_pretty(&mut writer, &view)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Renders one animation frame as a single line.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_frame(
    frame: &AnimationFrame,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => writeln!(
            writer,
            "[{}/{}] {}",
            frame.position().saturating_add(1),
            frame.total,
            frame.step
        ),
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, frame)?;
            writeln!(writer)
        }
    }
}

/// Plays the summary's sequence back at its frame delay, writing one line
/// per frame and flushing after each.
///
/// Returns the number of frames written, which is zero when playback was
/// not requested.
///
/// # Errors
/// Returns [`CliError`] when the runtime cannot start, writing fails, or the
/// playback task panics.
#[instrument(
    name = "cli.animate",
    err,
    skip(summary, writer),
    fields(algorithm = %summary.sequence.algorithm(), delay = field::Empty),
)]
pub fn animate_summary(
    summary: &ExecutionSummary,
    mut writer: impl Write,
) -> Result<usize, CliError> {
    let Some(delay) = summary.animation else {
        return Ok(0);
    };
    Span::current().record("delay", field::debug(delay));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|source| CliError::Runtime { source })?;

    runtime.block_on(async {
        let mut driver = AnimationDriver::new();
        let run = driver
            .start(summary.sequence.clone(), delay)
            .map_err(WorkbenchError::from)?;

        let (frames, mut received) = mpsc::unbounded_channel::<AnimationFrame>();
        let playback = spawn_playback(
            Arc::new(Mutex::new(driver)),
            run,
            delay,
            move |frame: &AnimationFrame| {
                if frames.send(frame.clone()).is_err() {
                    debug!("frame receiver closed");
                }
            },
        );

        let mut written = 0_usize;
        while let Some(frame) = received.recv().await {
            render_frame(&frame, summary.format, &mut writer)?;
            writer.flush()?;
            written = written.saturating_add(1);
        }

        let outcome = playback
            .join()
            .await
            .map_err(|source| CliError::Playback { source })?;
        info!(published = outcome.published(), "animation finished");
        Ok::<usize, CliError>(written)
    })
}
