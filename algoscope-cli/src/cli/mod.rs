//! Command-line interface for the algoscope step sequencer.
//!
//! The `graph` and `tree` commands build a model from flags or a JSON
//! scenario, compute the step sequence of the selected algorithm, and print
//! it. With `--animate` the sequence is then played back at the configured
//! cadence, one frame per line.

mod commands;
mod scenario;

pub use commands::{
    BinaryInsert, Cli, CliError, Command, EdgeArg, ExecutionSummary, GraphCommand,
    MalformedArgument, ModelSummary, OutputFormat, PlaybackArgs, TreeCommand, animate_summary,
    render_frame, render_summary, run_cli,
};
pub use scenario::{EdgeEntry, GraphScenario, InsertEntry, TreeScenario};
