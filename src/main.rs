use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use arbor::cli::commands::{self, RunOptions};
use arbor::logging;

const EXIT_TESTS_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Run grouped tests in dependency order and render the outcome as a graph",
    version
)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the test graph from a manifest without running it
    Validate {
        /// Manifest file
        manifest: PathBuf,
    },

    /// Print the execution order of a manifest
    Order {
        /// Manifest file
        manifest: PathBuf,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run every test of a manifest and emit the result
    Run {
        /// Manifest file
        manifest: PathBuf,

        /// Output format: json, dot, report-json, report-yaml
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort nodes and links in the emitted graph
        #[arg(long)]
        normalize: bool,
    },

    /// Convert a saved result graph (JSON) into a DOT diagram
    Visualize {
        /// Result graph JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn report(result: Result<String, String>) -> ExitCode {
    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Validate { manifest } => {
            report(commands::run_validate(&manifest).map(|line| line + "\n"))
        }
        Commands::Order { manifest, format } => report(commands::run_order(&manifest, &format)),
        Commands::Run {
            manifest,
            format,
            output,
            normalize,
        } => {
            let options = RunOptions {
                manifest,
                format,
                output,
                normalize,
            };
            match commands::run_run(&options) {
                Ok(outcome) => {
                    print!("{}", outcome.output);
                    if outcome.success {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(EXIT_TESTS_FAILED)
                    }
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
        Commands::Visualize { input, output } => {
            report(commands::run_visualize(&input, output.as_ref()))
        }
    }
}
