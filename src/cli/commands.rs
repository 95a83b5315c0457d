use std::path::{Path, PathBuf};

use crate::emit::dot::emit_dot;
use crate::emit::order::{emit_order_json, emit_order_text, emit_order_yaml, to_order_report};
use crate::emit::render::{RenderGraph, project};
use crate::emit::report::{emit_report_json, emit_report_yaml, to_report};
use crate::graph::Graph;
use crate::graph::builder::build;
use crate::manifest::Manifest;
use crate::runner::display::{format_run, format_run_header, format_summary};
use crate::runner::executor::execute;

/// Load a manifest and build its graph, prefixing errors with the file name.
fn load_graph(manifest: &Path) -> Result<Graph, String> {
    let loaded = Manifest::load(manifest).map_err(|e| e.to_string())?;
    build(loaded.declarations()).map_err(|e| format!("{}: {e}", manifest.display()))
}

fn graph_name(manifest: &Path) -> String {
    manifest
        .file_stem()
        .map_or_else(|| "arbor".to_owned(), |s| s.to_string_lossy().into_owned())
}

fn write_or_return(output: Option<&PathBuf>, content: String, what: &str) -> Result<String, String> {
    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            Ok(format!("{what} written to {}\n", path.display()))
        }
        None => Ok(content),
    }
}

/// Run the `validate` command: build the graph without running anything.
///
/// # Errors
///
/// Returns an error string if the manifest cannot be loaded or the graph does not build.
pub fn run_validate(manifest: &Path) -> Result<String, String> {
    let graph = load_graph(manifest)?;
    Ok(format!(
        "{}: valid ({} groups, {} tests, {} dependencies)",
        manifest.display(),
        graph.len(),
        graph.test_count(),
        graph.dependency_count(),
    ))
}

/// Run the `order` command: print the execution order.
///
/// # Errors
///
/// Returns an error string if loading, building or emitting fails, or `format` is unknown.
pub fn run_order(manifest: &Path, format: &str) -> Result<String, String> {
    let graph = load_graph(manifest)?;
    let report = to_order_report(&graph);

    match format {
        "text" => Ok(emit_order_text(&report)),
        "json" => emit_order_json(&report).map(|json| json + "\n"),
        "yaml" => emit_order_yaml(&report),
        other => Err(format!(
            "unknown format '{other}' (expected: text, json, yaml)"
        )),
    }
}

/// Options for the `run` command.
pub struct RunOptions {
    pub manifest: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
    pub normalize: bool,
}

impl RunOptions {
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            format: "json".to_owned(),
            output: None,
            normalize: false,
        }
    }
}

/// What a finished `run` command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Rendered output, or a confirmation line when it went to a file.
    pub output: String,
    /// Whether no test failed.
    pub success: bool,
}

/// Run the `run` command: build, execute every test, and emit the result.
///
/// Per-group progress goes to stderr.
///
/// # Errors
///
/// Returns an error string if loading, building or emitting fails, or the format is unknown.
pub fn run_run(options: &RunOptions) -> Result<RunOutcome, String> {
    let emitter = match options.format.as_str() {
        "json" | "dot" | "report-json" | "report-yaml" => options.format.as_str(),
        other => {
            return Err(format!(
                "unknown format '{other}' (expected: json, dot, report-json, report-yaml)"
            ));
        }
    };

    let graph = load_graph(&options.manifest)?;
    let source = options.manifest.display().to_string();
    eprint!(
        "{}",
        format_run_header(&source, graph.len(), graph.test_count())
    );

    let state = execute(graph);
    eprintln!("{}", format_run(&state));
    eprintln!("{}", format_summary(&state));

    let render = || {
        let graph = project(&state);
        if options.normalize {
            graph.normalized()
        } else {
            graph
        }
    };

    let content = match emitter {
        "json" => render()
            .to_json()
            .map(|json| json + "\n")
            .map_err(|e| format!("json serialization failed: {e}"))?,
        "dot" => emit_dot(&render(), &graph_name(&options.manifest)),
        "report-json" => emit_report_json(&to_report(&state, &source)) + "\n",
        _ => emit_report_yaml(&to_report(&state, &source)),
    };

    Ok(RunOutcome {
        output: write_or_return(options.output.as_ref(), content, "results")?,
        success: state.success(),
    })
}

/// Run the `visualize` command: convert a saved render graph to DOT.
///
/// # Errors
///
/// Returns an error string if the file cannot be read, is not a render graph,
/// or the output cannot be written.
pub fn run_visualize(input: &Path, output: Option<&PathBuf>) -> Result<String, String> {
    let text = std::fs::read_to_string(input)
        .map_err(|e| format!("failed to read {}: {e}", input.display()))?;
    let graph =
        RenderGraph::from_json(&text).map_err(|e| format!("{}: {e}", input.display()))?;
    write_or_return(output, emit_dot(&graph, &graph_name(input)), "diagram")
}
