use chrono::NaiveDateTime;
use clap::Parser;
use roteiro::prelude::*;
use roteiro::runner::ExpectedInput;
use roteiro::transport::FixedClock;
use serde::Deserialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Editor Export Format) ---
// The canvas editor nests each node's settings under `data`; only used here for conversion.

#[derive(Deserialize)]
struct EditorFlow {
    #[serde(default)]
    id: Option<String>,
    nodes: Vec<EditorNode>,
    #[serde(default)]
    edges: Vec<EditorEdge>,
}

#[derive(Deserialize)]
struct EditorNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct EditorEdge {
    #[serde(default)]
    id: String,
    source: String,
    target: String,
    #[serde(default, alias = "sourceHandle")]
    source_handle: Option<String>,
}

// --- Converter Implementation ---

impl IntoFlow for EditorFlow {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                let mut config = node.data;
                // Canvas-only fields.
                if let Some(object) = config.as_object_mut() {
                    object.remove("label");
                    object.remove("position");
                }
                FlowNodeDefinition::new(node.id, node.node_type, config)
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .enumerate()
            .map(|(index, edge)| {
                let id = if edge.id.is_empty() {
                    format!("edge-{}", index)
                } else {
                    edge.id
                };
                FlowEdgeDefinition::new(id, edge.source, edge.target, edge.source_handle.as_deref())
            })
            .collect();

        Ok(FlowDefinition {
            id: self.id,
            nodes,
            edges,
        })
    }
}

/// Runs a conversation flow in the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file (canonical or editor export format)
    flow_path: String,

    /// Path to an engine configuration JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a persisted run state. With --reply, resumes that run once
    #[arg(short, long)]
    state: Option<String>,

    /// Reply to deliver to the persisted run
    #[arg(short, long, requires = "state")]
    reply: Option<String>,

    /// Fixed local time for schedule checks, e.g. 2024-05-06T09:30
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Map an editor node type onto a built-in one, e.g. --map-type messageNode=message
    #[arg(long = "map-type", value_parser = parse_mapping)]
    type_mappings: Vec<(String, String)>,

    /// Drop edges wired out of terminal nodes instead of rejecting the flow
    #[arg(long)]
    lenient: bool,

    /// Print actions as JSON instead of a transcript
    #[arg(long)]
    json: bool,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {}", e))
}

fn parse_mapping(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(user, engine)| (user.trim().to_string(), engine.trim().to_string()))
        .ok_or_else(|| "expected USER_TYPE=ENGINE_TYPE".to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roteiro=info,warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let graph = load_graph(&cli);
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            EngineConfig::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid engine config: {}", e)))
        }
        None => EngineConfig::default(),
    };

    let mut builder = FlowRunner::builder(&graph)
        .with_config(config)
        .with_http_client(Box::new(UreqHttpClient));
    if let Some(now) = cli.now {
        builder = builder.with_clock(Box::new(FixedClock(now)));
    }
    let runner = builder.build();

    match (&cli.state, &cli.reply) {
        (Some(state_path), Some(reply)) => run_once(&runner, &cli, state_path, reply),
        (Some(state_path), None) => start_and_save(&runner, &cli, state_path),
        (None, _) => run_interactive(&runner, &cli),
    }
}

fn load_graph(cli: &Cli) -> FlowGraph {
    let json = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read flow file '{}': {}", cli.flow_path, e))
    });
    let raw: serde_json::Value = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow JSON: {}", e)));

    let is_editor_export = raw["nodes"]
        .as_array()
        .is_some_and(|nodes| nodes.iter().any(|node| node.get("data").is_some()));
    let definition = if is_editor_export {
        let editor: EditorFlow = serde_json::from_value(raw)
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid editor export: {}", e)));
        editor
            .into_flow()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert flow: {}", e)))
    } else {
        serde_json::from_value(raw)
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid flow definition: {}", e)))
    };

    let mut builder = FlowGraph::builder(definition).allow_terminal_edges(cli.lenient);
    for (user_type, engine_type) in &cli.type_mappings {
        builder = builder.with_type_mapping(user_type, engine_type);
    }
    builder
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Flow rejected: {}", e)))
}

/// Resumes a persisted run with one reply and writes the new state back.
fn run_once(runner: &FlowRunner, cli: &Cli, state_path: &str, reply: &str) {
    let snapshot = RunSnapshot::from_file(state_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load run state: {}", e)));
    let input = if reply == "/timeout" {
        RunInput::Timeout
    } else {
        RunInput::reply(reply)
    };
    let output = runner
        .resume(snapshot.state, input)
        .unwrap_or_else(|e| exit_with_error(&format!("Cannot resume run: {}", e)));
    print_output(&output, cli.json);
    save_state(runner, output.state, state_path);
}

fn start_and_save(runner: &FlowRunner, cli: &Cli, state_path: &str) {
    if Path::new(state_path).exists() {
        exit_with_error(&format!(
            "'{}' already holds a run; pass --reply to continue it",
            state_path
        ));
    }
    let output = runner.start();
    print_output(&output, cli.json);
    save_state(runner, output.state, state_path);
}

fn save_state(runner: &FlowRunner, state: RunState, state_path: &str) {
    let snapshot = RunSnapshot::new(runner.graph().id().map(str::to_string), state);
    snapshot
        .save(state_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to save run state: {}", e)));
    println!("State saved to '{}' ({})", state_path, TranscriptFormatter::format_status(&snapshot.state));
}

/// Runs the whole conversation in the terminal, reading replies from stdin.
fn run_interactive(runner: &FlowRunner, cli: &Cli) {
    println!("--- Roteiro Interactive Mode ---");
    println!("Type your replies. '/timeout' simulates an inactivity timeout, '/quit' cancels.\n");

    let mut output = runner.start();
    print_output(&output, cli.json);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while let RunStatus::AwaitingInput(expected) = &output.state.status {
        let hint = match expected {
            ExpectedInput::MenuChoice => "choice".to_string(),
            ExpectedInput::Answer(kind) => format!("{:?}", kind).to_lowercase(),
        };
        print!("> [{}] ", hint);
        io::stdout()
            .flush()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to flush stdout: {}", e)));

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => exit_with_error(&format!("Failed to read line: {}", e)),
            None => "/quit".to_string(),
        };

        let state = output.state;
        output = match line.trim() {
            "/quit" => runner.cancel(state),
            "/timeout" => resume_or_exit(runner, state, RunInput::Timeout),
            reply => resume_or_exit(runner, state, RunInput::reply(reply)),
        };
        print_output(&output, cli.json);
    }

    println!("\n--- Run Summary ---");
    println!("Status: {}", TranscriptFormatter::format_status(&output.state));
    println!("Path:   {}", TranscriptFormatter::format_path(&output.state));
    println!("Variables:");
    let mut variables: Vec<_> = output.state.variables.iter().collect();
    variables.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in variables {
        println!("  {} = {}", name, value);
    }
}

fn resume_or_exit(runner: &FlowRunner, state: RunState, input: RunInput) -> RunOutput {
    runner
        .resume(state, input)
        .unwrap_or_else(|e| exit_with_error(&format!("Cannot resume run: {}", e)))
}

fn print_output(output: &RunOutput, json: bool) {
    if output.actions.is_empty() {
        return;
    }
    if json {
        let rendered = serde_json::to_string_pretty(&output.actions)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode actions: {}", e)));
        println!("{}", rendered);
    } else {
        println!("{}", TranscriptFormatter::format_actions(&output.actions));
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
