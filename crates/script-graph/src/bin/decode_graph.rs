use std::process::ExitCode;

use script_graph::Decoder;
use script_graph::config::DecoderConfig;
use script_graph::logger::init_log;
use script_graph::traced::TracedGraph;
use script_graph::walk::decode_graph;

/// Decodes a traced graph dump and prints the decoded tree as JSON.
fn main() -> ExitCode {
    let Some(graph_file) = std::env::args().nth(1) else {
        eprintln!("Usage: decode-graph <graph.json> [config.json]");
        return ExitCode::FAILURE;
    };
    let config_file = std::env::args().nth(2);

    match run(&graph_file, config_file.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The logger may not be installed yet.
            eprintln!("decode-graph: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(graph_file: &str, config_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_file {
        Some(file) => DecoderConfig::load(file)?,
        None => DecoderConfig::default(),
    };
    init_log(config.log_level.into())?;

    log::info!("Decoding {graph_file}");
    let graph = TracedGraph::load(graph_file)?;
    let types = config.type_table();
    let decoded = decode_graph(&Decoder::with_types(graph.root(), &types))?;
    log::info!("Decoded {} nodes", decoded.node_count());

    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}
