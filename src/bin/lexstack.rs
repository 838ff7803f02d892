//! Command-line interface for lexstack
//! Runs a stack of tokenizer layers over a file (or stdin) and prints the spans.
//!
//! Usage:
//!   lexstack tokenize [`<path>`] [--config `<file>`] [--pattern `<re>`]... [--preset `<name>`]...
//!                     [--rematch] [--keep-blank] [--format text|json|yaml]
//!   lexstack presets                                - List built-in patterns
//!
//! Layers and options are read from `./lexstack.toml` if it exists, then from
//! `--config`, then from the flags.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use lexstack::config::{self as settings, LayerConfig, Loader};
use lexstack::pipeline::{self, OutputFormat};
use lexstack::tokenizer::CharReader;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Picked up from the working directory when present, before `--config`.
const LOCAL_CONFIG: &str = "lexstack.toml";

fn main() {
    init_tracing();

    let matches = Command::new("lexstack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Split text into recognized and unrecognized spans with stacked patterns")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokenize")
                .about("Run the tokenizer stack over a file or stdin")
                .arg(
                    Arg::new("path")
                        .help("Input file; '-' or nothing reads stdin")
                        .index(1),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Pipeline configuration file (TOML)"),
                )
                .arg(
                    Arg::new("pattern")
                        .long("pattern")
                        .short('p')
                        .action(ArgAction::Append)
                        .help("Add a layer with this pattern (replaces configured layers)"),
                )
                .arg(
                    Arg::new("preset")
                        .long("preset")
                        .action(ArgAction::Append)
                        .help("Add a layer using a built-in preset (replaces configured layers)"),
                )
                .arg(
                    Arg::new("rematch")
                        .long("rematch")
                        .action(ArgAction::SetTrue)
                        .help("Re-match leftover text at end of input instead of leaving it unrecognized"),
                )
                .arg(
                    Arg::new("keep-blank")
                        .long("keep-blank")
                        .action(ArgAction::SetTrue)
                        .help("Keep empty and single-space spans"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: text, json or yaml")
                        .value_parser(["text", "json", "yaml"])
                        .default_value("text"),
                ),
        )
        .subcommand(Command::new("presets").about("List built-in patterns"))
        .get_matches();

    match matches.subcommand() {
        Some(("tokenize", tokenize_matches)) => handle_tokenize_command(tokenize_matches),
        Some(("presets", _)) => handle_presets_command(),
        _ => unreachable!(),
    }
}

/// Install the stderr subscriber, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Handle the tokenize command
fn handle_tokenize_command(matches: &ArgMatches) {
    let config = load_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    });

    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        });

    let input: Box<dyn Read> = match matches.get_one::<String>("path").map(String::as_str) {
        None | Some("-") => Box::new(io::stdin()),
        Some(path) => match std::fs::File::open(Path::new(path)) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error reading file: {}", e);
                std::process::exit(1);
            }
        },
    };

    // Assembly only fails on bad layers or patterns; reading starts on first pull.
    let tokenizer = pipeline::build(CharReader::new(input), &config).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    });

    let spans = tokenizer.collect_spans().unwrap_or_else(|e| {
        eprintln!("Tokenization error: {}", e);
        std::process::exit(1);
    });

    let output = pipeline::render(&spans, format).unwrap_or_else(|e| {
        eprintln!("Output error: {}", e);
        std::process::exit(1);
    });

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<settings::PipelineConfig, pipeline::PipelineError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("rematch") {
        loader = loader.set_override("options.flush", "rematch")?;
    }
    if matches.get_flag("keep-blank") {
        loader = loader.set_override("options.elide_blank", false)?;
    }
    let mut config = loader.build()?;

    // Command-line layers replace configured ones. Patterns and presets keep
    // their relative command-line order.
    let mut layers: Vec<(usize, LayerConfig)> = Vec::new();
    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("pattern"),
        matches.indices_of("pattern"),
    ) {
        layers.extend(indices.zip(values.map(LayerConfig::pattern)));
    }
    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("preset"),
        matches.indices_of("preset"),
    ) {
        layers.extend(indices.zip(values.map(LayerConfig::preset)));
    }
    if !layers.is_empty() {
        layers.sort_by_key(|(index, _)| *index);
        config.layers = layers.into_iter().map(|(_, layer)| layer).collect();
    }

    Ok(config)
}

/// Handle the presets command
fn handle_presets_command() {
    println!("Available presets:\n");
    for preset in settings::presets() {
        println!("  {}", preset.name);
        println!("    {}", preset.description);
        println!("    pattern: {}", preset.pattern);
    }
}
