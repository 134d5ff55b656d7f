// Command-line interface for mmd
//
// This binary converts mind maps between the formats known to mmd-babel and prints tree
// outlines of them.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the input file
// extension, while being overwrittable by an explicit --from flag. The to can be omitted when
// -o names a file with a known extension.
// Usage:
//  mmd <input> --to <format> [--from <format>] [--output <file>]          - Convert (default)
//  mmd convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above
//  mmd inspect <input> [--from <format>]                                  - Tree outline
//  mmd --list-formats [--json]                                            - Known formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  mmd map.mm --to svg -o map.svg --extra-unfold-all --extra-scale 2
//
// Logging goes to stderr. -v raises the level (info, debug, trace); MMD_LOG takes an
// env-filter directive and wins over -v.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use mmd_babel::{ExportOptions, FormatRegistry, ImportOptions, MindMap, SerializedDocument};
use mmd_config::{Loader, MmdConfig};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "inspect", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        let key = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key {
            let value = args.get(i + 1).filter(|next| !next.starts_with('-'));
            match value {
                Some(value) => {
                    extra_params.insert(key.to_string(), value.clone());
                    i += 2;
                }
                None => {
                    extra_params.insert(key.to_string(), "true".to_string());
                    i += 1;
                }
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("mmd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting mind maps")
        .long_about(
            "mmd converts mind maps between FreeMind, Mindmup, XMind, Novamind, Coggle,\n\
            the native .mmd format and several outline and image formats.\n\n\
            Commands:\n  \
            - convert: Transform between formats (default command)\n  \
            - inspect: Print the topic tree as an outline\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            mmd map.mm --to markdown                   # Markdown outline on stdout\n  \
            mmd map.xmind --to freemind -o map.mm      # XMind to FreeMind\n  \
            mmd map.mm -o map.png --extra-unfold-all   # Render every branch to PNG\n  \
            mmd inspect map.mup                        # Tree outline",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("With --list-formats, print the list as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a mmd.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for debug and trace output)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the topic tree of a mind map")
                .long_about(
                    "Parse a mind map and print its topics as a box-drawing outline.\n\n\
                    Icons after a topic mark its note, link, file, jump, image and code.\n\n\
                    Extra Parameters:\n  \
                    --extra-full      List attributes, extras and snippets under each topic\n\n\
                    Examples:\n  \
                    mmd inspect map.mm\n  \
                    mmd inspect export.mm --from coggle --extra-full",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between mind map formats (default command)")
                .long_about(
                    "Convert mind maps between formats.\n\n\
                    The source format is auto-detected from the file extension; Coggle files\n\
                    share the .mm extension with FreeMind and need --from coggle.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    Image formats (png) can only be written to a file.\n\n\
                    Examples:\n  \
                    mmd convert map.mm --to plantuml            # PlantUML on stdout\n  \
                    mmd convert map.mup --to mmd -o map.mmd     # Mindmup to native\n  \
                    mmd map.mm --to svg -o map.svg              # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (detected from --output when omitted)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Use the format name, not the file extension.\n\
                            Run mmd --list-formats to see them.",
                        )
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    // If no subcommand is provided, inject "convert"
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    let registry = FormatRegistry::default();
    if matches.get_flag("list-formats") {
        handle_list_formats_command(&registry, matches.get_flag("json"));
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let input = required(sub_matches, "input");
            let from = resolve_source_format(&registry, sub_matches, input);
            handle_inspect_command(&registry, input, &from, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let from = resolve_source_format(&registry, sub_matches, input);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let to = match (sub_matches.get_one::<String>("to"), output) {
                (Some(to), _) => to.clone(),
                (None, Some(path)) => registry.detect_format_from_filename(path).unwrap_or_else(|| {
                    fail(format!(
                        "Could not detect the target format from '{path}'. Please specify --to explicitly"
                    ))
                }),
                (None, None) => fail("--to is required when writing to stdout"),
            };
            handle_convert_command(&registry, input, &from, &to, output, &extra_params, &config);
        }
        _ => fail("Unknown subcommand. Use --help for usage information."),
    }
}

/// Print `Error: <message>` and exit with status 1.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(|s| s.as_str())
        .unwrap_or_else(|| fail(format!("<{id}> is required")))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("MMD_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn resolve_source_format(registry: &FormatRegistry, matches: &ArgMatches, input: &str) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.clone();
    }
    registry.detect_format_from_filename(input).unwrap_or_else(|| {
        fail(format!(
            "Could not detect format from filename '{input}'. Please specify --from explicitly"
        ))
    })
}

fn folder_of(path: &str) -> PathBuf {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read and parse the input with the given format.
fn load_map(registry: &FormatRegistry, input: &str, from: &str, config: &MmdConfig) -> MindMap {
    let format = registry.get(from).unwrap_or_else(|e| fail(e));
    if !format.supports_parsing() {
        fail(format!("Format '{from}' can't be read, only written"));
    }
    let source = fs::read(input).unwrap_or_else(|e| fail(format!("Can't read '{input}': {e}")));
    let base_folder = config.import.base_folder().unwrap_or_else(|| folder_of(input));
    let options = ImportOptions::with_base_folder(base_folder);
    let map = registry
        .parse(&source, from, &options)
        .unwrap_or_else(|e| fail(format!("Can't parse '{input}': {e}")));
    tracing::info!(input, format = from, topics = map.topic_count(), "loaded");
    map
}

fn export_options(config: &MmdConfig, extra_params: &HashMap<String, String>) -> ExportOptions {
    config
        .export_options()
        .with_params(extra_params)
        .unwrap_or_else(|e| fail(e))
}

/// Handle the inspect command
fn handle_inspect_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    extra_params: &HashMap<String, String>,
    config: &MmdConfig,
) {
    let map = load_map(registry, input, from, config);
    let options = export_options(config, extra_params);
    let outline = registry
        .serialize_text(&map, "treeviz", &options)
        .unwrap_or_else(|e| fail(e));
    print!("{outline}");
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &MmdConfig,
) {
    // Validate the target before doing any work
    match registry.get(to) {
        Ok(format) if !format.supports_serialization() => {
            fail(format!("Format '{to}' can't be written, only read"))
        }
        Ok(_) => {}
        Err(e) => fail(e),
    }

    let map = load_map(registry, input, from, config);
    let mut options = export_options(config, extra_params);
    // File references are written relative to where the output lands
    options.base_folder = Some(output.map(folder_of).unwrap_or_else(|| folder_of(input)));

    let result = registry
        .serialize(&map, to, &options)
        .unwrap_or_else(|e| fail(format!("Can't export to {to}: {e}")));

    match (output, result) {
        (Some(path), data) => {
            fs::write(path, data.into_bytes())
                .unwrap_or_else(|e| fail(format!("Can't write '{path}': {e}")));
            tracing::info!(output = path, format = to, "written");
        }
        (None, SerializedDocument::Text(text)) => {
            print!("{text}");
        }
        (None, SerializedDocument::Binary(_)) => {
            fail(format!("Binary formats (like {to}) require an output file. Use -o <path>."))
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry, json: bool) {
    let formats = registry.formats();
    if json {
        let list: Vec<serde_json::Value> = formats
            .iter()
            .map(|f| {
                serde_json::json!({
                    "name": f.name(),
                    "description": f.description(),
                    "extensions": f.file_extensions(),
                    "import": f.supports_parsing(),
                    "export": f.supports_serialization(),
                })
            })
            .collect();
        match serde_json::to_string_pretty(&list) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(e),
        }
        return;
    }

    println!("Available formats:\n");
    for format in formats {
        let direction = match (format.supports_parsing(), format.supports_serialization()) {
            (true, true) => "in/out",
            (true, false) => "in",
            (false, true) => "out",
            (false, false) => "-",
        };
        let extensions = format
            .file_extensions()
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<10} {:<7} {:<18} {}",
            format.name(),
            direction,
            extensions,
            format.description()
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> MmdConfig {
    let loader = Loader::new().with_optional_file("mmd.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader
        .build()
        .unwrap_or_else(|err| fail(format!("Failed to load configuration: {err}")))
}

/// Theme and import settings that can be overridden per run with --extra-*.
fn apply_config_overrides(config: &mut MmdConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["scale"]) {
        config.theme.scale = match raw.trim().parse::<f32>() {
            Ok(scale) if scale > 0.0 => scale,
            _ => fail(format!("Invalid value '{raw}' for --extra-scale (expected a positive number)")),
        };
    }
    if let Some(raw) = take_override(extra_params, &["font-size"]) {
        config.theme.font_size = match raw.trim().parse::<f32>() {
            Ok(size) if size > 0.0 => size,
            _ => fail(format!("Invalid value '{raw}' for --extra-font-size (expected a positive number)")),
        };
    }
    if let Some(raw) = take_override(extra_params, &["drop-shadow"]) {
        config.theme.drop_shadow = parse_bool_arg("drop-shadow", &raw);
    }
    if let Some(folder) = take_override(extra_params, &["base-folder"]) {
        config.import.base_folder = folder;
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.remove(*key))
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => fail(format!("Invalid boolean value '{other}' for --extra-{flag}")),
    }
}
