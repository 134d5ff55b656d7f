use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the registered format names from mmd-babel's FormatRegistry.
// Build scripts can't depend on the library they are building next to.
const AVAILABLE_FORMATS: &[&str] = &[
    "asciidoc", "coggle", "freemind", "markdown", "mindmup", "mmd", "novamind", "orgmode",
    "plantuml", "png", "svg", "text", "treeviz", "xmind",
];

fn format_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS))
        .value_hint(ValueHint::Other)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let input = || {
        Arg::new("input")
            .help("Input file path")
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };

    let mut cmd = Command::new("mmd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting mind maps")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a mmd.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between mind map formats")
                .arg(input())
                .arg(format_arg("from", "Source format"))
                .arg(format_arg("to", "Target format"))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the topic tree of a mind map")
                .arg(input())
                .arg(format_arg("from", "Source format")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "mmd", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "mmd", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "mmd", &outdir)?;

    Ok(())
}
