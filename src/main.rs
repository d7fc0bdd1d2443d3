use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::bail;

use skinkit::{init_logging, load_config, skin_file, SkinConfig, VERSION};

const USAGE: &str = "usage: skinkit <input.gcode> [--config <skin.json>] [-o <output.gcode>]";

struct Arguments {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_arguments() -> anyhow::Result<Option<Arguments>> {
    let mut input = None;
    let mut output = None;
    let mut config = None;
    let mut arguments = std::env::args().skip(1);
    while let Some(argument) = arguments.next() {
        match argument.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("skinkit {VERSION}");
                return Ok(None);
            }
            "--config" => match arguments.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config needs a path\n{USAGE}"),
            },
            "-o" | "--output" => match arguments.next() {
                Some(path) => output = Some(PathBuf::from(path)),
                None => bail!("{argument} needs a path\n{USAGE}"),
            },
            _ if argument.starts_with('-') => bail!("unknown option {argument}\n{USAGE}"),
            _ => {
                if input.replace(PathBuf::from(argument)).is_some() {
                    bail!("more than one input file\n{USAGE}");
                }
            }
        }
    }
    let Some(input) = input else {
        bail!("no input file\n{USAGE}");
    };
    Ok(Some(Arguments {
        input,
        output,
        config,
    }))
}

fn run() -> anyhow::Result<()> {
    let Some(arguments) = parse_arguments()? else {
        return Ok(());
    };
    let config = match &arguments.config {
        Some(path) => load_config(path)?,
        // Running the tool by hand implies wanting the stage on.
        None => SkinConfig {
            activate: true,
            ..Default::default()
        },
    };
    skin_file(&arguments.input, arguments.output.as_deref(), &config)?;
    Ok(())
}

fn main() -> ExitCode {
    if init_logging().is_err() {
        eprintln!("logging initialization failed");
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("skinkit: {error:#}");
            ExitCode::FAILURE
        }
    }
}
