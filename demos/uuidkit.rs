//! Command that prints generated UUIDs or the validation or analysis of one
//!
//! ```text
//! uuidkit [-n count] [-v version] [-f format] [--namespace ns] [--name name] [--node node]
//! uuidkit validate <value>
//! uuidkit analyze <value>
//! ```

use std::{env, io, io::Write, process::ExitCode};

use uuidkit::{BulkOptions, Engine, Format, GenerateRequest, Version};

const USAGE: &str = "[-n count] [-v version] [-f format] [--namespace ns] [--name name] \
                     [--node node] | validate <value> | analyze <value>";

enum Command {
    Single(GenerateRequest),
    Bulk(BulkOptions),
    Validate(String),
    Analyze(String),
}

fn main() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let command = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} {}",
                    program.as_deref().unwrap_or("uuidkit"),
                    USAGE
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut engine = Engine::detect();
    let mut buf = io::BufWriter::new(io::stdout());
    let result = match command {
        Command::Single(request) => engine.generate(&request).map(|e| e.value),
        Command::Bulk(options) => engine.generate_bulk(&options).map(|items| {
            items
                .into_iter()
                .map(|e| e.value)
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::Validate(value) => to_json(&engine.validate(&value)),
        Command::Analyze(value) => engine.analyze(&value).and_then(|e| to_json(&e)),
    };

    match result {
        Ok(text) => {
            writeln!(buf, "{}", text)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn to_json(value: &impl serde::Serialize) -> uuidkit::Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| uuidkit::Error::Serialization(err.to_string()))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut options = BulkOptions::default();
    let mut name = None;
    while let Some(arg) = args.next() {
        if arg == "validate" || arg == "analyze" {
            let Some(value) = args.next() else {
                return Err(format!("argument to command '{}' missing", arg));
            };
            if let Some(extra) = args.next() {
                return Err(format!("unrecognized argument '{}'", extra));
            }
            return Ok(if arg == "validate" {
                Command::Validate(value)
            } else {
                Command::Analyze(value)
            });
        }

        let Some(value) = args.next() else {
            return Err(format!("argument to option '{}' missing", arg));
        };
        let duplicate = match arg.as_str() {
            "-n" => replace(&mut options.count, parse(&arg, &value)?),
            "-v" => {
                let number: u8 = parse(&arg, &value)?;
                let version = Version::try_from(number).map_err(|err| err.to_string())?;
                replace(&mut options.version, version)
            }
            "-f" => replace(&mut options.format, parse::<Format>(&arg, &value)?),
            "--namespace" => replace(&mut options.namespace, value),
            "--name" => replace(&mut name, value),
            "--node" => replace(&mut options.custom_node, value),
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        };
        if duplicate {
            return Err(format!("option '{}' given more than once", arg));
        }
    }

    // one value keeps the name as given; several get numbered names
    if options.count.unwrap_or(1) == 1 {
        return Ok(Command::Single(GenerateRequest {
            version: options.version,
            format: options.format,
            namespace: options.namespace,
            name,
            node: options.custom_node,
            sequential: false,
        }));
    }
    options.name_prefix = name;
    Ok(Command::Bulk(options))
}

fn parse<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid argument to option '{}': '{}'", option, value))
}

/// Stores `value` and returns whether the slot was already filled.
fn replace<T>(slot: &mut Option<T>, value: T) -> bool {
    slot.replace(value).is_some()
}
