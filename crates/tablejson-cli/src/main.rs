//! `tjson` CLI — convert between table-constructor literals and JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Table literal to JSON (stdin → stdout)
//! echo '{ name = "x", n = 3 }' | tjson encode
//!
//! # Empty tables as [] instead of {}
//! tjson encode --empty-as-array -i config.lua -o config.json
//!
//! # JSON to table literal; malformed input prints `nil`
//! tjson decode -i data.json
//!
//! # Fail on malformed JSON instead of printing `nil`
//! tjson decode --strict -i data.json
//!
//! # JSON → table → JSON, showing what the table model keeps
//! echo '{"a":[],"b":{}}' | tjson normalize --empty-as-array
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tablejson_core::{literal, EncodeOptions, KeyPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tjson",
    version,
    about = "Convert between table-constructor literals and JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a table-constructor literal as compact JSON
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Encode empty tables as [] instead of {}
        #[arg(long)]
        empty_as_array: bool,
        /// Drop float and boolean keys from objects instead of stringifying them
        #[arg(long)]
        drop_non_string_keys: bool,
    },
    /// Decode JSON into a table-constructor literal
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Fail on malformed JSON instead of printing nil
        #[arg(long)]
        strict: bool,
    },
    /// Decode JSON into tables and encode it again
    Normalize {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Encode empty tables as [] instead of {}
        #[arg(long)]
        empty_as_array: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            output,
            empty_as_array,
            drop_non_string_keys,
        } => {
            let text = read_input(input.as_deref())?;
            let value = literal::parse(&text).context("Failed to parse table literal")?;
            let key_policy = if drop_non_string_keys {
                KeyPolicy::Drop
            } else {
                KeyPolicy::Stringify
            };
            let options = EncodeOptions::new()
                .empty_table_as_array(empty_as_array)
                .key_policy(key_policy);
            let json = tablejson_core::encode_with(&value, &options)
                .context("Failed to encode table as JSON")?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Decode {
            input,
            output,
            strict,
        } => {
            let json = read_input(input.as_deref())?;
            let value = if strict {
                tablejson_core::decode_strict(&json).context("Failed to decode JSON")?
            } else {
                tablejson_core::decode(&json)
            };
            write_output(output.as_deref(), &literal::render(&value))?;
        }
        Commands::Normalize {
            input,
            output,
            empty_as_array,
        } => {
            let json = read_input(input.as_deref())?;
            let value = tablejson_core::decode_strict(&json).context("Failed to decode JSON")?;
            let normalized = tablejson_core::encode(&value, empty_as_array)
                .context("Failed to encode table as JSON")?;
            write_output(output.as_deref(), &normalized)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for piping.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    let text = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    tracing::debug!(bytes = text.len(), "read input");
    Ok(text)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
            tracing::info!(path, bytes = content.len(), "wrote output");
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
