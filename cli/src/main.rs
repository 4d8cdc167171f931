use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use brine_fidl::{generate_from_json, inspect_to_json, FidlgenError, GeneratorConfig};

#[derive(Parser)]
#[command(name = "bfidl-dart")]
#[command(about = "Generate Dart bindings from FIDL JSON IR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write `fidl.dart`, `fidl_async.dart` and `fidl_test.dart` for a library
    Generate {
        /// FIDL JSON IR file
        #[arg(long)]
        json: PathBuf,

        /// Directory the binding files are written to
        #[arg(long)]
        output_base: PathBuf,

        /// Path to a `dartfmt` executable; output is left unformatted if omitted
        #[arg(long)]
        dartfmt: Option<PathBuf>,
    },

    /// Print the compiled generation model as JSON (to stdout)
    Inspect {
        /// FIDL JSON IR file
        #[arg(long)]
        json: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), FidlgenError> {
    match cli.command {
        Commands::Generate { json, output_base, dartfmt } => {
            let config = GeneratorConfig { output_base, dartfmt };
            let written = generate_from_json(&json, &config)?;
            tracing::info!(files = written.len(), "generated {}", json.display());
            Ok(())
        }

        Commands::Inspect { json } => {
            println!("{}", inspect_to_json(&json)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
