/// Decode a report container and print its normalized model.
///
/// ```bash
/// cargo run --example decode_pbix -- sales.pbix
/// cargo run --example decode_pbix -- sales.pbix --format json --data-only
/// RUST_LOG=pbixkit=debug cargo run --example decode_pbix -- sales.pbix
/// ```
use clap::{Parser, ValueEnum};
use pbixkit::{DecodeOptions, decode};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "decode_pbix")]
#[command(about = "Decode a Power BI report container into a normalized model")]
struct Cli {
    /// Path to a .pbix or .pbit file
    path: PathBuf,

    /// Output format
    #[arg(long, short = 'f', default_value = "text", value_enum)]
    format: OutputFormat,

    /// Decode only the data model
    #[arg(long, conflicts_with = "ui_only")]
    data_only: bool,

    /// Decode only the report layer
    #[arg(long)]
    ui_only: bool,

    /// Process pages sequentially
    #[arg(long)]
    sequential: bool,

    /// Exit with a failure code when any warning was recorded
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = DecodeOptions::new()
        .with_data_model(!cli.ui_only)
        .with_report(!cli.data_only)
        .with_parallel(!cli.sequential);

    let start = Instant::now();
    let doc = match decode(&cli.path, &options) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        },
    };
    let elapsed = start.elapsed();

    let output = match cli.format {
        OutputFormat::Text => doc.render_text(),
        OutputFormat::Json => doc.to_json(),
        OutputFormat::Yaml => doc.to_yaml(),
    };
    match output {
        Ok(text) => println!("{}", text),
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        },
    }

    eprintln!("decoded in {:?} with {} warnings", elapsed, doc.warnings.len());
    if cli.strict && !doc.is_complete() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
