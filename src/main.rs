//! # spycats Binary Entry Point
//!
//! ## Usage
//!
//! ```bash
//! spycats encode --carrier vangog.bmp --message "hello Я люблю ооп" --degree 2
//! spycats decode --carrier encode.bmp --degree 2
//! spycats capacity --carrier photo.png --degree 4 --json
//! ```
//!
//! Values missing on the command line come from `--config` (TOML), then from
//! built-in defaults.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::error;
use std::path::{Path, PathBuf};

use spycats::common::logging::init_logger;
use spycats::{
    capacity_report, decode_file, encode_file, output_path_for, CarrierFormat, Degree,
    SpycatsConfig,
};

/// Hide text in the least significant bits of an image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message in a carrier and write a new carrier
    Encode {
        /// Text to hide. Must not contain '@', '$' or '×'
        #[arg(short, long)]
        message: String,

        /// Carrier file to read
        #[arg(long)]
        carrier: PathBuf,

        /// Message bits per carrier unit: 1, 2, 4 or 8
        #[arg(short, long)]
        degree: Option<u8>,

        /// Where to write the new carrier. Defaults to the configured path,
        /// with its extension matched to the carrier format
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<CarrierFormat>,
    },

    /// Print the message hidden in a carrier
    Decode {
        #[arg(long)]
        carrier: PathBuf,

        #[arg(short, long)]
        degree: Option<u8>,

        #[arg(short, long, value_enum)]
        format: Option<CarrierFormat>,
    },

    /// Show how much text a carrier can hold
    Capacity {
        #[arg(long)]
        carrier: PathBuf,

        #[arg(short, long)]
        degree: Option<u8>,

        #[arg(short, long, value_enum)]
        format: Option<CarrierFormat>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn degree_or_default(arg: Option<u8>, config: &SpycatsConfig) -> Result<Degree> {
    let bits = arg.unwrap_or(config.codec.degree);
    Ok(Degree::new(bits)?)
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SpycatsConfig::from_file(path)?,
        None => SpycatsConfig::default(),
    };
    let header_len = config.codec.header_len;

    match args.command {
        Command::Encode {
            message,
            carrier,
            degree,
            output,
            format,
        } => {
            let degree = degree_or_default(degree, &config)?;
            let format = format.unwrap_or(config.output.format);
            let output = output.unwrap_or_else(|| {
                output_path_for(&carrier, Path::new(&config.output.path), format)
            });
            let report = encode_file(&message, degree, &carrier, &output, format, header_len)
                .with_context(|| format!("failed to encode into {}", carrier.display()))?;
            println!("Message hidden in {}", report.output.display());
        }
        Command::Decode {
            carrier,
            degree,
            format,
        } => {
            let degree = degree_or_default(degree, &config)?;
            let format = format.unwrap_or(config.output.format);
            let message = decode_file(degree, &carrier, format, header_len)
                .with_context(|| format!("failed to decode {}", carrier.display()))?;
            println!("{}", message);
        }
        Command::Capacity {
            carrier,
            degree,
            format,
            json,
        } => {
            let degree = degree_or_default(degree, &config)?;
            let format = format.unwrap_or(config.output.format);
            let report = capacity_report(degree, &carrier, format, header_len)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} carrier, degree {}: {} usable bits, up to {} encoded bytes",
                    report.format, report.degree, report.usable_bits, report.max_encoded_bytes
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
