//! wuj CLI - Command-line tool for packaged UI assets.
//!
//! Decodes layouts, control files and message catalogs to JSON and encodes
//! them back.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use wuj::prelude::*;

/// Extension of the textual form.
const TEXT_EXTENSION: &str = "json";

/// wuj - packaged UI asset converter
#[derive(Parser)]
#[command(name = "wuj")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode binary files to <file>.json
    Decode {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Format to decode as, instead of detecting it from the magic
        #[arg(short, long)]
        format: Option<Format>,

        /// Output directory (defaults to next to each input)
        #[arg(short, long, env = "WUJ_OUTPUT_DIR")]
        output: Option<PathBuf>,
    },

    /// Encode <name>.<ext>.json files back to <name>.<ext>
    Encode {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Format to encode as, instead of taking it from the inner extension
        #[arg(short, long)]
        format: Option<Format>,

        /// Output directory (defaults to next to each input)
        #[arg(short, long, env = "WUJ_OUTPUT_DIR")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy)]
enum Operation {
    Decode,
    Encode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode { inputs, format, output } => {
            run(Operation::Decode, &inputs, format, output.as_deref())?;
        }
        Commands::Encode { inputs, format, output } => {
            run(Operation::Encode, &inputs, format, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(operation: Operation, inputs: &[PathBuf], format: Option<Format>, output: Option<&Path>) -> Result<()> {
    if let Some(dir) = output {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if let [input] = inputs {
        let written = convert(operation, input, format, output)?;
        info!("{} -> {}", input.display(), written.display());
        return Ok(());
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let errors = AtomicUsize::new(0);

    inputs.par_iter().for_each(|input| {
        match convert(operation, input, format, output) {
            Ok(written) => debug!("{} -> {}", input.display(), written.display()),
            Err(e) => {
                errors.fetch_add(1, Ordering::Relaxed);
                pb.suspend(|| error!("{:#}", e));
            }
        }
        pb.inc(1);
    });

    pb.finish_and_clear();
    let errors = errors.load(Ordering::Relaxed);
    info!(
        "Converted {} of {} files in {:?}",
        inputs.len() - errors,
        inputs.len(),
        start.elapsed()
    );

    if errors > 0 {
        bail!("{} of {} files failed", errors, inputs.len());
    }
    Ok(())
}

/// Convert one file and return the path written.
fn convert(operation: Operation, input: &Path, format: Option<Format>, output: Option<&Path>) -> Result<PathBuf> {
    match operation {
        Operation::Decode => decode_file(input, format, output),
        Operation::Encode => encode_file(input, format, output),
    }
    .with_context(|| format!("Failed to convert {}", input.display()))
}

fn decode_file(input: &Path, format: Option<Format>, output: Option<&Path>) -> Result<PathBuf> {
    let data = fs::read(input).context("Failed to read input file")?;
    let format = match format {
        Some(format) => format,
        None => Format::detect_or_err(&data)?,
    };

    let record = format.decode(&data)?;
    let text = serde_json::to_string_pretty(&record).context("Failed to serialize JSON")?;

    let mut name = file_name(input)?.to_os_string();
    name.push(".");
    name.push(TEXT_EXTENSION);
    let path = output_path(input, output, Path::new(&name));

    fs::write(&path, text + "\n").context("Failed to write output file")?;
    Ok(path)
}

fn encode_file(input: &Path, format: Option<Format>, output: Option<&Path>) -> Result<PathBuf> {
    let is_text = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION));
    if !is_text {
        bail!("Expected a .{} file", TEXT_EXTENSION);
    }

    let format = match format.or_else(|| Format::from_text_path(input)) {
        Some(format) => format,
        None => {
            let inner = input
                .file_stem()
                .map(Path::new)
                .and_then(Path::extension)
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(wuj::Error::UnknownFormat(inner)).context("Pass --format to choose one");
        }
    };

    let text = fs::read_to_string(input).context("Failed to read input file")?;
    let record: Record = serde_json::from_str(&text).context("Failed to parse JSON")?;
    let data = format.encode(&record)?;

    // menu.brlyt.json -> menu.brlyt; menu.json -> menu.<format>
    let stem = Path::new(input.file_stem().context("Input has no file name")?);
    let name = match Format::from_text_path(input) {
        Some(_) => stem.to_path_buf(),
        None => stem.with_extension(format.extension()),
    };
    let path = output_path(input, output, &name);

    fs::write(&path, data).context("Failed to write output file")?;
    Ok(path)
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().context("Input has no file name")
}

/// Place `name` in the output directory, or next to the input.
fn output_path(input: &Path, output: Option<&Path>, name: &Path) -> PathBuf {
    match output {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}
