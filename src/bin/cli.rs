//! fpset CLI
//!
//! Command-line interface for writing, inspecting and intersecting set files.
//! Text input is split into one record per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fpset::{Config, FpsetError, Record, SetWriter};
use tracing_subscriber::{fmt, EnvFilter};

/// fpset CLI
#[derive(Parser, Debug)]
#[command(name = "fpset-cli")]
#[command(about = "Write, read and intersect persistent set files")]
#[command(version)]
struct Args {
    /// Log progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip per-record fingerprint verification on read
    #[arg(long, global = true)]
    no_verify: bool,

    /// Skip fsync after writing
    #[arg(long, global = true)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write lines of text as records to a new set file
    Write {
        /// Destination set file
        out: PathBuf,

        /// Input text file (stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Print the records of a set file, one per line
    Read {
        /// The set file to read
        file: PathBuf,

        /// Print each distinct record once
        #[arg(short, long)]
        unique: bool,
    },

    /// Validate set files and print their summaries
    Verify {
        /// Set files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the records common to every set file
    Intersect {
        /// Set files; output follows the order of the first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Scan files 2..N on worker threads
        #[arg(short, long)]
        parallel: bool,

        /// Number of scan threads with --parallel
        #[arg(short = 't', long, default_value = "4")]
        threads: usize,

        /// Print only the number of common records
        #[arg(short, long)]
        count: bool,
    },
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.verbose { "info,fpset=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("fpset-cli: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Config::builder()
        .verify_fingerprints(!args.no_verify)
        .sync_on_finish(!args.no_sync);

    if let Commands::Intersect {
        parallel, threads, ..
    } = &args.command
    {
        builder = builder.parallel_scan(*parallel).scan_threads(*threads);
    }
    let config = builder.build();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Commands::Write { out: path, input } => {
            let lines: Box<dyn BufRead> = match input {
                Some(input) => {
                    let file = File::open(&input).map_err(|source| FpsetError::Io {
                        path: input.clone(),
                        source,
                    })?;
                    Box::new(BufReader::new(file))
                }
                None => Box::new(BufReader::new(io::stdin())),
            };

            let mut writer = SetWriter::create(&path, &config)?;
            for line in lines.split(b'\n') {
                let mut line = line?;
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                writer.append(&line)?;
            }
            let summary = writer.finish()?;
            writeln!(
                out,
                "{}: {} records, {} bytes",
                summary.path.display(),
                summary.record_count,
                summary.file_size
            )?;
        }
        Commands::Read { file, unique } => {
            let records = if unique {
                fpset::read_unique_set_with(&file, &config)?
            } else {
                fpset::read_set_with(&file, &config)?
            };
            print_records(&mut out, &records)?;
        }
        Commands::Verify { files } => {
            let mut failed = 0;
            for file in &files {
                match fpset::verify_set_with(file, &config) {
                    Ok(summary) => writeln!(
                        out,
                        "{}: ok, {} records, crc {:#010x}, {} bytes",
                        summary.path.display(),
                        summary.record_count,
                        summary.body_crc,
                        summary.file_size
                    )?,
                    Err(e) => {
                        failed += 1;
                        writeln!(out, "{}: FAILED: {}", file.display(), e)?;
                    }
                }
            }
            if failed > 0 {
                out.flush()?;
                return Err(format!("{} of {} files failed verification", failed, files.len()).into());
            }
        }
        Commands::Intersect { files, count, .. } => {
            let records = fpset::intersect_sets_with(&files, &config)?;
            if count {
                writeln!(out, "{}", records.len())?;
            } else {
                print_records(&mut out, &records)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn print_records<W: Write>(out: &mut W, records: &[Record]) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", String::from_utf8_lossy(record))?;
    }
    Ok(())
}
