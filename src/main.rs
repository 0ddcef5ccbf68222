use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use wreckfest_loop_gen::{generate_event_loop, write_directives, EventLoop, EventLoopRequest};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Indented key = value listing
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Create a Wreckfest server config with a randomised event loop.
///
/// Start the server with `Wreckfest_x64 -s server_config=RandomMaps.cfg`.
#[derive(Debug, Parser)]
#[command(name = "random-maps", version)]
struct Args {
    /// Tab-separated track catalog (name, race type, area type, id)
    #[arg(long, default_value = "RandomMaps_tracks.tsv")]
    tracks: PathBuf,

    /// Tool and per-track settings; missing file means defaults
    #[arg(long, default_value = "RandomMaps.properties")]
    settings: PathBuf,

    /// Base server config copied to the output before the event loop
    #[arg(long, default_value = "RandomMaps_base.cfg")]
    base: PathBuf,

    /// Generated server config (overwritten)
    #[arg(long, short, default_value = "RandomMaps.cfg")]
    output: PathBuf,

    /// Seed for a reproducible event loop
    #[arg(long)]
    seed: Option<u64>,

    /// Print the per-track settings report
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("{} not found, using defaults", path.display());
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

fn print_event_loop(event_loop: &EventLoop) {
    println!("Event loop:");
    println!("------------------------------");
    for entry in &event_loop.entries {
        println!("{entry}");
    }
    println!("------------------------------");
}

fn write_config(args: &Args, base: &str, event_loop: &EventLoop) -> Result<()> {
    fs::write(&args.output, base)
        .with_context(|| format!("copying {} to {}", args.base.display(), args.output.display()))?;
    let file = OpenOptions::new()
        .append(true)
        .open(&args.output)
        .with_context(|| format!("opening {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    write_directives(&mut out, &event_loop.entries)
        .and_then(|()| out.flush())
        .with_context(|| format!("writing {}", args.output.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .init();

    let base = fs::read_to_string(&args.base)
        .with_context(|| format!("reading {}", args.base.display()))?;
    let catalog = fs::read_to_string(&args.tracks)
        .with_context(|| format!("reading {}", args.tracks.display()))?;
    let settings = read_optional(&args.settings)?;

    let mut request = EventLoopRequest::from_sources(&catalog, settings.as_deref(), Some(&base))
        .with_context(|| format!("loading {}", args.tracks.display()))?;
    request.rng_seed = args.seed;

    let event_loop = generate_event_loop(request)?;
    write_config(&args, &base, &event_loop)?;
    print_event_loop(&event_loop);

    if let Some(format) = args.report {
        match format {
            ReportFormat::Text => print!("{}", event_loop.report),
            ReportFormat::Json => println!("{}", event_loop.report.to_json()?),
        }
    }
    Ok(())
}
