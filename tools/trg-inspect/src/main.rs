use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trg_dataformats::Limits;
use trg_inspect::{inspect, parse_primitive_size, InspectOptions, Report, DEFAULT_PRIMITIVE_SIZE};

#[derive(Parser, Debug)]
#[command(
    name = "trg-inspect",
    about = "Summarise a file of back-to-back trigger activity records."
)]
struct Args {
    /// File holding one or more encoded trigger activities
    file: PathBuf,

    /// Size of one trigger primitive in bytes (multiple of 8, 8..=256)
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_PRIMITIVE_SIZE,
        value_parser = parse_primitive_size
    )]
    primitive_size: usize,

    /// Reject records declaring more primitives than this
    #[arg(long, value_name = "N")]
    max_primitives: Option<usize>,

    /// Print a JSON document instead of one line per record
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Hex-dump every primitive
    #[arg(long, action = clap::ArgAction::SetTrue)]
    dump_primitives: bool,

    /// Exit with an error when the file holds a malformed record
    #[arg(long, action = clap::ArgAction::SetTrue)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;

    let opts = InspectOptions {
        primitive_size: args.primitive_size,
        limits: args.max_primitives.map(Limits::new).unwrap_or_default(),
        dump_primitives: args.dump_primitives,
    };
    let report = inspect(&bytes, &opts)?;

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report).context("write JSON report")?;
        writeln!(out)?;
    } else {
        print_text(&mut out, &report)?;
    }
    out.flush()?;

    tracing::info!(
        file = %args.file.display(),
        records = report.records.len(),
        primitives = report.total_primitives(),
        bytes = bytes.len(),
        "inspection finished"
    );

    if let Some(fault) = &report.fault {
        if args.strict {
            bail!("malformed record at offset {}: {}", fault.offset, fault.message);
        }
        tracing::warn!(offset = fault.offset, "stopped at malformed record: {}", fault.message);
    }
    Ok(())
}

fn print_text(out: &mut impl Write, report: &Report) -> io::Result<()> {
    for record in &report.records {
        writeln!(out, "{record}")?;
        for (i, prim) in record.primitives.iter().flatten().enumerate() {
            writeln!(out, "    [{i}] {prim}")?;
        }
    }
    Ok(())
}
