//! reflow_pages - Rebuild reading order for extracted PDF text fragments
//!
//! Reads pages of positioned fragments as JSON (a `{"pages": [...]}`
//! document or one page object per line) and writes one page record per
//! line, with merged fragments in reading order.
//!
//! Usage:
//!   reflow_pages pages.json
//!   reflow_pages --mode column-bands --output out.jsonl pages.jsonl
//!   extract_tool | reflow_pages -

use clap::{ArgAction, Parser, ValueEnum};
use layout_oxide::pipeline::{DocumentProcessor, JsonLinesSink, LayoutEngine, PageReader};
use layout_oxide::{LayoutConfig, ReadingOrderMode};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

/// Block ordering mode.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Top-to-bottom scan of the whole page
    VerticalScan,
    /// Read each column to the end of its band
    ColumnBands,
}

impl From<Mode> for ReadingOrderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::VerticalScan => ReadingOrderMode::VerticalScan,
            Mode::ColumnBands => ReadingOrderMode::ColumnBands,
        }
    }
}

/// Rebuild reading order for extracted PDF text fragments.
#[derive(Parser, Debug)]
#[command(name = "reflow_pages")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON file, or `-` for stdin
    input: PathBuf,

    /// Write page records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the reading order mode from the configuration
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Override the number of pages between memory checkpoints
    #[arg(long = "checkpoint-interval")]
    checkpoint_interval: Option<usize>,

    /// Print a processing summary to stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn run(args: Args) -> layout_oxide::Result<()> {
    let mut config = match &args.config {
        Some(path) => LayoutConfig::from_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(mode) = args.mode {
        config = config.with_reading_order_mode(mode.into());
    }
    if let Some(interval) = args.checkpoint_interval {
        config = config.with_checkpoint_interval(interval);
    }

    let processor = DocumentProcessor::new(LayoutEngine::with_config(config)?);

    let input: Box<dyn Read> = if args.input.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut sink = JsonLinesSink::new(output);
    let summary = processor.run(PageReader::new(input), &mut sink)?;

    if args.verbose {
        eprintln!(
            "{} pages, {} fragments -> {} merged ({} scripts, {} multi-column pages)",
            summary.pages,
            summary.fragments,
            summary.merged_fragments,
            summary.scripts,
            summary.multi_column_pages
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
