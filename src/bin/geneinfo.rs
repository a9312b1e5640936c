use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, error, info};

use geneinfo::{annotate, ColumnSelector, GeneIndex, Table, Writer, NA};

/// Annotate a tab-delimited gene table with genomic coordinates.
///
/// Reference files are UCSC-style dumps with at least seven columns
/// (refseq id, entrez id, symbol, chromosome, strand, start, end). The
/// input table gains four columns: Chr, Strand, Start and End.
#[derive(Debug, Parser)]
#[command(name = "geneinfo", version)]
struct Args {
    /// Reference annotation file, repeatable; files are scanned in the
    /// given order
    #[arg(short = 'r', long = "reference", value_name = "FILE", required = true)]
    references: Vec<PathBuf>,

    /// Column holding the gene identifiers: label tracks count first,
    /// data columns follow
    #[arg(short = 'c', long = "column", value_name = "INDEX", default_value_t = 0)]
    column: usize,

    /// Number of leading input columns to treat as row-label tracks
    #[arg(long = "label-columns", value_name = "N", default_value_t = 1)]
    label_columns: usize,

    /// Scan reference files in parallel
    #[cfg(feature = "rayon")]
    #[arg(long = "parallel")]
    parallel: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input table (tab-delimited, `.gz` auto-detected)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output table (tab-delimited, `.gz` compresses)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(err) = run(&args) {
        error!("{err}");
        process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let index = build_index(args)?;
    info!(
        "indexed {} identifiers from {} reference file(s)",
        index.len(),
        args.references.len()
    );

    let table = Table::from_path(&args.input, args.label_columns)?;
    debug!(
        "loaded {} row(s), {} label track(s), {} data column(s)",
        table.num_rows(),
        table.num_label_tracks(),
        table.num_data_columns()
    );

    let selector = ColumnSelector::from_index(&table, args.column)?;
    let annotated = annotate(&table, &selector, &index)?;

    let chr_column = table.num_data_columns();
    let hits = annotated
        .rows()
        .iter()
        .filter(|row| row[chr_column] != NA)
        .count();
    info!("annotated {hits}/{} row(s)", annotated.num_rows());

    Writer::to_path(&args.output, &annotated)?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn build_index(args: &Args) -> Result<GeneIndex, geneinfo::ReaderError> {
    #[cfg(feature = "rayon")]
    if args.parallel {
        return GeneIndex::par_from_paths(&args.references);
    }

    GeneIndex::from_paths(&args.references)
}
