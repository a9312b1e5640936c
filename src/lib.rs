//! # geneinfo
//!
//! A Rust library for stamping genomic coordinates onto tabular gene
//! datasets, using UCSC-style reference dumps as the source of truth.
//!
//! ## Overview
//!
//! Expression matrices and similar datasets identify their rows by gene,
//! but rarely say *where* each gene lives. This library scans one or more
//! tab-delimited reference dumps into a [`GeneIndex`] and uses it to
//! append four columns to any table: `Chr`, `Strand`, `Start` and `End`.
//!
//! Every reference record is indexed under each of its three identifier
//! columns (RefSeq id, Entrez id, gene symbol), so datasets can name their
//! genes with whichever alias they carry. When an identifier maps to
//! several locations, chromosomes and strands are reported as sorted,
//! deduplicated sets while start and end positions keep every occurrence
//! in scan order; merged values are joined with `;`. Identifiers with no
//! reference entry are annotated with `n/a`.
//!
//! ## Features
//!
//! - **Alias-agnostic lookup:** one index answers RefSeq ids, Entrez ids
//!   and symbols alike
//! - **Deterministic merging:** set semantics for chromosomes and strands,
//!   list semantics for coordinates, fixed by the reference scan order
//! - **Compression support:** `.gz` inputs and outputs are handled
//!   transparently
//! - **Fail-fast parsing:** a malformed reference line aborts the scan
//!   with the file and line number
//! - **Builder Pattern API:** readers and indices are assembled
//!   incrementally from paths or streams
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! geneinfo = "0.1"
//!
//! # Optional features
//! geneinfo = { version = "0.1", features = ["rayon"] }
//! ```
//!
//! ## Basic Usage
//!
//! Build an index, load a table, annotate it:
//!
//! ```
//! use std::io::Cursor;
//! use geneinfo::{annotate, ColumnSelector, IndexBuilder, Table, Writer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reference = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
//!                      NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n\
//!                      NM_000546\t7157\tTP53\tchr17\t-\t7668401\t7687549\n";
//!
//!     let mut builder = IndexBuilder::new();
//!     builder.add_reader(Cursor::new(reference))?;
//!     let index = builder.finish();
//!
//!     let table = Table::from_reader(
//!         Cursor::new("Gene\tHeart\tLiver\nTP53\t1.4\t2.2\nMYC\t0.3\t0.1\n"),
//!         1, // the first column holds row labels
//!     )?;
//!
//!     let selector = ColumnSelector::from_index(&table, 0)?;
//!     let annotated = annotate(&table, &selector, &index)?;
//!
//!     assert_eq!(annotated.cell(0, 2), Some("chr17"));
//!     assert_eq!(annotated.cell(1, 2), Some("n/a"));
//!
//!     let mut out = Vec::new();
//!     Writer::to_stream(&annotated, &mut out)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Reading Reference Files
//!
//! Indices are usually built straight from files; `.gz` extensions are
//! decompressed on the fly:
//!
//! ```rust,no_run,ignore
//! use geneinfo::GeneIndex;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = GeneIndex::from_paths(&["refGene.txt.gz", "knownGene.txt.gz"])?;
//!     println!("{} identifiers indexed", index.len());
//!
//!     if let Some(facts) = index.get("SOD1") {
//!         println!("SOD1: {}:{}", facts.joined_chroms(), facts.joined_starts());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! With the `rayon` feature, [`GeneIndex::par_from_paths`] scans the files
//! in parallel and merges the per-file indices in path order, producing
//! the same index as the sequential build.
//!
//! ### Loading and Writing Tables
//!
//! Tables round-trip through tab-delimited text, with leading columns
//! optionally treated as row-label tracks:
//!
//! ```rust,no_run,ignore
//! use geneinfo::{annotate, ColumnSelector, GeneIndex, Table, Writer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = GeneIndex::from_paths(&["refGene.txt.gz"])?;
//!     let table = Table::from_path("expression.txt.gz", 1)?;
//!
//!     let selector = ColumnSelector::LabelTrack("Gene".to_string());
//!     let annotated = annotate(&table, &selector, &index)?;
//!
//!     Writer::to_path("expression.annotated.txt.gz", &annotated)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Reference and table errors carry the offending line, and the file path
//! when the input was opened from one:
//!
//! ```rust,no_run,ignore
//! use geneinfo::GeneIndex;
//!
//! fn main() {
//!     match GeneIndex::from_paths(&["refGene.txt.gz"]) {
//!         Ok(index) => println!("{} identifiers", index.len()),
//!         // e.g. "refGene.txt.gz: invalid strand at line 42: ..."
//!         Err(err) => eprintln!("{err}"),
//!     }
//! }
//! ```
//!
//! ## Reference Format
//!
//! Reference dumps are tab-delimited. The first line is a column header
//! and is discarded; every other line needs at least seven columns, and
//! columns past the seventh are ignored:
//!
//! | Column | Name       | Description                          |
//! |--------|------------|--------------------------------------|
//! | 1      | refseq_id  | RefSeq transcript id                 |
//! | 2      | entrez_id  | Entrez gene id                       |
//! | 3      | symbol     | Gene symbol                          |
//! | 4      | chromosome | Chromosome or scaffold               |
//! | 5      | strand     | `+` or `-` (`.`/`?` for unknown)     |
//! | 6      | start      | Start position, unsigned             |
//! | 7      | end        | End position, unsigned               |
//!
//! Identifier cells equal to `n/a`, `---` or the empty string are treated
//! as missing and never become index keys.
//!
//! ## Feature Flags
//!
//! - `cli`: Build the `geneinfo` binary (adds `clap`, `log` and
//!   `simple_logger` dependencies)
//! - `rayon`: Enable parallel index building and annotation (adds `rayon`
//!   dependency)
//!
//! ## Thread Safety
//!
//! A finished [`GeneIndex`] is `Send + Sync` and can be shared across
//! threads freely. Readers are `Send` but not `Sync`; create one per
//! thread when scanning concurrently.

#![cfg_attr(doc, warn(missing_docs))]

pub mod annotate;
pub mod index;
pub mod reader;
pub mod record;
pub mod strand;
pub mod table;
pub mod writer;

#[cfg(feature = "rayon")]
pub use annotate::par_annotate;
pub use annotate::{annotate, ANNOTATION_COLUMNS};
pub use index::{GeneFacts, GeneIndex, IndexBuilder, VALUE_DELIMITER};
pub use reader::{Compression, Reader, ReaderBuilder, ReaderError, ReaderResult};
pub use record::{GeneRecord, NA};
pub use strand::Strand;
pub use table::{ColumnSelector, LabelTrack, Table, TableError, TableResult};
pub use writer::{Writer, WriterError, WriterResult};
