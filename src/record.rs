use std::fmt;

use crate::reader::{ReaderError, ReaderResult};
use crate::strand::Strand;

const GENE_START: &str = "start";
const GENE_END: &str = "end";

/// Sentinel for absent values, both in reference dumps and annotated cells.
pub const NA: &str = "n/a";

/// Literal placeholder some reference dumps carry in identifier columns.
pub(crate) const PLACEHOLDER: &str = "---";

/// Minimum number of tab-delimited columns in a reference line.
pub(crate) const MIN_FIELDS: usize = 7;

/// A single row of a gene reference dump.
///
/// Reference dumps are tab-delimited with one gene per line and at least
/// seven columns: RefSeq id, Entrez id, gene symbol, chromosome, strand,
/// start and end. Columns past the seventh are ignored.
///
/// # Example
///
/// ```
/// use geneinfo::record::GeneRecord;
/// use geneinfo::strand::Strand;
///
/// let record = GeneRecord {
///     refseq: "NM_000454".to_string(),
///     entrez: "6647".to_string(),
///     symbol: "SOD1".to_string(),
///     chrom: "chr21".to_string(),
///     strand: Strand::Forward,
///     start: 31659666,
///     end: 31668931,
/// };
///
/// assert_eq!(record.symbol, "SOD1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    /// The RefSeq transcript id (e.g. `NM_000454`).
    pub refseq: String,
    /// The Entrez gene id (e.g. `6647`).
    pub entrez: String,
    /// The gene symbol (e.g. `SOD1`).
    pub symbol: String,
    /// The chromosome or scaffold of the gene.
    pub chrom: String,
    /// The strand of the gene.
    pub strand: Strand,
    /// The starting position of the gene.
    pub start: u64,
    /// The ending position of the gene.
    pub end: u64,
}

impl GeneRecord {
    /// Creates a record from a slice of tab-split fields.
    ///
    /// # Errors
    ///
    /// This function returns an error if fewer than seven fields are
    /// present, or if the strand or coordinate fields do not parse.
    pub(crate) fn from_fields(fields: &[&str], line: usize) -> ReaderResult<Self> {
        if fields.len() < MIN_FIELDS {
            return Err(ReaderError::unexpected_field_count(
                line,
                MIN_FIELDS,
                fields.len(),
            ));
        }

        Ok(Self {
            refseq: fields[0].to_string(),
            entrez: fields[1].to_string(),
            symbol: fields[2].to_string(),
            chrom: fields[3].to_string(),
            strand: Strand::parse(fields[4], line)?,
            start: __to_u64(fields[5], line, GENE_START)?,
            end: __to_u64(fields[6], line, GENE_END)?,
        })
    }

    /// The three identifier aliases of this record, in column order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        [
            self.refseq.as_str(),
            self.entrez.as_str(),
            self.symbol.as_str(),
        ]
        .into_iter()
    }
}

impl fmt::Display for GeneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.refseq, self.entrez, self.symbol, self.chrom, self.strand, self.start, self.end
        )
    }
}

/// Returns `true` for identifier tokens that must not become index keys.
pub(crate) fn is_missing_identifier(token: &str) -> bool {
    token.is_empty() || token == NA || token == PLACEHOLDER
}

/// Parses a coordinate field to a u64
fn __to_u64(field: &str, line: usize, label: &'static str) -> ReaderResult<u64> {
    field.parse::<u64>().map_err(|_| {
        ReaderError::invalid_field(
            line,
            label,
            format!("ERROR: expected unsigned integer, got '{field}' in {line}:{label}"),
        )
    })
}
