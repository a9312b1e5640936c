use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::reader::{Reader, ReaderResult};
use crate::record::{is_missing_identifier, GeneRecord};
use crate::strand::Strand;

/// Delimiter between merged values within one annotated cell.
pub const VALUE_DELIMITER: &str = ";";

/// Everything known about one identifier across the scanned references.
///
/// Chromosomes and strands are deduplicated and kept in sorted order;
/// starts and ends keep every occurrence in accumulation order, duplicates
/// included. The `joined_*` methods render each collection as a single
/// cell, values separated by [`VALUE_DELIMITER`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneFacts {
    chroms: BTreeSet<String>,
    strands: BTreeSet<Strand>,
    starts: Vec<u64>,
    ends: Vec<u64>,
}

impl GeneFacts {
    /// Folds one record occurrence into the facts.
    fn push(&mut self, chrom: &str, strand: Strand, start: u64, end: u64) {
        if !self.chroms.contains(chrom) {
            self.chroms.insert(chrom.to_string());
        }
        self.strands.insert(strand);
        self.starts.push(start);
        self.ends.push(end);
    }

    /// Merges another set of facts into this one.
    fn absorb(&mut self, other: GeneFacts) {
        self.chroms.extend(other.chroms);
        self.strands.extend(other.strands);
        self.starts.extend(other.starts);
        self.ends.extend(other.ends);
    }

    /// The chromosomes seen for this identifier, in sorted order.
    pub fn chroms(&self) -> impl Iterator<Item = &str> + '_ {
        self.chroms.iter().map(String::as_str)
    }

    /// The strands seen for this identifier, `+` before `-`.
    pub fn strands(&self) -> impl Iterator<Item = Strand> + '_ {
        self.strands.iter().copied()
    }

    /// Every start position, in accumulation order.
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    /// Every end position, in accumulation order.
    pub fn ends(&self) -> &[u64] {
        &self.ends
    }

    /// The chromosome set rendered as one cell.
    pub fn joined_chroms(&self) -> String {
        join_values(self.chroms.iter())
    }

    /// The strand set rendered as one cell.
    pub fn joined_strands(&self) -> String {
        join_values(self.strands.iter().map(|strand| strand.symbol()))
    }

    /// The start list rendered as one cell.
    pub fn joined_starts(&self) -> String {
        join_values(self.starts.iter())
    }

    /// The end list rendered as one cell.
    pub fn joined_ends(&self) -> String {
        join_values(self.ends.iter())
    }
}

/// A multi-valued lookup from gene identifiers to [`GeneFacts`].
///
/// Every record of a reference dump is indexed under each of its three
/// identifier columns (RefSeq id, Entrez id, symbol), so a lookup works
/// with whichever alias a dataset carries. Identifiers equal to `n/a`,
/// `---` or the empty string are never indexed.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use geneinfo::index::IndexBuilder;
///
/// let data = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
///             NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n";
///
/// let mut builder = IndexBuilder::new();
/// builder.add_reader(Cursor::new(data))?;
/// let index = builder.finish();
///
/// assert!(index.contains("SOD1"));
/// assert!(index.contains("NM_000454"));
/// assert_eq!(
///     index.get("6647").map(|facts| facts.joined_chroms()),
///     Some("chr21".to_string()),
/// );
/// # Ok::<(), geneinfo::reader::ReaderError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneIndex {
    facts: HashMap<String, GeneFacts>,
}

impl GeneIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index by scanning the given reference files in order.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable file or malformed line; no partial
    /// index is returned.
    ///
    /// # Example
    ///
    /// ```rust,no_run,ignore
    /// use geneinfo::index::GeneIndex;
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let index = GeneIndex::from_paths(&["refGene.txt.gz", "knownGene.txt.gz"])?;
    ///     println!("{} identifiers", index.len());
    ///     Ok(())
    /// }
    /// ```
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> ReaderResult<Self> {
        let mut builder = IndexBuilder::new();
        for path in paths {
            builder.add_file(path)?;
        }
        Ok(builder.finish())
    }

    /// Builds an index from the given reference files, scanning them in
    /// parallel.
    ///
    /// The result is identical to [`GeneIndex::from_paths`]: per-file
    /// indices are merged in path order once all scans finish.
    #[cfg(feature = "rayon")]
    pub fn par_from_paths<P>(paths: &[P]) -> ReaderResult<Self>
    where
        P: AsRef<Path> + Sync,
    {
        let partials: Vec<GeneIndex> = paths
            .par_iter()
            .map(|path| {
                let mut builder = IndexBuilder::new();
                builder.add_file(path)?;
                Ok(builder.finish())
            })
            .collect::<ReaderResult<_>>()?;

        let mut index = GeneIndex::new();
        for partial in partials {
            index.absorb(partial);
        }
        Ok(index)
    }

    /// Looks up the facts recorded for an identifier.
    pub fn get(&self, id: &str) -> Option<&GeneFacts> {
        self.facts.get(id)
    }

    /// Returns `true` if the identifier was seen in any reference.
    pub fn contains(&self, id: &str) -> bool {
        self.facts.contains_key(id)
    }

    /// The number of distinct identifiers in the index.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if no identifiers were indexed.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The indexed identifiers, in arbitrary order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.facts.keys().map(String::as_str)
    }

    /// Merges another index into this one. Facts already present keep
    /// their accumulation order, with `other`'s occurrences appended.
    pub fn absorb(&mut self, other: GeneIndex) {
        for (id, facts) in other.facts {
            self.facts.entry(id).or_default().absorb(facts);
        }
    }
}

/// An incremental builder for a [`GeneIndex`].
///
/// Sources are folded in the order they are added, which fixes the order
/// of the start and end lists in the resulting facts.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: GeneIndex,
}

impl IndexBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans one reference file into the index.
    ///
    /// A failed scan leaves the builder unchanged.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> ReaderResult<&mut Self> {
        let reader = Reader::from_path(path)?;
        self.consume(reader)
    }

    /// Scans one reference stream into the index.
    ///
    /// A failed scan leaves the builder unchanged.
    pub fn add_reader<T>(&mut self, stream: T) -> ReaderResult<&mut Self>
    where
        T: Read + Send + 'static,
    {
        let reader = Reader::from_reader(stream)?;
        self.consume(reader)
    }

    /// Folds a single record into the index.
    pub fn add_record(&mut self, record: &GeneRecord) -> &mut Self {
        index_record(&mut self.index, record);
        self
    }

    /// The number of distinct identifiers indexed so far.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Consumes the builder and returns the finished index.
    pub fn finish(self) -> GeneIndex {
        self.index
    }

    fn consume(&mut self, mut reader: Reader) -> ReaderResult<&mut Self> {
        let mut partial = GeneIndex::new();
        for record in reader.records() {
            index_record(&mut partial, &record?);
        }
        self.index.absorb(partial);
        Ok(self)
    }
}

/// Indexes one record under each of its non-missing identifiers.
fn index_record(index: &mut GeneIndex, record: &GeneRecord) {
    for id in record.identifiers() {
        if is_missing_identifier(id) {
            continue;
        }
        index
            .facts
            .entry(id.to_string())
            .or_default()
            .push(&record.chrom, record.strand, record.start, record.end);
    }
}

/// Joins values with [`VALUE_DELIMITER`].
fn join_values<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: ToString,
{
    values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(VALUE_DELIMITER)
}
