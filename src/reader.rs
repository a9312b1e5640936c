use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use memchr::memchr_iter;

use crate::record::{GeneRecord, MIN_FIELDS};

/// Alias used by every fallible reader operation.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// An error that can occur when reading a reference dump.
#[derive(Debug)]
pub enum ReaderError {
    /// A raw I/O failure.
    Io(io::Error),
    /// An error wrapped with the path of the file it occurred in.
    InFile {
        /// The file being read when the error occurred.
        path: PathBuf,
        /// The underlying error.
        source: Box<ReaderError>,
    },
    /// A field that failed to parse.
    InvalidField {
        /// The 1-based line the bad value was found on.
        line: usize,
        /// Which field was being parsed.
        field: &'static str,
        /// What was wrong with the value.
        message: String,
    },
    /// A line with the wrong number of tab-separated fields.
    UnexpectedFieldCount {
        /// The 1-based line the short record was found on.
        line: usize,
        /// How many fields a record needs.
        expected: usize,
        /// How many fields the line actually had.
        actual: usize,
    },
    /// A misconfigured [`ReaderBuilder`].
    Builder(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Io(err) => write!(f, "I/O error: {err}"),
            ReaderError::InFile { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
            ReaderError::InvalidField {
                line,
                field,
                message,
            } => write!(f, "invalid {field} at line {line}: {message}"),
            ReaderError::UnexpectedFieldCount {
                line,
                expected,
                actual,
            } => write!(f, "line {line} had {actual} fields, expected {expected}"),
            ReaderError::Builder(msg) => write!(f, "builder error: {msg}"),
        }
    }
}

impl std::error::Error for ReaderError {
    /// Chains to the wrapped error, when one exists.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            ReaderError::InFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ReaderError {
    /// Converts a raw I/O failure into a reader error.
    fn from(err: io::Error) -> Self {
        ReaderError::Io(err)
    }
}

impl ReaderError {
    /// Builds the error reported by the field parsers.
    pub(crate) fn invalid_field(line: usize, field: &'static str, message: String) -> ReaderError {
        ReaderError::InvalidField {
            line,
            field,
            message,
        }
    }

    /// Builds the error reported for lines with too few fields.
    pub(crate) fn unexpected_field_count(
        line: usize,
        expected: usize,
        actual: usize,
    ) -> ReaderError {
        ReaderError::UnexpectedFieldCount {
            line,
            expected,
            actual,
        }
    }

    /// Wraps an error with the path it occurred in. Errors that already
    /// carry a path are returned unchanged.
    pub(crate) fn in_file(path: &Path, source: ReaderError) -> ReaderError {
        match source {
            wrapped @ ReaderError::InFile { .. } => wrapped,
            source => ReaderError::InFile {
                path: path.to_path_buf(),
                source: Box::new(source),
            },
        }
    }

    /// Returns the line number the error occurred at, if it carries one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ReaderError::InFile { source, .. } => source.line(),
            ReaderError::InvalidField { line, .. } => Some(*line),
            ReaderError::UnexpectedFieldCount { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// How the input bytes are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Picks the format by file extension. Paths ending in `.gz` are
    /// treated as gzip, everything else as plain text. This is the
    /// default.
    Auto,
    /// Plain, uncompressed text.
    None,
    /// Gzip-compressed text.
    Gzip,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Auto
    }
}

/// Extension-based sniffing for [`Compression::Auto`].
fn detect_compression_from_extension(path: &Path) -> Compression {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    match ext {
        "gz" => Compression::Gzip,
        _ => Compression::None,
    }
}

/// Opens a path as a byte stream, decompressing gzip inputs on the fly.
pub(crate) fn open_input(path: &Path, compression: Compression) -> ReaderResult<Box<dyn Read + Send>> {
    let file = File::open(path)?;
    let compression = match compression {
        Compression::Auto => detect_compression_from_extension(path),
        other => other,
    };

    match compression {
        Compression::None | Compression::Auto => Ok(Box::new(file)),
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(file))),
    }
}

/// Configures and opens a [`Reader`].
///
/// # Example
///
/// ```rust,no_run,ignore
/// use geneinfo::reader::{Compression, Reader};
///
/// let mut reader = Reader::builder()
///     .from_path("refGene.dump")
///     .compression(Compression::Gzip)
///     .build()?;
///
/// for record in reader.records() {
///     println!("{}", record?.symbol);
/// }
/// # Ok::<(), geneinfo::reader::ReaderError>(())
/// ```
pub struct ReaderBuilder {
    source: Option<ReaderSource>,
    buffer_capacity: usize,
    compression: Compression,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            source: None,
            buffer_capacity: 64 * 1024,
            compression: Compression::default(),
        }
    }
}

impl ReaderBuilder {
    /// Reads from a file on disk.
    pub fn from_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(ReaderSource::Path(path.as_ref().into()));
        self
    }

    /// Reads from an already-open byte stream.
    pub fn from_reader<T>(mut self, reader: T) -> Self
    where
        T: Read + Send + 'static,
    {
        self.source = Some(ReaderSource::Reader(Box::new(reader)));
        self
    }

    /// Sets the read buffer size.
    ///
    /// Defaults to 64 KB. Values below 8 KB are bumped up to 8 KB.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(8 * 1024);
        self
    }

    /// Overrides compression detection for the input.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Opens the configured input and wraps it in a `Reader`.
    ///
    /// Opening a path reads the header line eagerly, so decompression and
    /// I/O failures surface here rather than on the first record.
    pub fn build(mut self) -> ReaderResult<Reader> {
        let source = self
            .source
            .take()
            .ok_or_else(|| ReaderError::Builder("ERROR: no input source configured".into()))?;

        match source {
            ReaderSource::Path(path) => {
                let stream = open_input(&path, self.compression)
                    .map_err(|err| ReaderError::in_file(&path, err))?;
                Reader::from_stream(stream, self.buffer_capacity, Some(path))
            }
            ReaderSource::Reader(stream) => {
                Reader::from_stream(stream, self.buffer_capacity, None)
            }
        }
    }
}

/// Where the bytes come from.
enum ReaderSource {
    Path(PathBuf),
    Reader(Box<dyn Read + Send>),
}

/// A reader for gene reference dumps.
///
/// The first line of the input is a column header and is consumed when the
/// reader is built; every following line is parsed into a [`GeneRecord`].
/// Errors carry the line number, and the file path when the reader was
/// opened from one.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use geneinfo::reader::Reader;
///
/// let data = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
///             NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n";
///
/// let mut reader = Reader::from_reader(Cursor::new(data))?;
/// for record in reader.records() {
///     let record = record?;
///     assert_eq!(record.chrom, "chr21");
/// }
/// # Ok::<(), geneinfo::reader::ReaderError>(())
/// ```
pub struct Reader {
    inner: BufReader<Box<dyn Read + Send>>,
    buffer: String,
    header: Option<String>,
    line_number: usize,
    path: Option<PathBuf>,
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("header", &self.header)
            .field("line_number", &self.line_number)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Reader {
    /// Starts building a reader with custom settings.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Opens the reference dump at `path` with default settings.
    ///
    /// Files ending in `.gz` are decompressed transparently.
    ///
    /// # Example
    ///
    /// ```rust,no_run,ignore
    /// use geneinfo::reader::Reader;
    ///
    /// let mut reader = Reader::from_path("refGene.txt.gz")?;
    /// let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    /// # Ok::<(), geneinfo::reader::ReaderError>(())
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> ReaderResult<Self> {
        Self::builder().from_path(path).build()
    }

    /// Wraps an already-open byte stream with default settings.
    pub fn from_reader<T>(reader: T) -> ReaderResult<Self>
    where
        T: Read + Send + 'static,
    {
        Self::builder().from_reader(reader).build()
    }

    /// Assembles the reader and consumes the header line.
    fn from_stream(
        stream: Box<dyn Read + Send>,
        buffer_capacity: usize,
        path: Option<PathBuf>,
    ) -> ReaderResult<Self> {
        let mut reader = Self {
            inner: BufReader::with_capacity(buffer_capacity, stream),
            buffer: String::with_capacity(1024),
            header: None,
            line_number: 0,
            path,
        };
        reader.consume_header()?;
        Ok(reader)
    }

    /// Consumes the header line. Empty inputs have no header and yield no
    /// records, which is not an error.
    fn consume_header(&mut self) -> ReaderResult<()> {
        match self.fill_buffer() {
            Ok(true) => {
                self.line_number += 1;
                self.header = Some(self.buffer.clone());
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => Err(self.contextualize(err)),
        }
    }

    /// Returns the discarded header line, if the input had one.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// The number of lines consumed so far, header included.
    pub fn current_line(&self) -> usize {
        self.line_number
    }

    /// Returns the path the reader was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Iterates over the remaining records.
    pub fn records(&mut self) -> Records<'_> {
        Records { reader: self }
    }

    fn next_record(&mut self) -> Option<ReaderResult<GeneRecord>> {
        match self.fill_buffer() {
            Ok(true) => {
                self.line_number += 1;
                let parsed = parse_line(&self.buffer, self.line_number)
                    .map_err(|err| self.contextualize(err));
                Some(parsed)
            }
            Ok(false) => None,
            Err(err) => Some(Err(self.contextualize(err))),
        }
    }

    /// Reads the next line into the internal buffer, returning `false` at
    /// end of input.
    fn fill_buffer(&mut self) -> ReaderResult<bool> {
        self.buffer.clear();
        let bytes = self.inner.read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(false);
        }
        trim_line(&mut self.buffer);
        Ok(true)
    }

    /// Attaches the reader's path to an error, when it has one.
    fn contextualize(&self, err: ReaderError) -> ReaderError {
        match &self.path {
            Some(path) => ReaderError::in_file(path, err),
            None => err,
        }
    }
}

impl Iterator for Reader {
    type Item = ReaderResult<GeneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Iterator returned by [`Reader::records`].
pub struct Records<'a> {
    reader: &'a mut Reader,
}

impl<'a> Iterator for Records<'a> {
    type Item = ReaderResult<GeneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record()
    }
}

/// Parses one reference line into a record.
fn parse_line(line: &str, line_number: usize) -> ReaderResult<GeneRecord> {
    let fields = split_fields(line);
    GeneRecord::from_fields(&fields, line_number)
}

/// Splits a tab-delimited line into fields, keeping empty ones.
///
/// The reference layout is positional, so a blank identifier column must
/// not shift the columns after it.
pub(crate) fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(MIN_FIELDS + 1);
    let mut start = 0usize;

    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    fields.push(&line[start..]);

    fields
}

/// Trim trailing newline bytes from a line.
pub(crate) fn trim_line(line: &mut String) {
    while line.ends_with(['\n', '\r']) {
        line.pop();
    }
}
