use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::reader::{
    open_input, split_fields, trim_line, Compression, ReaderError, ReaderResult,
};

/// Result alias for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// An error that can occur when building or annotating a table.
#[derive(Debug)]
pub enum TableError {
    /// A combined column index addressed neither a label track nor a data
    /// column.
    ColumnOutOfRange {
        /// The combined index that was requested.
        index: usize,
        /// The number of addressable columns (label tracks plus data columns).
        addressable: usize,
    },
    /// A data column index was past the table's width.
    DataColumnOutOfRange {
        /// The data column that was requested.
        column: usize,
        /// The number of data columns in the table.
        columns: usize,
    },
    /// A row-label track was requested by a name the table does not have.
    UnknownLabelTrack(String),
    /// A row had a different number of cells than the table has columns.
    RowWidthMismatch {
        /// The expected number of cells.
        expected: usize,
        /// The actual number of cells.
        actual: usize,
    },
    /// A label track had a different number of labels than the table has rows.
    TrackLengthMismatch {
        /// The name of the offending track.
        name: String,
        /// The expected number of labels.
        expected: usize,
        /// The actual number of labels.
        actual: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::ColumnOutOfRange { index, addressable } => write!(
                f,
                "column selector {index} out of range, table addresses {addressable} columns"
            ),
            TableError::DataColumnOutOfRange { column, columns } => write!(
                f,
                "data column {column} out of range, table has {columns} data columns"
            ),
            TableError::UnknownLabelTrack(name) => {
                write!(f, "no row-label track named '{name}'")
            }
            TableError::RowWidthMismatch { expected, actual } => {
                write!(f, "row had {actual} cells, expected {expected}")
            }
            TableError::TrackLengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "label track '{name}' has {actual} labels, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// A named column of row labels carried alongside a table's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTrack {
    name: String,
    labels: Vec<String>,
}

impl LabelTrack {
    /// The name of the track.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every label in the track, one per row.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The label of one row.
    #[inline]
    pub fn label(&self, row: usize) -> Option<&str> {
        self.labels.get(row).map(String::as_str)
    }
}

/// A rectangular dataset with named row-label tracks.
///
/// A table holds named data columns and rows of cells, plus zero or more
/// row-label tracks alongside the data (gene symbols, probe ids). Tracks
/// are attached once all rows are present, and each must carry exactly
/// one label per row.
///
/// # Example
///
/// ```
/// use geneinfo::table::Table;
///
/// let mut table = Table::new(["Heart", "Liver"]);
/// table.push_row(["5.2", "0.1"])?;
/// table.push_row(["1.9", "3.4"])?;
/// table.push_label_track("Gene", vec!["SOD1".to_string(), "TP53".to_string()])?;
///
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.cell(1, 0), Some("1.9"));
/// # Ok::<(), geneinfo::table::TableError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    label_tracks: Vec<LabelTrack>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given data column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label_tracks: Vec::new(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Loads a tab-delimited table from a path.
    ///
    /// The first line names the columns; the first `label_columns` of them
    /// become row-label tracks and the rest become data columns. Files
    /// ending in `.gz` are decompressed transparently.
    ///
    /// # Errors
    ///
    /// Fails on an empty input, on a row whose width differs from the
    /// header's, and on I/O or decompression errors. Errors carry the path
    /// and the line number.
    pub fn from_path<P: AsRef<Path>>(path: P, label_columns: usize) -> ReaderResult<Self> {
        let path = path.as_ref();
        let stream =
            open_input(path, Compression::Auto).map_err(|err| ReaderError::in_file(path, err))?;
        Self::from_stream(stream, label_columns).map_err(|err| ReaderError::in_file(path, err))
    }

    /// Loads a tab-delimited table from a reader.
    pub fn from_reader<T>(stream: T, label_columns: usize) -> ReaderResult<Self>
    where
        T: Read + Send + 'static,
    {
        Self::from_stream(Box::new(stream), label_columns)
    }

    fn from_stream(stream: Box<dyn Read + Send>, label_columns: usize) -> ReaderResult<Self> {
        let mut reader = BufReader::with_capacity(64 * 1024, stream);
        let mut line = String::with_capacity(1024);
        let mut line_number = 0usize;

        if reader.read_line(&mut line)? == 0 {
            return Err(ReaderError::Builder(
                "ERROR: table input is empty, expected a header line".into(),
            ));
        }
        line_number += 1;
        trim_line(&mut line);

        let header: Vec<String> = split_fields(&line)
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = header.len();
        if label_columns > width {
            return Err(ReaderError::Builder(format!(
                "ERROR: {label_columns} label columns requested, header has {width}"
            )));
        }

        let mut table = Table::new(header[label_columns..].iter().cloned());
        let mut track_labels: Vec<Vec<String>> = vec![Vec::new(); label_columns];

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;
            trim_line(&mut line);

            let fields = split_fields(&line);
            if fields.len() != width {
                return Err(ReaderError::unexpected_field_count(
                    line_number,
                    width,
                    fields.len(),
                ));
            }

            for (track, value) in track_labels.iter_mut().zip(&fields[..label_columns]) {
                track.push(value.to_string());
            }
            table
                .rows
                .push(fields[label_columns..].iter().map(|s| s.to_string()).collect());
        }

        for (name, labels) in header.into_iter().take(label_columns).zip(track_labels) {
            table.label_tracks.push(LabelTrack { name, labels });
        }

        Ok(table)
    }

    /// Appends a row of cells.
    ///
    /// # Errors
    ///
    /// Fails if the row's width differs from the number of data columns.
    pub fn push_row<I, S>(&mut self, cells: I) -> TableResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Attaches a row-label track. Tracks are attached once all rows are
    /// present.
    ///
    /// # Errors
    ///
    /// Fails if the track does not carry exactly one label per row.
    pub fn push_label_track<S: Into<String>>(
        &mut self,
        name: S,
        labels: Vec<String>,
    ) -> TableResult<()> {
        let name = name.into();
        if labels.len() != self.rows.len() {
            return Err(TableError::TrackLengthMismatch {
                name,
                expected: self.rows.len(),
                actual: labels.len(),
            });
        }
        self.label_tracks.push(LabelTrack { name, labels });
        Ok(())
    }

    /// The number of rows in the table.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The number of data columns in the table.
    #[inline]
    pub fn num_data_columns(&self) -> usize {
        self.columns.len()
    }

    /// The number of row-label tracks in the table.
    #[inline]
    pub fn num_label_tracks(&self) -> usize {
        self.label_tracks.len()
    }

    /// The number of columns a combined selector index can address:
    /// label tracks first, data columns after.
    #[inline]
    pub fn num_addressable_columns(&self) -> usize {
        self.label_tracks.len() + self.columns.len()
    }

    /// The data column names, in order.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The row-label tracks, in order.
    #[inline]
    pub fn label_tracks(&self) -> &[LabelTrack] {
        &self.label_tracks
    }

    /// Looks up a row-label track by name.
    pub fn label_track(&self, name: &str) -> Option<&LabelTrack> {
        self.label_tracks.iter().find(|track| track.name == name)
    }

    /// The rows of the table, each a slice of cells in column order.
    #[inline]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// One cell of the table, by row and data column.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// Addresses the column whose values identify each row's gene.
///
/// Datasets name their genes either in a row-label track or in a regular
/// data column. A selector can be built directly, or resolved from a
/// combined index where label tracks come first and data columns follow.
///
/// # Example
///
/// ```
/// use geneinfo::table::{ColumnSelector, Table};
///
/// let mut table = Table::new(["Expression"]);
/// table.push_row(["5.2"])?;
/// table.push_label_track("Gene", vec!["SOD1".to_string()])?;
///
/// assert_eq!(
///     ColumnSelector::from_index(&table, 0)?,
///     ColumnSelector::LabelTrack("Gene".to_string()),
/// );
/// assert_eq!(
///     ColumnSelector::from_index(&table, 1)?,
///     ColumnSelector::DataColumn(0),
/// );
/// # Ok::<(), geneinfo::table::TableError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// The row-label track with this name.
    LabelTrack(String),
    /// The data column at this offset, label tracks not counted.
    DataColumn(usize),
}

impl ColumnSelector {
    /// Resolves a combined column index against a table's layout.
    ///
    /// An index smaller than the number of label tracks picks a track;
    /// anything else counts into the data columns.
    ///
    /// # Errors
    ///
    /// Fails if the index is past the last data column.
    pub fn from_index(table: &Table, index: usize) -> TableResult<Self> {
        let tracks = table.label_tracks.len();
        if index < tracks {
            return Ok(ColumnSelector::LabelTrack(
                table.label_tracks[index].name.clone(),
            ));
        }

        let column = index - tracks;
        if column < table.columns.len() {
            return Ok(ColumnSelector::DataColumn(column));
        }

        Err(TableError::ColumnOutOfRange {
            index,
            addressable: table.num_addressable_columns(),
        })
    }
}
