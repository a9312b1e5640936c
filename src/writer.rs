use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;

use crate::table::{LabelTrack, Table};

/// Alias used by every fallible writer operation.
pub type WriterResult<T> = Result<T, WriterError>;

/// Errors that can occur while writing a table.
#[derive(Debug)]
pub enum WriterError {
    /// The output sink failed.
    Io(io::Error),
    /// The table's shape is inconsistent and cannot be serialized.
    Invalid(String),
}

impl fmt::Display for WriterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterError::Io(err) => write!(f, "write error: {err}"),
            WriterError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for WriterError {
    /// Chains to the I/O failure, when there is one.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriterError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WriterError {
    fn from(err: io::Error) -> Self {
        WriterError::Io(err)
    }
}

/// Serializes tables back to tab-delimited text.
///
/// The header line carries the label track names followed by the data
/// column names; every row writes its labels and cells in the same order.
///
/// # Example
///
/// ```
/// use geneinfo::{Table, Writer};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut table = Table::new(["Value"]);
///     table.push_row(["1.5"])?;
///     table.push_label_track("Gene", vec!["SOD1".to_string()])?;
///
///     let mut out = Vec::new();
///     Writer::to_stream(&table, &mut out)?;
///     assert_eq!(String::from_utf8(out)?, "Gene\tValue\nSOD1\t1.5\n");
///     Ok(())
/// }
/// ```
pub struct Writer;

impl Writer {
    /// Writes a table to the given writer.
    pub fn to_stream<W: Write>(table: &Table, writer: &mut W) -> WriterResult<()> {
        validate(table)?;

        let header = table
            .label_tracks()
            .iter()
            .map(LabelTrack::name)
            .chain(table.columns().iter().map(String::as_str));
        write_line(writer, header)?;

        for (row, cells) in table.rows().iter().enumerate() {
            let parts = table
                .label_tracks()
                .iter()
                .map(|track| track.label(row).unwrap_or(""))
                .chain(cells.iter().map(String::as_str));
            write_line(writer, parts)?;
        }

        Ok(())
    }

    /// Opens a path and writes the table, compressing the output when the
    /// path ends in `.gz`.
    pub fn to_path<P: AsRef<Path>>(path: P, table: &Table) -> WriterResult<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;

        let sink: Box<dyn Write> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzEncoder::new(file, GzCompression::fast()))
        } else {
            Box::new(file)
        };

        let mut writer = BufWriter::with_capacity(64 * 1024, sink);
        Self::to_stream(table, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Checks that every track and row matches the table's dimensions.
fn validate(table: &Table) -> WriterResult<()> {
    for track in table.label_tracks() {
        if track.labels().len() != table.num_rows() {
            return Err(WriterError::Invalid(format!(
                "label track '{}' has {} labels for {} rows",
                track.name(),
                track.labels().len(),
                table.num_rows()
            )));
        }
    }

    for row in table.rows() {
        if row.len() != table.num_data_columns() {
            return Err(WriterError::Invalid(format!(
                "row has {} cells for {} columns",
                row.len(),
                table.num_data_columns()
            )));
        }
    }

    Ok(())
}

/// Writes one tab-joined line.
fn write_line<'a, W, I>(writer: &mut W, parts: I) -> WriterResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a str>,
{
    let mut first = true;
    for part in parts {
        if !first {
            writer.write_all(b"\t")?;
        }
        writer.write_all(part.as_bytes())?;
        first = false;
    }
    writer.write_all(b"\n")?;
    Ok(())
}
