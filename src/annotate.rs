#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::index::GeneIndex;
use crate::record::NA;
use crate::table::{ColumnSelector, LabelTrack, Table, TableError, TableResult};

/// Names of the four appended coordinate columns, in order.
pub const ANNOTATION_COLUMNS: [&str; 4] = ["Chr", "Strand", "Start", "End"];

/// Annotates a table with the genomic coordinates of each row's gene.
///
/// The returned table is a copy of the input with four columns appended:
/// `Chr`, `Strand`, `Start` and `End`. The gene of each row is read from
/// the selected column, looked up in the index, and the matching facts
/// are rendered with `;` between merged values. Rows whose identifier is
/// unknown get `n/a` in all four cells.
///
/// # Errors
///
/// Fails if the selector names a missing label track or an out-of-range
/// data column. Lookup misses are not errors.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use geneinfo::{annotate, ColumnSelector, IndexBuilder, Table};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reference = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
///                      NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n";
///
///     let mut builder = IndexBuilder::new();
///     builder.add_reader(Cursor::new(reference))?;
///     let index = builder.finish();
///
///     let mut table = Table::new(["Expression"]);
///     table.push_row(["5.2"])?;
///     table.push_label_track("Gene", vec!["SOD1".to_string()])?;
///
///     let selector = ColumnSelector::LabelTrack("Gene".to_string());
///     let annotated = annotate(&table, &selector, &index)?;
///
///     assert_eq!(annotated.columns().last().map(String::as_str), Some("End"));
///     assert_eq!(annotated.cell(0, 1), Some("chr21"));
///     Ok(())
/// }
/// ```
pub fn annotate(
    table: &Table,
    selector: &ColumnSelector,
    index: &GeneIndex,
) -> TableResult<Table> {
    let resolved = resolve(table, selector)?;
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| annotated_row(cells, row_identifier(&resolved, row, cells), index))
        .collect();

    assemble(table, rows)
}

/// Annotates rows in parallel.
///
/// The result is identical to [`annotate`]: rows are independent and keep
/// their order.
#[cfg(feature = "rayon")]
pub fn par_annotate(
    table: &Table,
    selector: &ColumnSelector,
    index: &GeneIndex,
) -> TableResult<Table> {
    let resolved = resolve(table, selector)?;
    let rows: Vec<Vec<String>> = table
        .rows()
        .par_iter()
        .enumerate()
        .map(|(row, cells)| annotated_row(cells, row_identifier(&resolved, row, cells), index))
        .collect();

    assemble(table, rows)
}

/// A selector resolved against one table's layout.
enum Resolved<'a> {
    Track(&'a LabelTrack),
    Column(usize),
}

fn resolve<'a>(table: &'a Table, selector: &ColumnSelector) -> TableResult<Resolved<'a>> {
    match selector {
        ColumnSelector::LabelTrack(name) => table
            .label_track(name)
            .map(Resolved::Track)
            .ok_or_else(|| TableError::UnknownLabelTrack(name.clone())),
        ColumnSelector::DataColumn(column) => {
            if *column < table.num_data_columns() {
                Ok(Resolved::Column(*column))
            } else {
                Err(TableError::DataColumnOutOfRange {
                    column: *column,
                    columns: table.num_data_columns(),
                })
            }
        }
    }
}

/// The identifier the selected column holds for one row.
fn row_identifier<'a>(resolved: &Resolved<'a>, row: usize, cells: &'a [String]) -> &'a str {
    match resolved {
        Resolved::Track(track) => track.label(row).unwrap_or(""),
        Resolved::Column(column) => cells.get(*column).map(String::as_str).unwrap_or(""),
    }
}

/// Copies a row and appends the four coordinate cells for `id`.
fn annotated_row(cells: &[String], id: &str, index: &GeneIndex) -> Vec<String> {
    let mut row = Vec::with_capacity(cells.len() + ANNOTATION_COLUMNS.len());
    row.extend(cells.iter().cloned());

    match index.get(id) {
        Some(facts) => {
            row.push(facts.joined_chroms());
            row.push(facts.joined_strands());
            row.push(facts.joined_starts());
            row.push(facts.joined_ends());
        }
        None => {
            for _ in ANNOTATION_COLUMNS {
                row.push(NA.to_string());
            }
        }
    }

    row
}

/// Builds the output table: same label tracks, four extra columns.
fn assemble(table: &Table, rows: Vec<Vec<String>>) -> TableResult<Table> {
    let columns = table
        .columns()
        .iter()
        .map(String::as_str)
        .chain(ANNOTATION_COLUMNS);
    let mut out = Table::new(columns);

    for row in rows {
        out.push_row(row)?;
    }
    for track in table.label_tracks() {
        out.push_label_track(track.name(), track.labels().to_vec())?;
    }

    Ok(out)
}
