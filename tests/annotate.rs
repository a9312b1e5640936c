use std::io::Cursor;

use geneinfo::{
    annotate, ColumnSelector, GeneIndex, IndexBuilder, Table, TableError, Writer,
    ANNOTATION_COLUMNS, NA,
};

const REFERENCE: &str = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
                         NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n\
                         NM_000546\t7157\tTP53\tchr17\t-\t7668402\t7687550\n";

fn reference_index() -> GeneIndex {
    let mut builder = IndexBuilder::new();
    builder.add_reader(Cursor::new(REFERENCE.as_bytes())).unwrap();
    builder.finish()
}

fn expression_table() -> Table {
    let mut table = Table::new(["Heart", "Liver"]);
    table.push_row(["5.2", "0.1"]).unwrap();
    table.push_row(["1.9", "3.4"]).unwrap();
    table
        .push_label_track("Gene", vec!["SOD1".to_string(), "TP53".to_string()])
        .unwrap();
    table
}

#[test]
fn appends_four_annotation_columns() {
    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();

    assert_eq!(
        annotated.columns(),
        &["Heart", "Liver", "Chr", "Strand", "Start", "End"]
    );
    assert_eq!(
        &annotated.columns()[2..],
        &ANNOTATION_COLUMNS.map(String::from)
    );

    assert_eq!(annotated.cell(0, 0), Some("5.2"));
    assert_eq!(annotated.cell(0, 2), Some("chr21"));
    assert_eq!(annotated.cell(0, 3), Some("+"));
    assert_eq!(annotated.cell(0, 4), Some("31659666"));
    assert_eq!(annotated.cell(0, 5), Some("31668931"));

    assert_eq!(annotated.cell(1, 2), Some("chr17"));
    assert_eq!(annotated.cell(1, 3), Some("-"));
    assert_eq!(annotated.cell(1, 4), Some("7668402"));
    assert_eq!(annotated.cell(1, 5), Some("7687550"));
}

#[test]
fn merged_references_join_values_in_cells() {
    let alt = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
               NR_045073\t6647\tSOD1\tchr21_alt\t-\t1000\t2000\n";
    let mut builder = IndexBuilder::new();
    builder.add_reader(Cursor::new(REFERENCE.as_bytes())).unwrap();
    builder.add_reader(Cursor::new(alt.as_bytes())).unwrap();
    let index = builder.finish();

    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &index).unwrap();

    assert_eq!(annotated.cell(0, 2), Some("chr21;chr21_alt"));
    assert_eq!(annotated.cell(0, 3), Some("+;-"));
    assert_eq!(annotated.cell(0, 4), Some("31659666;1000"));
    assert_eq!(annotated.cell(0, 5), Some("31668931;2000"));

    assert_eq!(annotated.cell(1, 2), Some("chr17"));
}

#[test]
fn same_chromosome_merges_keep_it_single() {
    let data = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
                NM_152594\t118788\tSPRED1\tchr15\t+\t38252086\t38357249\n\
                NR_156186\t118788\tSPRED1\tchr15\t-\t38545377\t38615178\n";
    let mut builder = IndexBuilder::new();
    builder.add_reader(Cursor::new(data.as_bytes())).unwrap();
    let index = builder.finish();

    let mut table = Table::new(["Score"]);
    table.push_row(["0.93"]).unwrap();
    table
        .push_label_track("Gene", vec!["SPRED1".to_string()])
        .unwrap();

    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &index).unwrap();

    // Chromosome set collapses to one value while strands and positions merge.
    assert_eq!(annotated.cell(0, 1), Some("chr15"));
    assert_eq!(annotated.cell(0, 2), Some("+;-"));
    assert_eq!(annotated.cell(0, 3), Some("38252086;38545377"));
    assert_eq!(annotated.cell(0, 4), Some("38357249;38615178"));
}

#[test]
fn unknown_genes_get_missing_markers() {
    let mut table = Table::new(["Score"]);
    table.push_row(["0.93"]).unwrap();
    table
        .push_label_track("Gene", vec!["NOT_A_GENE".to_string()])
        .unwrap();

    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();

    assert_eq!(annotated.cell(0, 1), Some(NA));
    assert_eq!(annotated.cell(0, 2), Some(NA));
    assert_eq!(annotated.cell(0, 3), Some(NA));
    assert_eq!(annotated.cell(0, 4), Some(NA));
}

#[test]
fn empty_index_annotates_everything_missing() {
    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &GeneIndex::new()).unwrap();

    for row in 0..annotated.num_rows() {
        for offset in 0..4 {
            assert_eq!(annotated.cell(row, 2 + offset), Some(NA));
        }
    }
}

#[test]
fn annotation_preserves_table_shape() {
    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();

    assert_eq!(annotated.num_rows(), table.num_rows());
    assert_eq!(
        annotated.num_data_columns(),
        table.num_data_columns() + ANNOTATION_COLUMNS.len()
    );
    assert_eq!(annotated.num_label_tracks(), table.num_label_tracks());
    assert_eq!(
        annotated.label_track("Gene").unwrap().labels(),
        table.label_track("Gene").unwrap().labels()
    );

    for (row, cells) in table.rows().iter().enumerate() {
        assert_eq!(&annotated.rows()[row][..cells.len()], &cells[..]);
    }
}

#[test]
fn identifiers_resolve_from_any_alias_column() {
    let data = "Entrez\tScore\n\
                6647\t0.93\n\
                7157\t0.41\n";
    let table = Table::from_reader(Cursor::new(data.as_bytes()), 1).unwrap();

    let selector = ColumnSelector::LabelTrack("Entrez".to_string());
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();

    assert_eq!(annotated.cell(0, 1), Some("chr21"));
    assert_eq!(annotated.cell(1, 1), Some("chr17"));
}

#[test]
fn selector_addresses_data_columns_directly() {
    let mut table = Table::new(["Symbol", "Score"]);
    table.push_row(["TP53", "0.41"]).unwrap();

    let selector = ColumnSelector::DataColumn(0);
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();
    assert_eq!(annotated.cell(0, 2), Some("chr17"));

    let resolved = ColumnSelector::from_index(&table, 0).unwrap();
    assert_eq!(resolved, ColumnSelector::DataColumn(0));
    let via_index = annotate(&table, &resolved, &reference_index()).unwrap();
    assert_eq!(via_index, annotated);
}

#[test]
fn combined_index_addresses_tracks_and_columns() {
    let data = "Gene\tSymbol\tScore\n\
                SOD1\tTP53\t0.41\n";
    let table = Table::from_reader(Cursor::new(data.as_bytes()), 1).unwrap();
    let index = reference_index();

    let by_track = ColumnSelector::from_index(&table, 0).unwrap();
    let annotated = annotate(&table, &by_track, &index).unwrap();
    assert_eq!(annotated.cell(0, 2), Some("chr21"));

    let by_column = ColumnSelector::from_index(&table, 1).unwrap();
    assert_eq!(by_column, ColumnSelector::DataColumn(0));
    let annotated = annotate(&table, &by_column, &index).unwrap();
    assert_eq!(annotated.cell(0, 2), Some("chr17"));
}

#[test]
fn unknown_label_track_is_an_error() {
    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Sample".to_string());
    let err = annotate(&table, &selector, &reference_index()).unwrap_err();

    match err {
        TableError::UnknownLabelTrack(name) => assert_eq!(name, "Sample"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn data_column_out_of_range_is_an_error() {
    let table = expression_table();
    let selector = ColumnSelector::DataColumn(9);
    let err = annotate(&table, &selector, &reference_index()).unwrap_err();

    match err {
        TableError::DataColumnOutOfRange { column, columns } => {
            assert_eq!(column, 9);
            assert_eq!(columns, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn annotation_is_deterministic() {
    let render = |index: &GeneIndex| {
        let table = expression_table();
        let selector = ColumnSelector::LabelTrack("Gene".to_string());
        let annotated = annotate(&table, &selector, index).unwrap();
        let mut out = Vec::new();
        Writer::to_stream(&annotated, &mut out).unwrap();
        out
    };

    let first = render(&reference_index());
    let second = render(&reference_index());
    assert_eq!(first, second);
}

#[test]
fn annotated_tables_survive_a_write_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.tsv.gz");

    let table = expression_table();
    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let annotated = annotate(&table, &selector, &reference_index()).unwrap();

    Writer::to_path(&path, &annotated).unwrap();
    let reread = Table::from_path(&path, 1).unwrap();
    assert_eq!(reread, annotated);
}
