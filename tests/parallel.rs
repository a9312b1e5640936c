use std::io::Cursor;

use geneinfo::{annotate, par_annotate, ColumnSelector, GeneIndex, IndexBuilder, Table};

const HEADER: &str = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n";

fn write_reference(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("{HEADER}{body}")).unwrap();
    path
}

#[test]
fn par_from_paths_matches_sequential_scan() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_reference(
            &dir,
            "a.txt",
            "NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n",
        ),
        write_reference(
            &dir,
            "b.txt",
            "NR_045073\t6647\tSOD1\tchr21_alt\t-\t1000\t2000\n",
        ),
        write_reference(
            &dir,
            "c.txt",
            "NM_000546\t7157\tTP53\tchr17\t-\t7668402\t7687550\n",
        ),
    ];

    let sequential = GeneIndex::from_paths(&paths).unwrap();
    let parallel = GeneIndex::par_from_paths(&paths).unwrap();
    assert_eq!(parallel, sequential);

    // Merge order follows path order, so the position lists agree too.
    let facts = parallel.get("SOD1").unwrap();
    assert_eq!(facts.joined_starts(), "31659666;1000");
}

#[test]
fn par_from_paths_surfaces_scan_errors() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_reference(
            &dir,
            "good.txt",
            "NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n",
        ),
        write_reference(&dir, "bad.txt", "NM_000546\t7157\tTP53\n"),
    ];

    let err = GeneIndex::par_from_paths(&paths).unwrap_err();
    assert!(err.to_string().contains("bad.txt"));
}

#[test]
fn par_annotate_matches_sequential_annotation() {
    let data = "refseq_id\tentrez_id\tsymbol\tchr\tstrand\tstart\tend\n\
                NM_000454\t6647\tSOD1\tchr21\t+\t31659666\t31668931\n\
                NM_000546\t7157\tTP53\tchr17\t-\t7668402\t7687550\n";
    let mut builder = IndexBuilder::new();
    builder.add_reader(Cursor::new(data.as_bytes())).unwrap();
    let index = builder.finish();

    let mut table = Table::new(["Heart", "Liver"]);
    table.push_row(["5.2", "0.1"]).unwrap();
    table.push_row(["1.9", "3.4"]).unwrap();
    table.push_row(["0.0", "0.0"]).unwrap();
    table.push_row(["7.7", "8.8"]).unwrap();
    let genes = vec![
        "SOD1".to_string(),
        "TP53".to_string(),
        "ABSENT".to_string(),
        "6647".to_string(),
    ];
    table.push_label_track("Gene", genes).unwrap();

    let selector = ColumnSelector::LabelTrack("Gene".to_string());
    let sequential = annotate(&table, &selector, &index).unwrap();
    let parallel = par_annotate(&table, &selector, &index).unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.cell(0, 2), Some("chr21"));
    assert_eq!(parallel.cell(2, 2), Some("n/a"));
    assert_eq!(parallel.cell(3, 2), Some("chr21"));
}
