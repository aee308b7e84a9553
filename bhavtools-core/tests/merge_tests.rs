use bhavtools_core::{
    merge_files, BhavError, ErrorPolicy, MergeOptions, NoProgress, ProgressCadence,
    ProgressEvent, Stage,
};
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn merge(dir: &Path, options: &MergeOptions) -> Result<bhavtools_core::MergeReport, BhavError> {
    merge_files(dir, "*.csv", Path::new("merged.csv"), options, &mut NoProgress)
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|record| record.unwrap().iter().map(ToString::to_string).collect())
        .collect()
}

#[test]
fn test_merges_two_days() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    fs::write(temp_dir.path().join("20240101.csv"), "H\n1,2\n").unwrap();
    fs::write(temp_dir.path().join("20240102.csv"), "H\n3,4\n").unwrap();

    let report = merge_files(
        temp_dir.path(),
        "*.csv",
        Path::new("out/merged.csv"),
        &MergeOptions::default(),
        &mut NoProgress,
    )
    .unwrap();

    assert_eq!(report.output, Some(out_dir.join("merged.csv")));
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.headers_dropped, 1);
    let merged = fs::read_to_string(out_dir.join("merged.csv")).unwrap();
    assert_eq!(merged, "H\n1,2\n3,4\n");
}

#[test]
fn test_files_merge_in_name_order() {
    let temp_dir = TempDir::new().unwrap();
    // Written out of order on purpose
    fs::write(temp_dir.path().join("20240103_bhav.csv"), "SYMBOL,CLOSE\nTCS,3\n").unwrap();
    fs::write(temp_dir.path().join("20240101_bhav.csv"), "SYMBOL,CLOSE\nTCS,1\nINFY,1\n").unwrap();
    fs::write(temp_dir.path().join("20240102_bhav.csv"), "SYMBOL,CLOSE\nTCS,2\n").unwrap();

    merge(temp_dir.path(), &MergeOptions::default()).unwrap();

    let rows = read_rows(&temp_dir.path().join("merged.csv"));
    assert_eq!(
        rows,
        vec![
            vec!["SYMBOL", "CLOSE"],
            vec!["TCS", "1"],
            vec!["INFY", "1"],
            vec!["TCS", "2"],
            vec!["TCS", "3"],
        ]
    );
}

#[test]
fn test_existing_output_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.csv"), "H\n1\n").unwrap();
    fs::write(temp_dir.path().join("merged.csv"), "old,output\nx,y\nz,w\n").unwrap();

    merge(temp_dir.path(), &MergeOptions::default()).unwrap();
    let merged = fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(merged, "H\n1\n");
}

#[test]
fn test_bad_input_fails_and_keeps_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.csv"), "H\n1\n").unwrap();
    fs::write(temp_dir.path().join("b.csv"), "H,I\n1,2,3\n").unwrap();
    fs::write(temp_dir.path().join("merged.csv"), "previous\n").unwrap();

    let options = MergeOptions {
        require_uniform_rows: true,
        ..MergeOptions::default()
    };
    let err = merge(temp_dir.path(), &options).unwrap_err();
    match err {
        BhavError::Csv { ref path, .. } => assert_eq!(path, &temp_dir.path().join("b.csv")),
        ref other => panic!("expected CSV error, got {other:?}"),
    }
    let merged = fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(merged, "previous\n");

    // Only the inputs and the untouched output remain; no temp file leaks.
    let count = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(count, 3);
}

#[test]
fn test_continue_policy_skips_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.csv"), "H,V\n1,2\n").unwrap();
    fs::write(temp_dir.path().join("b.csv"), "H,V\n1,2,3\n").unwrap();
    fs::write(temp_dir.path().join("c.csv"), "H,V\n5,6\n").unwrap();

    let options = MergeOptions {
        on_error: ErrorPolicy::Continue,
        require_uniform_rows: true,
        ..MergeOptions::default()
    };
    let report = merge(temp_dir.path(), &options).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, Some(temp_dir.path().join("b.csv")));
    assert_eq!(report.inputs.len(), 2);
    let merged = fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(merged, "H,V\n1,2\n5,6\n");
}

#[test]
fn test_different_widths_across_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.csv"), "A,B\n1,2\n").unwrap();
    fs::write(temp_dir.path().join("b.csv"), "A,B,C\n3,4,5\n").unwrap();

    merge(temp_dir.path(), &MergeOptions::default()).unwrap();
    let merged = fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(merged, "A,B\n1,2\n3,4,5\n");
}

#[test]
fn test_non_utf8_bytes_pass_through() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.csv"), b"H\n\xff\xfe\n").unwrap();

    merge(temp_dir.path(), &MergeOptions::default()).unwrap();
    let merged = fs::read(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(merged, b"H\n\xff\xfe\n");
}

#[test]
fn test_merge_progress() {
    let temp_dir = TempDir::new().unwrap();
    for day in 1..=4 {
        fs::write(temp_dir.path().join(format!("2024010{day}.csv")), "H\n1\n").unwrap();
    }

    let mut events = Vec::new();
    let mut sink = |event: ProgressEvent| events.push((event.stage, event.processed));
    merge_files(
        temp_dir.path(),
        "2024*.csv",
        Path::new("merged.csv"),
        &MergeOptions {
            progress: ProgressCadence::Quarters,
            ..MergeOptions::default()
        },
        &mut sink,
    )
    .unwrap();

    assert_eq!(
        events,
        vec![
            (Stage::Merge, 1),
            (Stage::Merge, 2),
            (Stage::Merge, 3),
            (Stage::Merge, 4)
        ]
    );
}

fn table(rows: usize) -> impl Strategy<Value = Vec<Vec<u16>>> {
    prop::collection::vec(prop::collection::vec(any::<u16>(), 3), rows)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_merge_keeps_every_data_row_in_order(
        files in prop::collection::vec((0usize..6).prop_flat_map(table), 1..5)
    ) {
        let temp_dir = TempDir::new().unwrap();
        for (index, rows) in files.iter().enumerate() {
            let mut content = String::from("A,B,C\n");
            for row in rows {
                content.push_str(&format!("{},{},{}\n", row[0], row[1], row[2]));
            }
            fs::write(temp_dir.path().join(format!("day_{index:02}.csv")), content).unwrap();
        }

        let report = merge(temp_dir.path(), &MergeOptions::default()).unwrap();

        let expected_rows = 1 + files.iter().map(Vec::len).sum::<usize>();
        prop_assert_eq!(report.rows_written, expected_rows);
        prop_assert_eq!(report.headers_dropped, files.len() - 1);

        let rows = read_rows(&temp_dir.path().join("merged.csv"));
        prop_assert_eq!(&rows[0], &vec!["A".to_string(), "B".to_string(), "C".to_string()]);
        let expected: Vec<Vec<String>> = files
            .iter()
            .flatten()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        prop_assert_eq!(&rows[1..], &expected[..]);
    }
}
