// miniflow-data/src/datasets/table_dataset_test.rs

use super::*;
use std::io::Write;

const HOUSING_SAMPLE: &str = "
 0.00632  18.00   2.310  0  0.5380  6.5750  24.00
 0.02731   0.00   7.070  0  0.4690  6.4210  21.60

 0.02729   0.00   7.070  1  0.4690  7.1850  34.70
";

#[test]
fn test_parse_table_splits_features_and_targets() {
    let table = parse_table(HOUSING_SAMPLE, 1).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.feature_count(), 6);
    assert_eq!(table.target_count(), 1);
    assert_eq!(table.features()[0], vec![0.00632, 18.0, 2.31, 0.0, 0.538, 6.575]);
    assert_eq!(table.targets()[2], vec![34.7]);
    assert_eq!(table.features()[2][3], 1.0);
}

#[test]
fn test_parse_table_multiple_target_columns() {
    let table = parse_table("1 2 3 4\n5 6 7 8\n", 2).unwrap();
    assert_eq!(table.features(), &[vec![1.0, 2.0], vec![5.0, 6.0]]);
    assert_eq!(table.targets(), &[vec![3.0, 4.0], vec![7.0, 8.0]]);
    assert_eq!(table.target_matrix().unwrap().shape(), (2, 2));
}

#[test]
fn test_parse_table_rejects_bad_tokens() {
    match parse_table("1 2 3\n4 five 6\n", 1) {
        Err(DataError::Parse { line, token }) => {
            assert_eq!(line, 2);
            assert_eq!(token, "five");
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
    // Without a decimal point a token must be an integer.
    assert!(matches!(parse_table("1e3 2\n", 1), Err(DataError::Parse { .. })));
}

#[test]
fn test_parse_table_rejects_ragged_records() {
    assert!(matches!(
        parse_table("1 2 3\n4 5\n", 1),
        Err(DataError::RaggedRow { line: 2, expected: 3, found: 2 })
    ));
}

#[test]
fn test_parse_table_edge_cases() {
    assert!(matches!(parse_table("  \n\n", 1), Err(DataError::EmptyDataset)));
    assert!(matches!(parse_table("1 2\n", 2), Err(DataError::InvalidArgument(_))));
}

#[test]
fn test_dataset_get() {
    let table = parse_table("1 2 3\n4 5 6\n", 1).unwrap();
    assert_eq!(table.get(1).unwrap(), (vec![4.0, 5.0], vec![6.0]));
    assert!(table.get(2).is_err());
    assert!(!table.is_empty());
}

#[test]
fn test_new_rejects_mismatched_tables() {
    let result = TableDataset::new(vec![vec![1.0]], vec![]);
    assert!(matches!(result, Err(DataError::InvalidArgument(_))));
}

#[test]
fn test_load_table_reads_file() {
    let path = std::env::temp_dir().join(format!("miniflow_table_{}.data", std::process::id()));
    {
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(HOUSING_SAMPLE.as_bytes()).unwrap();
    }
    let table = load_table(&path, 1).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(table.len(), 3);

    assert!(matches!(load_table(&path, 1), Err(DataError::Io { .. })));
}
