use crate::benchmarks::file::{FileReadBenchmark, FileWriteBenchmark};
use crate::benchmarks::Benchmarks;
use crate::config::{Language, RunOptions};
use crate::formats::{Codec, FileType};
use crate::matrix::CaseSelection;
use crate::measure::Output;
use crate::tags::TagValue;
use crate::testing;
use std::collections::BTreeMap;

fn single(values: [&str; 3]) -> CaseSelection {
    CaseSelection::Single(values.map(str::to_owned).to_vec())
}

#[test]
fn read_parquet_uncompressed_into_a_table() {
    let source = testing::nyctaxi("file-read-parquet");
    let benchmark = Benchmarks::FileRead(FileReadBenchmark);

    let results = benchmark
        .run(
            Some(&source),
            &single(["parquet", "uncompressed", "table"]),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(results.len(), 1);
    let (result, output) = &results[0];

    assert_eq!(result.tags["file_type"], TagValue::from("parquet"));
    assert_eq!(result.tags["compression"], TagValue::from("uncompressed"));
    assert_eq!(result.tags["output_type"], TagValue::from("table"));
    assert_eq!(result.tags["dataset"], TagValue::from("nyctaxi_sample"));

    match output {
        Output::Table(table) => assert_eq!(table.num_rows(), 20),
        other => panic!("expected a table, got {other:?}"),
    }
    assert!(output.to_string().contains("Table"));
}

#[test]
fn write_feather_zstd_from_a_dataframe() {
    let source = testing::nyctaxi("file-write-feather");
    let benchmark = Benchmarks::FileWrite(FileWriteBenchmark);

    let results = benchmark
        .run(
            Some(&source),
            &single(["feather", "zstd", "dataframe"]),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(results.len(), 1);
    let expected = source.temp_path(FileType::Feather, Codec::Zstd).unwrap();
    assert!(expected.is_file(), "no artifact at the expected temp path");

    match &results[0].1 {
        Output::Written(path) => assert_eq!(path, &expected),
        other => panic!("expected a written path, got {other:?}"),
    }
}

#[test]
fn default_options_resolve_to_the_first_declared_choices() {
    let source = testing::nyctaxi("file-read-defaults");
    let benchmark = Benchmarks::FileRead(FileReadBenchmark);

    let results = benchmark
        .run(
            Some(&source),
            &CaseSelection::Options(BTreeMap::new()),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.tags["file_type"], TagValue::from("feather"));
    assert_eq!(results[0].0.tags["compression"], TagValue::from("uncompressed"));
}

#[test]
fn the_full_read_matrix_runs_end_to_end() {
    let source = testing::nyctaxi("file-read-matrix");
    let benchmark = Benchmarks::FileRead(FileReadBenchmark);

    let results = benchmark
        .run(Some(&source), &CaseSelection::All, &RunOptions::default())
        .unwrap();

    assert_eq!(results.len(), 10);
    for (result, output) in &results {
        assert_eq!(result.stats.iterations, 1);
        match output {
            Output::Table(table) => assert_eq!(table.num_rows(), 20),
            Output::Dataframe(frame) => assert_eq!(frame.num_rows(), 20),
            other => panic!("unexpected output {other:?}"),
        }
    }
}

#[test]
fn external_lz4_cases_are_skipped_without_aborting() {
    let source = testing::nyctaxi("file-write-lz4-skip");
    let benchmark = Benchmarks::FileWrite(FileWriteBenchmark);
    let options = RunOptions {
        language: Language::R,
        ..RunOptions::default()
    };

    // the case is declared valid, but the external runtime cannot run it:
    // it is skipped with a warning and yields no result
    let results = benchmark
        .run(Some(&source), &single(["feather", "lz4", "table"]), &options)
        .unwrap();

    assert!(results.is_empty());
}

#[test]
fn external_lz4_options_also_skip_on_read() {
    let source = testing::nyctaxi("file-read-lz4-skip");
    let benchmark = Benchmarks::FileRead(FileReadBenchmark);
    let options = RunOptions {
        language: Language::R,
        ..RunOptions::default()
    };

    let mut lz4 = BTreeMap::new();
    lz4.insert("compression".to_owned(), "lz4".to_owned());

    let results = benchmark
        .run(Some(&source), &CaseSelection::Options(lz4), &options)
        .unwrap();

    assert!(results.is_empty());
}
