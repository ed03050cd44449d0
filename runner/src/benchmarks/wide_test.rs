use crate::benchmarks::wide::WideDataframeBenchmark;
use crate::benchmarks::Benchmarks;
use crate::config::RunOptions;
use crate::matrix::CaseSelection;
use crate::tags::TagValue;
use crate::testing;

#[test]
fn both_read_paths_report_the_wide_shape() {
    let dir = testing::scratch_data_dir("wide-all");
    let benchmark = Benchmarks::WideDataframe(WideDataframeBenchmark::with_data_dir(dir));

    let results = benchmark
        .run(None, &CaseSelection::All, &RunOptions::default())
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].0.tags["use_legacy_dataset"],
        TagValue::Bool(true)
    );
    assert_eq!(
        results[1].0.tags["use_legacy_dataset"],
        TagValue::Bool(false)
    );

    for (result, output) in &results {
        assert!(result.tags.get("dataset").is_none());
        assert!(
            output.to_string().contains("100 rows x 10000 columns"),
            "unexpected output description: {output}"
        );
    }
}

#[test]
fn the_wide_file_is_generated_once() {
    let dir = testing::scratch_data_dir("wide-once");
    let benchmark = WideDataframeBenchmark::with_data_dir(dir.clone());
    let wrapped = Benchmarks::WideDataframe(benchmark);

    wrapped
        .run(None, &CaseSelection::All, &RunOptions::default())
        .unwrap();

    let path = dir.join("temp").join("wide.100x10000.parquet");
    assert!(path.is_file());
    let created = std::fs::metadata(&path).unwrap().modified().unwrap();

    wrapped
        .run(None, &CaseSelection::All, &RunOptions::default())
        .unwrap();
    assert_eq!(
        created,
        std::fs::metadata(&path).unwrap().modified().unwrap(),
        "wide fixture was regenerated"
    );
}
