use crate::formats::{Codec, FileType};
use crate::sources::{SourceError, Store};
use crate::testing;
use std::fs;
use std::time::Duration;

#[test]
fn temp_paths_follow_the_artifact_naming_scheme() {
    let source = testing::nyctaxi("sources-naming");
    let path = source.temp_path(FileType::Parquet, Codec::Snappy).unwrap();

    assert!(path.ends_with("temp/nyctaxi_sample.snappy.parquet"));
    assert!(path.parent().unwrap().is_dir());
}

#[test]
fn create_if_not_exists_is_idempotent() {
    let source = testing::nyctaxi("sources-idempotent");

    let first = source
        .create_if_not_exists(FileType::Feather, Codec::Lz4)
        .unwrap();
    assert!(first.is_file());
    let created = fs::metadata(&first).unwrap().modified().unwrap();

    std::thread::sleep(Duration::from_millis(20));
    let second = source
        .create_if_not_exists(FileType::Feather, Codec::Lz4)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        created,
        fs::metadata(&second).unwrap().modified().unwrap(),
        "cached artifact was rewritten"
    );
}

#[test]
fn no_staging_leftovers_after_materialization() {
    let source = testing::nyctaxi("sources-staging");
    let path = source
        .create_if_not_exists(FileType::Parquet, Codec::Uncompressed)
        .unwrap();

    let staged: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "part"))
        .collect();
    assert!(staged.is_empty());
}

#[test]
fn table_and_dataframe_accessors_are_memoized() {
    let source = testing::nyctaxi("sources-memoized");

    let first = source.table().unwrap();
    let second = source.table().unwrap();
    assert!(std::ptr::eq(first, second));

    let frame = source.dataframe().unwrap();
    assert_eq!(frame.num_rows(), first.num_rows());
    assert!(std::ptr::eq(frame, source.dataframe().unwrap()));
}

#[test]
fn unknown_sources_are_rejected() {
    let store = testing::store("sources-unknown");

    assert!(matches!(
        store.get("tpch_sf1000"),
        Err(SourceError::UnknownSource(_))
    ));
}

#[test]
fn missing_fixtures_name_their_upstream_location() {
    // the scratch dir only seeds the csv fixtures, so this one is absent
    let source = testing::store("sources-missing")
        .get("chi_traffic_sample")
        .unwrap();

    match source.table() {
        Err(SourceError::MissingFixture { url, .. }) => {
            assert!(url.unwrap().contains("ursa-qa"));
        }
        other => panic!("expected a missing fixture, got {other:?}"),
    }
}

#[test]
fn manifests_overlay_the_builtin_store() {
    let dir = testing::scratch_data_dir("sources-overlay");
    let manifest = dir.join("sources.yaml");
    fs::write(
        &manifest,
        "local_taxi:\n  path: nyctaxi_sample.csv\npiped:\n  path: fanniemae_sample.csv\n  delimiter: \"|\"\n  header: false\n",
    )
    .unwrap();

    let mut store = Store::with_data_dir(&dir);
    store.overlay(&manifest).unwrap();

    let source = store.get("local_taxi").unwrap();
    assert_eq!(source.table().unwrap().num_rows(), 20);

    let piped = store.get("piped").unwrap();
    assert_eq!(piped.table().unwrap().num_columns(), 8);
}
