use crate::benchmarks::dataset::DATASET_READ;
use crate::benchmarks::file::FILE_READ;
use crate::config::{Language, RunOptions};
use crate::matrix::CaseSelection;
use crate::tags::{self, TagValue};
use crate::testing;

fn parquet_table_case() -> crate::matrix::Case {
    FILE_READ
        .resolve(&CaseSelection::Single(
            ["parquet", "uncompressed", "table"].map(str::to_owned).to_vec(),
        ))
        .unwrap()
        .remove(0)
}

#[test]
fn tags_are_deterministic_byte_for_byte() {
    let source = testing::nyctaxi("tags-deterministic");
    let case = parquet_table_case();
    let options = RunOptions::default();

    let first = tags::build(&FILE_READ, Some(&source), Some(&case), &options);
    let second = tags::build(&FILE_READ, Some(&source), Some(&case), &options);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn file_read_tags_carry_identity_case_and_environment() {
    let source = testing::nyctaxi("tags-identity");
    let case = parquet_table_case();
    let tags = tags::build(&FILE_READ, Some(&source), Some(&case), &RunOptions::default());

    assert_eq!(tags["name"], TagValue::from("file-read"));
    assert_eq!(tags["dataset"], TagValue::from("nyctaxi_sample"));
    assert_eq!(tags["file_type"], TagValue::from("parquet"));
    assert_eq!(tags["compression"], TagValue::from("uncompressed"));
    assert_eq!(tags["output_type"], TagValue::from("table"));
    assert_eq!(tags["cpu_count"], TagValue::Null);
    assert_eq!(tags["gc_collect"], TagValue::from(true));
    assert_eq!(tags["gc_disable"], TagValue::from(true));
    assert_eq!(tags.len(), 8);
}

#[test]
fn tag_key_set_does_not_depend_on_the_runtime() {
    let source = testing::nyctaxi("tags-runtime");
    let case = parquet_table_case();

    let native = tags::build(&FILE_READ, Some(&source), Some(&case), &RunOptions::default());
    let external = tags::build(
        &FILE_READ,
        Some(&source),
        Some(&case),
        &RunOptions {
            language: Language::R,
            ..RunOptions::default()
        },
    );

    assert_eq!(native, external);
}

#[test]
fn boolean_shaped_case_values_become_boolean_tags() {
    let case = DATASET_READ.resolve(&CaseSelection::All).unwrap().remove(0);
    let tags = tags::build(&DATASET_READ, None, Some(&case), &RunOptions::default());

    assert_eq!(tags["pre_buffer"], TagValue::Bool(true));
}

#[test]
fn cpu_count_is_null_unless_set() {
    let options = RunOptions {
        cpu_count: Some(4),
        ..RunOptions::default()
    };
    let tags = tags::build(&DATASET_READ, None, None, &options);

    assert_eq!(tags["cpu_count"], TagValue::Int(4));
}

#[test]
fn tag_values_serialize_as_flat_scalars() {
    let source = testing::nyctaxi("tags-scalar");
    let case = parquet_table_case();
    let tags = tags::build(&FILE_READ, Some(&source), Some(&case), &RunOptions::default());

    let value = serde_json::to_value(&tags).unwrap();
    for (key, entry) in value.as_object().unwrap() {
        assert!(
            !entry.is_object() && !entry.is_array(),
            "tag {key} is not a scalar"
        );
    }
}
