use crate::benchmarks::Benchmarks;
use crate::benchmarks::file::{FILE_READ, FILE_WRITE};
use crate::matrix::{CaseSelection, InvalidCaseError};
use itertools::Itertools;
use std::collections::BTreeMap;

#[test]
fn declared_matrices_are_unique_and_within_domains() {
    for benchmark in Benchmarks::all() {
        let schema = benchmark.schema();
        let cases = schema.cases();

        assert!(
            cases.iter().map(|case| case.id()).all_unique(),
            "{} declares a duplicate case",
            schema.name
        );

        for case in &cases {
            assert_eq!(case.values().len(), schema.dimensions.len());
            for (dimension, value) in schema.dimensions.iter().zip(case.values()) {
                assert!(
                    dimension.choices.contains(&value.as_str()),
                    "{}: {value:?} is outside the {} domain",
                    schema.name,
                    dimension.name
                );
            }
        }
    }
}

#[test]
fn resolve_all_returns_declaration_order() {
    let cases = FILE_READ.resolve(&CaseSelection::All).unwrap();

    assert_eq!(cases.len(), 10);
    assert_eq!(cases[0].id(), "parquet-uncompressed-table");
    assert_eq!(cases[9].id(), "feather-zstd-dataframe");
}

#[test]
fn resolve_is_restartable() {
    let first = FILE_WRITE.resolve(&CaseSelection::All).unwrap();
    let second = FILE_WRITE.resolve(&CaseSelection::All).unwrap();

    assert_eq!(first, second);
}

#[test]
fn resolve_single_accepts_declared_tuples() {
    let selection = CaseSelection::Single(
        ["feather", "zstd", "dataframe"].map(str::to_owned).to_vec(),
    );
    let cases = FILE_READ.resolve(&selection).unwrap();

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].id(), "feather-zstd-dataframe");
}

#[test]
fn resolve_single_rejects_undeclared_tuples() {
    // every value is in its domain, but the combination is not declared
    let selection = CaseSelection::Single(
        ["parquet", "zstd", "table"].map(str::to_owned).to_vec(),
    );

    assert!(matches!(
        FILE_READ.resolve(&selection),
        Err(InvalidCaseError::UnknownCase { .. })
    ));
}

#[test]
fn resolve_single_rejects_wrong_arity() {
    let selection = CaseSelection::Single(["parquet"].map(str::to_owned).to_vec());

    assert!(matches!(
        FILE_READ.resolve(&selection),
        Err(InvalidCaseError::WrongArity { expected: 3, got: 1, .. })
    ));
}

#[test]
fn unspecified_options_default_to_first_choice() {
    let cases = FILE_READ
        .resolve(&CaseSelection::Options(BTreeMap::new()))
        .unwrap();

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].id(), "feather-uncompressed-table");
}

#[test]
fn partial_options_fill_remaining_dimensions() {
    let mut options = BTreeMap::new();
    options.insert("file_type".to_owned(), "parquet".to_owned());
    let cases = FILE_READ.resolve(&CaseSelection::Options(options)).unwrap();

    assert_eq!(cases[0].id(), "parquet-uncompressed-table");
}

#[test]
fn options_reject_unknown_dimension_names_and_values() {
    let mut unknown_name = BTreeMap::new();
    unknown_name.insert("colour".to_owned(), "pink".to_owned());
    assert!(matches!(
        FILE_READ.resolve(&CaseSelection::Options(unknown_name)),
        Err(InvalidCaseError::UnknownDimension { .. })
    ));

    let mut unknown_value = BTreeMap::new();
    unknown_value.insert("compression".to_owned(), "brotli".to_owned());
    assert!(matches!(
        FILE_READ.resolve(&CaseSelection::Options(unknown_value)),
        Err(InvalidCaseError::UnknownValue { .. })
    ));
}
