use crate::config::RunOptions;
use crate::matrix::{BenchmarkSchema, Case};
use crate::sources::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar-only tag values; nested structures would break flat comparison
/// of tag sets across runs and runtimes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl TagValue {
    /// Case dimension values are strings; boolean-shaped ones become
    /// boolean tags so both runtimes report them identically
    pub fn from_case_value(value: &str) -> Self {
        match value {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Str(other.to_owned()),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Flat sorted mapping identifying a result for cross-run comparison
pub type Tags = BTreeMap<String, TagValue>;

/// Derive the full tag set for one case. Pure: fixed inputs always produce
/// the same mapping, and the key set does not depend on the runtime.
pub fn build(
    schema: &BenchmarkSchema,
    source: Option<&Source>,
    case: Option<&Case>,
    options: &RunOptions,
) -> Tags {
    let mut tags = Tags::new();
    tags.insert("name".to_owned(), TagValue::from(schema.name));

    if let Some(source) = source {
        tags.insert("dataset".to_owned(), TagValue::from(source.name()));
    }

    if let Some(case) = case {
        for (dimension, value) in schema.dimensions.iter().zip(case.values()) {
            tags.insert(
                dimension.name.to_owned(),
                TagValue::from_case_value(value),
            );
        }
    }

    let cpu_count = match options.cpu_count {
        Some(count) => TagValue::Int(count as i64),
        None => TagValue::Null,
    };
    tags.insert("cpu_count".to_owned(), cpu_count);
    tags.insert("gc_collect".to_owned(), TagValue::from(options.gc_collect));
    tags.insert("gc_disable".to_owned(), TagValue::from(options.gc_disable));

    tags
}
