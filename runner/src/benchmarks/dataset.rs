use super::{required_source, RunError};
use crate::config::{Language, RunOptions};
use crate::dispatch::{Dispatch, ExecutableUnit, NativeUnit};
use crate::formats::{self, Codec, FileType, Table};
use crate::matrix::{BenchmarkSchema, Case, Dimension};
use crate::measure::Output;
use crate::sources::Source;

pub static DATASET_READ: BenchmarkSchema = BenchmarkSchema {
    name: "dataset-read",
    r_name: None,
    dimensions: &[Dimension {
        name: "pre_buffer",
        choices: &["true", "false"],
    }],
    matrix: &[&["true"], &["false"]],
};

pub static DATASET_FILTER: BenchmarkSchema = BenchmarkSchema {
    name: "dataset-filter",
    r_name: None,
    dimensions: &[],
    matrix: &[&[]],
};

// fixed predicate: keep a single taxi vendor
const FILTER_COLUMN: &str = "vendor_id";
const FILTER_VALUE: &str = "DDS";

/// Read every parquet fragment of a multi-file source into one table
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetReadBenchmark;

impl DatasetReadBenchmark {
    pub fn dispatch(
        &self,
        source: Option<&Source>,
        case: &Case,
        options: &RunOptions,
    ) -> Result<Dispatch, RunError> {
        if options.language == Language::R {
            return Err(RunError::UnsupportedLanguage {
                benchmark: DATASET_READ.name,
            });
        }

        let source = required_source(source, DATASET_READ.name)?;
        let pre_buffer = case.get(0) == "true";
        let paths = source.dataset_paths()?;

        let unit = NativeUnit::new(move || {
            let first = formats::read_parquet(&paths[0], pre_buffer)?;
            let schema = first.schema();
            let mut batches = first.into_batches();
            for path in &paths[1..] {
                batches.extend(formats::read_parquet(path, pre_buffer)?.into_batches());
            }
            Ok(Output::Table(Table::new(schema, batches)))
        });

        Ok(Dispatch::Unit(ExecutableUnit::Native(unit)))
    }
}

/// Filter a dataset down to the rows matching a fixed predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetFilterBenchmark;

impl DatasetFilterBenchmark {
    pub fn dispatch(
        &self,
        source: Option<&Source>,
        _case: &Case,
        options: &RunOptions,
    ) -> Result<Dispatch, RunError> {
        if options.language == Language::R {
            return Err(RunError::UnsupportedLanguage {
                benchmark: DATASET_FILTER.name,
            });
        }

        let source = required_source(source, DATASET_FILTER.name)?;
        // materializing the parquet rendition of the source is setup
        let path = source.create_if_not_exists(FileType::Parquet, Codec::Uncompressed)?;

        let unit = NativeUnit::new(move || {
            let table = formats::read_parquet(&path, false)?;
            Ok(Output::Table(formats::filter_equals(
                &table,
                FILTER_COLUMN,
                FILTER_VALUE,
            )?))
        });

        Ok(Dispatch::Unit(ExecutableUnit::Native(unit)))
    }
}
