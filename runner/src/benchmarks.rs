pub mod dataset;
pub mod file;
pub mod wide;

#[cfg(test)]
mod file_test;
#[cfg(test)]
mod wide_test;

use crate::config::RunOptions;
use crate::dispatch::{Dispatch, ExecutableUnit};
use crate::matrix::{BenchmarkSchema, Case, CaseSelection, InvalidCaseError};
use crate::measure::{self, BenchmarkResult, ExecutionError, Output};
use crate::sources::{Source, SourceError};
use crate::tags;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    InvalidCase(#[from] InvalidCaseError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("benchmark setup failed")]
    Setup(#[from] crate::formats::FormatError),
    #[error("{benchmark} requires a source argument")]
    MissingSource { benchmark: &'static str },
    #[error("{benchmark} only runs on the native runtime")]
    UnsupportedLanguage { benchmark: &'static str },
    #[error("no native unit for case {id:?}")]
    NoNativeUnit { id: String },
}

/// All benchmark types known to the harness
/// (this is deliberately not made with dynamic dispatch to avoid the headache)
#[derive(Debug, Clone)]
pub enum Benchmarks {
    FileRead(file::FileReadBenchmark),
    FileWrite(file::FileWriteBenchmark),
    DatasetRead(dataset::DatasetReadBenchmark),
    DatasetFilter(dataset::DatasetFilterBenchmark),
    WideDataframe(wide::WideDataframeBenchmark),
}

impl Benchmarks {
    pub fn all() -> Vec<Self> {
        vec![
            Self::FileRead(file::FileReadBenchmark),
            Self::FileWrite(file::FileWriteBenchmark),
            Self::DatasetRead(dataset::DatasetReadBenchmark),
            Self::DatasetFilter(dataset::DatasetFilterBenchmark),
            Self::WideDataframe(wide::WideDataframeBenchmark::default()),
        ]
    }

    pub fn schema(&self) -> &'static BenchmarkSchema {
        match self {
            Self::FileRead(_) => &file::FILE_READ,
            Self::FileWrite(_) => &file::FILE_WRITE,
            Self::DatasetRead(_) => &dataset::DATASET_READ,
            Self::DatasetFilter(_) => &dataset::DATASET_FILTER,
            Self::WideDataframe(_) => &wide::WIDE_DATAFRAME,
        }
    }

    fn dispatch(
        &self,
        source: Option<&Source>,
        case: &Case,
        options: &RunOptions,
    ) -> Result<Dispatch, RunError> {
        match self {
            Self::FileRead(benchmark) => benchmark.dispatch(source, case, options),
            Self::FileWrite(benchmark) => benchmark.dispatch(source, case, options),
            Self::DatasetRead(benchmark) => benchmark.dispatch(source, case, options),
            Self::DatasetFilter(benchmark) => benchmark.dispatch(source, case, options),
            Self::WideDataframe(benchmark) => benchmark.dispatch(case, options),
        }
    }

    /// Resolve the requested cases and execute them one at a time, in matrix
    /// order. Cases the selected runtime cannot execute are skipped with a
    /// warning and yield no result; a failing case aborts the run.
    pub fn run(
        &self,
        source: Option<&Source>,
        selection: &CaseSelection,
        options: &RunOptions,
    ) -> Result<Vec<(BenchmarkResult, Output)>, RunError> {
        let schema = self.schema();
        let cases = schema.resolve(selection)?;
        let mut results = Vec::with_capacity(cases.len());

        for case in cases {
            debug!(benchmark = schema.name, case = %case.id(), "Dispatching case");
            let tags = tags::build(schema, source, Some(&case), options);

            match self.dispatch(source, &case, options)? {
                Dispatch::Skip { reason } => {
                    warn!(case = %case.id(), "{reason}");
                    continue;
                }
                Dispatch::Unit(ExecutableUnit::Native(mut unit)) => {
                    results.push(measure::run(&mut unit, &tags, options)?);
                }
                Dispatch::Unit(ExecutableUnit::External(command)) => {
                    results.push(measure::r_run(&command, &tags, options)?);
                }
            }
        }

        Ok(results)
    }
}

/// Fetch the source argument benchmarks with inputs require
fn required_source<'a>(
    source: Option<&'a Source>,
    benchmark: &'static str,
) -> Result<&'a Source, RunError> {
    source.ok_or(RunError::MissingSource { benchmark })
}
