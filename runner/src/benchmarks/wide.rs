use super::RunError;
use crate::config::{Language, RunOptions};
use crate::dispatch::{Dispatch, ExecutableUnit, NativeUnit};
use crate::formats::{self, Codec};
use crate::matrix::{BenchmarkSchema, Case, Dimension};
use crate::measure::Output;
use crate::sources;
use std::path::PathBuf;
use tracing::info;

pub static WIDE_DATAFRAME: BenchmarkSchema = BenchmarkSchema {
    name: "wide-dataframe",
    r_name: None,
    dimensions: &[Dimension {
        name: "use_legacy_dataset",
        choices: &["true", "false"],
    }],
    matrix: &[&["true"], &["false"]],
};

/// Read a generated wide (few rows, very many columns) parquet file back
/// into a dataframe
#[derive(Debug, Clone)]
pub struct WideDataframeBenchmark {
    pub rows: usize,
    pub columns: usize,
    pub data_dir: PathBuf,
}

impl Default for WideDataframeBenchmark {
    fn default() -> Self {
        Self {
            rows: 100,
            columns: 10_000,
            data_dir: PathBuf::from(
                std::env::var(sources::DATA_DIR_ENV).unwrap_or_else(|_| "data".to_owned()),
            ),
        }
    }
}

impl WideDataframeBenchmark {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Generate and persist the wide file once; generation and the write
    /// are setup, only the read back is measured
    fn materialize(&self) -> Result<PathBuf, RunError> {
        let dir = sources::temp_dir(&self.data_dir)?;
        let path = dir.join(format!("wide.{}x{}.parquet", self.rows, self.columns));
        if path.exists() {
            return Ok(path);
        }

        let table = formats::generate_wide_table(self.rows, self.columns)?;
        let staging = path.with_extension("parquet.part");
        formats::write_parquet(&table, &staging, Codec::Uncompressed)?;
        std::fs::rename(&staging, &path).map_err(crate::sources::SourceError::Io)?;

        info!(path = %path.display(), "Materialized wide table");
        Ok(path)
    }

    pub fn dispatch(&self, case: &Case, options: &RunOptions) -> Result<Dispatch, RunError> {
        if options.language == Language::R {
            return Err(RunError::UnsupportedLanguage {
                benchmark: WIDE_DATAFRAME.name,
            });
        }

        // the legacy read path decodes from a whole-file buffer, the new
        // one streams batches from the handle
        let buffered = case.get(0) == "true";
        let path = self.materialize()?;

        let unit = NativeUnit::new(move || {
            let table = formats::read_parquet(&path, buffered)?;
            Ok(Output::Dataframe(table.to_dataframe()?))
        });

        Ok(Dispatch::Unit(ExecutableUnit::Native(unit)))
    }
}
