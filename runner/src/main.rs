mod benchmarks;
mod config;
mod dispatch;
mod formats;
mod matrix;
mod measure;
mod sources;
mod tags;

#[cfg(test)]
mod matrix_test;
#[cfg(test)]
mod sources_test;
#[cfg(test)]
mod tags_test;
#[cfg(test)]
mod testing;

use benchmarks::{Benchmarks, RunError};
use clap::{ArgAction, Args, Parser, Subcommand};
use config::{Language, RunOptions};
use matrix::CaseSelection;
use measure::{BenchmarkResult, Output};
use sources::Store;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::exit;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_unwrap::ResultExt;

#[derive(Parser, Debug)]
#[command(name = "colbench", version, about = "Columnar I/O benchmark runner")]
struct Cli {
    /// YAML manifest of additional sources, merged over the built-in store
    #[arg(long, global = true)]
    sources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Thread-count hint for the columnar engine
    #[arg(long)]
    cpu_count: Option<usize>,

    /// Number of times to run each case
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Force a collection before each run (external runtime only)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    gc_collect: bool,

    /// Suspend automatic collection during each run (external runtime only)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    gc_disable: bool,

    /// Print each result record as JSON
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    show_result: bool,

    /// Print each case's produced output
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    show_output: bool,

    /// Group executions together with a run id
    #[arg(long)]
    run_id: Option<String>,
}

impl CommonArgs {
    fn options(&self, language: Language) -> RunOptions {
        RunOptions {
            language,
            cpu_count: self.cpu_count,
            iterations: self.iterations,
            gc_collect: self.gc_collect,
            gc_disable: self.gc_disable,
            run_id: self.run_id.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct FileCaseArgs {
    /// Runtime executing the cases ("rust" or "r")
    #[arg(long, default_value = "rust")]
    language: String,

    /// Run all declared case combinations
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    all: bool,

    /// Full case tuple, comma separated (e.g. "parquet,uncompressed,table")
    #[arg(long)]
    case: Option<String>,

    #[arg(long)]
    file_type: Option<String>,

    #[arg(long)]
    compression: Option<String>,
}

impl FileCaseArgs {
    fn selection(&self, representation_key: &str, representation: &Option<String>) -> CaseSelection {
        if let Some(case) = &self.case {
            return CaseSelection::Single(case.split(',').map(str::to_owned).collect());
        }
        if self.all {
            return CaseSelection::All;
        }

        let mut options = BTreeMap::new();
        if let Some(file_type) = &self.file_type {
            options.insert("file_type".to_owned(), file_type.clone());
        }
        if let Some(compression) = &self.compression {
            options.insert("compression".to_owned(), compression.clone());
        }
        if let Some(representation) = representation {
            options.insert(representation_key.to_owned(), representation.clone());
        }
        CaseSelection::Options(options)
    }
}

fn toggle_selection(name: &'static str, value: &Option<String>, all: bool) -> CaseSelection {
    if all {
        return CaseSelection::All;
    }
    match value {
        Some(value) => {
            let mut options = BTreeMap::new();
            options.insert(name.to_owned(), value.clone());
            CaseSelection::Options(options)
        }
        None => CaseSelection::Options(BTreeMap::new()),
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read parquet & feather files into tables & dataframes
    FileRead {
        /// A source name from the benchmark source store
        source: String,

        /// The target output type on read ("table" or "dataframe")
        #[arg(long)]
        output_type: Option<String>,

        #[command(flatten)]
        case: FileCaseArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write parquet & feather files from tables & dataframes
    FileWrite {
        /// A source name from the benchmark source store
        source: String,

        /// The type of the in-memory input ("table" or "dataframe")
        #[arg(long)]
        input_type: Option<String>,

        #[command(flatten)]
        case: FileCaseArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Read a multi-file parquet dataset into one table
    DatasetRead {
        source: String,

        #[arg(long)]
        pre_buffer: Option<String>,

        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        all: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Filter a dataset down to the rows matching a fixed predicate
    DatasetFilter {
        source: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Read a generated wide parquet file back into a dataframe
    WideDataframe {
        #[arg(long)]
        use_legacy_dataset: Option<String>,

        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        all: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List benchmarks and their declared case combinations
    List,
}

fn report(results: &[(BenchmarkResult, Output)], common: &CommonArgs) {
    for (result, output) in results {
        if common.show_result {
            // serializing our own record cannot fail
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_log());
        }
        if common.show_output {
            println!("{output}");
        }
    }
}

fn execute(cli: Cli) -> Result<(), RunError> {
    let mut store = Store::new();
    if let Some(manifest) = &cli.sources {
        store.overlay(manifest)?;
    }

    match cli.command {
        Commands::FileRead {
            source,
            output_type,
            case,
            common,
        } => {
            let source = store.get(&source)?;
            let language: Language = case.language.parse()?;
            let selection = case.selection("output_type", &output_type);
            let options = common.options(language);
            let benchmark = Benchmarks::FileRead(benchmarks::file::FileReadBenchmark);
            let results = benchmark.run(Some(&source), &selection, &options)?;
            report(&results, &common);
        }
        Commands::FileWrite {
            source,
            input_type,
            case,
            common,
        } => {
            let source = store.get(&source)?;
            let language: Language = case.language.parse()?;
            let selection = case.selection("input_type", &input_type);
            let options = common.options(language);
            let benchmark = Benchmarks::FileWrite(benchmarks::file::FileWriteBenchmark);
            let results = benchmark.run(Some(&source), &selection, &options)?;
            report(&results, &common);
        }
        Commands::DatasetRead {
            source,
            pre_buffer,
            all,
            common,
        } => {
            let source = store.get(&source)?;
            let selection = toggle_selection("pre_buffer", &pre_buffer, all);
            let options = common.options(Language::Native);
            let benchmark = Benchmarks::DatasetRead(benchmarks::dataset::DatasetReadBenchmark);
            let results = benchmark.run(Some(&source), &selection, &options)?;
            report(&results, &common);
        }
        Commands::DatasetFilter { source, common } => {
            let source = store.get(&source)?;
            let options = common.options(Language::Native);
            let benchmark =
                Benchmarks::DatasetFilter(benchmarks::dataset::DatasetFilterBenchmark);
            let results =
                benchmark.run(Some(&source), &CaseSelection::Options(BTreeMap::new()), &options)?;
            report(&results, &common);
        }
        Commands::WideDataframe {
            use_legacy_dataset,
            all,
            common,
        } => {
            let selection = toggle_selection("use_legacy_dataset", &use_legacy_dataset, all);
            let options = common.options(Language::Native);
            let benchmark = Benchmarks::WideDataframe(
                benchmarks::wide::WideDataframeBenchmark::default(),
            );
            let results = benchmark.run(None, &selection, &options)?;
            report(&results, &common);
        }
        Commands::List => {
            for benchmark in Benchmarks::all() {
                let schema = benchmark.schema();
                println!("{}", schema.name);
                for id in schema.case_ids() {
                    if !id.is_empty() {
                        println!("  {id}");
                    }
                }
            }
            println!("sources:");
            for name in store.names() {
                println!("  {name}");
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(error) = execute(cli) {
        error!("{error}");
        exit(1);
    }
}
