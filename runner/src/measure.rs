use crate::config::{Language, RunOptions};
use crate::dispatch::{NativeUnit, RCommand};
use crate::formats::{Dataframe, FormatError, Table};
use crate::tags::Tags;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("benchmark unit failed for case {tags:?}")]
    Unit {
        tags: Tags,
        #[source]
        source: FormatError,
    },
    #[error("failed to spawn the external runtime for case {tags:?}")]
    Spawn {
        tags: Tags,
        #[source]
        source: std::io::Error,
    },
    #[error("external runtime exited with status {status} for case {tags:?}: {stderr}")]
    External {
        tags: Tags,
        status: i32,
        stderr: String,
    },
    #[error("external runtime produced no timing record for case {tags:?}")]
    MissingTimings { tags: Tags },
}

/// Object produced by the measured unit, returned to the caller verbatim
/// for downstream correctness assertions
#[derive(Debug)]
pub enum Output {
    Table(Table),
    Dataframe(Dataframe),
    /// Write benchmarks yield the path they wrote
    Written(PathBuf),
    /// Raw stdout of the external runtime
    External(String),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(table) => table.fmt(f),
            Self::Dataframe(frame) => frame.fmt(f),
            Self::Written(path) => write!(f, "wrote {}", path.display()),
            Self::External(stdout) => f.write_str(stdout),
        }
    }
}

/// Where the timing came from; the result shape is the same either way
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub benchmark_language: &'static str,
    pub harness_version: &'static str,
    pub host_cpu_cores: usize,
}

impl Context {
    fn for_language(language: Language) -> Self {
        let benchmark_language = match language {
            Language::Native => "Rust",
            Language::R => "R",
        };

        Self {
            benchmark_language,
            harness_version: env!("CARGO_PKG_VERSION"),
            host_cpu_cores: num_cpus::get(),
        }
    }
}

/// Aggregated per-iteration wall-clock timings, in seconds
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub run_id: String,
    pub timestamp: String,
    pub iterations: usize,
    pub times: Vec<f64>,
    pub unit: &'static str,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stdev: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl Stats {
    pub fn from_durations(durations: &[Duration], run_id: Option<&str>) -> Self {
        let times: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
        Self::from_times(times, run_id)
    }

    pub fn from_times(times: Vec<f64>, run_id: Option<&str>) -> Self {
        let iterations = times.len();
        let mean = if iterations == 0 {
            0.0
        } else {
            times.iter().sum::<f64>() / iterations as f64
        };
        let stdev = if iterations < 2 {
            0.0
        } else {
            let variance = times
                .iter()
                .map(|time| (time - mean).powi(2))
                .sum::<f64>()
                / (iterations - 1) as f64;
            variance.sqrt()
        };

        let median = percentile(&times, 50.0);
        let q1 = percentile(&times, 25.0);
        let q3 = percentile(&times, 75.0);
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            run_id: run_id
                .map(str::to_owned)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: Utc::now().to_rfc3339(),
            iterations,
            unit: "s",
            mean,
            median,
            min: if iterations == 0 { 0.0 } else { min },
            max: if iterations == 0 { 0.0 } else { max },
            stdev,
            q1,
            q3,
            iqr: q3 - q1,
            times,
        }
    }
}

/// Linear interpolation between nearest ranks
fn percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    if samples.len() == 1 {
        return samples[0];
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - lower as f64;

    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Uniform record yielded for every measured case, identical in shape for
/// both runtimes
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub tags: Tags,
    pub context: Context,
    pub stats: Stats,
}

/// Execute a native unit `iterations` times, timing each call and keeping
/// the last output. The unit was constructed before this point, so setup
/// cost never lands in the measured interval. The gc flags have no native
/// analog; they only steer the external runtime.
pub fn run(
    unit: &mut NativeUnit,
    tags: &Tags,
    options: &RunOptions,
) -> Result<(BenchmarkResult, Output), ExecutionError> {
    let iterations = options.iterations.max(1);
    let mut durations = Vec::with_capacity(iterations);
    let mut last = None;

    for iteration in 0..iterations {
        let start = Instant::now();
        let output = unit.call().map_err(|source| ExecutionError::Unit {
            tags: tags.clone(),
            source,
        })?;
        let elapsed = start.elapsed();

        debug!(iteration, elapsed_ns = elapsed.as_nanos() as u64, "Finished iteration");
        durations.push(elapsed);
        last = Some(output);
    }

    let result = BenchmarkResult {
        tags: tags.clone(),
        context: Context::for_language(Language::Native),
        stats: Stats::from_durations(&durations, options.run_id.as_deref()),
    };
    // the loop above ran at least once
    let output = last.ok_or(ExecutionError::MissingTimings { tags: tags.clone() })?;

    Ok((result, output))
}

#[derive(Deserialize)]
struct RTimings {
    times: Vec<f64>,
}

/// Execute an external-runtime command and normalize its timings into the
/// same result shape as the native path. The external runner iterates
/// internally (`n_iter`), reporting per-iteration times as a JSON line
/// `{"times": [..]}` on stdout; the call blocks until it finishes, with no
/// timeout of our own on top.
pub fn r_run(
    command: &RCommand,
    tags: &Tags,
    options: &RunOptions,
) -> Result<(BenchmarkResult, Output), ExecutionError> {
    debug!(command = %command.command, "Spawning external runtime");

    let captured = Command::new("R")
        .args(["--vanilla", "--quiet", "-e", command.command.as_str()])
        .output()
        .map_err(|source| ExecutionError::Spawn {
            tags: tags.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
    if !captured.status.success() {
        return Err(ExecutionError::External {
            tags: tags.clone(),
            status: captured.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&captured.stderr).into_owned(),
        });
    }

    let times = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<RTimings>(line.trim()).ok())
        .last()
        .ok_or_else(|| ExecutionError::MissingTimings { tags: tags.clone() })?
        .times;

    let result = BenchmarkResult {
        tags: tags.clone(),
        context: Context::for_language(Language::R),
        stats: Stats::from_times(times, options.run_id.as_deref()),
    };

    Ok((result, Output::External(stdout)))
}
