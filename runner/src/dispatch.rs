use crate::config::RunOptions;
use crate::formats::{Codec, FileType, FormatError, Representation};
use crate::measure::Output;
use std::fmt;

/// Codecs the external arrowbench runtime cannot read or write
pub const R_UNSUPPORTED_CODECS: &[Codec] = &[Codec::Lz4];

pub fn r_supports(codec: Codec) -> bool {
    !R_UNSUPPORTED_CODECS.contains(&codec)
}

/// Zero-argument unit of work for the native runtime. Everything expensive
/// to set up is captured at construction time; calling it performs only the
/// operation under measurement.
pub struct NativeUnit {
    f: Box<dyn FnMut() -> Result<Output, FormatError>>,
}

impl NativeUnit {
    pub fn new(f: impl FnMut() -> Result<Output, FormatError> + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    pub fn call(&mut self) -> Result<Output, FormatError> {
        (self.f)()
    }
}

impl fmt::Debug for NativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeUnit")
    }
}

/// Single-line invocation handed to the external runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RCommand {
    pub command: String,
}

/// A case turned into something a runtime can execute
#[derive(Debug)]
pub enum ExecutableUnit {
    Native(NativeUnit),
    External(RCommand),
}

/// Dispatch outcome for one case: a runnable unit, or a skip for
/// combinations the selected runtime cannot execute
#[derive(Debug)]
pub enum Dispatch {
    Unit(ExecutableUnit),
    Skip { reason: String },
}

/// Whether the benchmarked operation consumes or produces the in-memory
/// representation, which decides the keyword the external runner expects
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RArgument {
    Input,
    Output,
}

impl RArgument {
    fn key(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// The external runtime's own names for the in-memory representations
pub fn r_representation(representation: Representation) -> &'static str {
    match representation {
        Representation::Table => "arrow_table",
        Representation::Dataframe => "data_frame",
    }
}

/// Serialize a case into the arrowbench single-case runner invocation.
/// Pure: the same case and options always produce the same command line.
pub fn build_r_command(
    r_name: &str,
    argument: RArgument,
    source_name: &str,
    file_type: FileType,
    codec: Codec,
    representation: Representation,
    options: &RunOptions,
) -> RCommand {
    let cpu_count = match options.cpu_count {
        Some(count) => count.to_string(),
        None => "NULL".to_owned(),
    };

    let command = format!(
        "library(arrowbench); run_one({r_name}, source=\"{source_name}\", \
         format=\"{file_type}\", compression=\"{codec}\", {}=\"{}\", \
         n_iter={}, cpu_count={cpu_count})",
        argument.key(),
        r_representation(representation),
        options.iterations,
    );

    RCommand { command }
}
