use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown language {0:?}, expected one of rust, native, r")]
    UnknownLanguage(String),
}

/// Which runtime executes a case: the native in-process path or the
/// external arrowbench (R) command line
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Native,
    R,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "rust",
            Self::R => "r",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // "python" is an accepted alias for the in-process runtime
        match value.to_lowercase().as_str() {
            "rust" | "native" | "python" => Ok(Self::Native),
            "r" => Ok(Self::R),
            other => Err(ConfigError::UnknownLanguage(other.to_owned())),
        }
    }
}

/// Per-run knobs shared by every benchmark type
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub language: Language,
    /// Thread-count hint for the columnar engine, None meaning runtime default
    pub cpu_count: Option<usize>,
    pub iterations: usize,
    /// Force a collection before each run (external runtime only)
    pub gc_collect: bool,
    /// Suspend automatic collection during each run (external runtime only)
    pub gc_disable: bool,
    /// Group executions together under one id
    pub run_id: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            language: Language::Native,
            cpu_count: None,
            iterations: 1,
            gc_collect: true,
            gc_disable: true,
            run_id: None,
        }
    }
}
