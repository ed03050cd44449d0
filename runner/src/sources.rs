use crate::formats::{self, Codec, FileType, FormatError, Table};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DATA_DIR_ENV: &str = "COLBENCH_DATA_DIR";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("unknown source {0:?}")]
    UnknownSource(String),
    #[error("source file {} not found{}", .path.display(), upstream_hint(.url))]
    MissingFixture { path: PathBuf, url: Option<String> },
    #[error("source {0:?} does not declare a canonical file")]
    NoPath(String),
    #[error("cannot ingest {0:?}, expected a .csv or .parquet canonical file")]
    UnsupportedExtension(PathBuf),
    #[error("failed to parse source manifest")]
    Manifest(#[from] serde_yaml::Error),
    #[error("I/O failed")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

fn upstream_hint(url: &Option<String>) -> String {
    match url {
        Some(url) => format!(", fetch it from {url}"),
        None => String::new(),
    }
}

/// One named entry of the source store
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct StoreEntry {
    /// Canonical single-file source, relative to the data dir
    pub path: Option<PathBuf>,
    /// Dataset fragments for multi-file sources, relative to the data dir
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_header")]
    pub header: bool,
    /// Where the canonical file can be fetched from; provisioning is the
    /// operator's job, the harness only names the location on a miss
    pub url: Option<String>,
}

fn default_delimiter() -> char {
    ','
}

fn default_header() -> bool {
    true
}

impl StoreEntry {
    fn single(path: &str) -> Self {
        Self {
            path: Some(PathBuf::from(path)),
            paths: Vec::new(),
            delimiter: ',',
            header: true,
            url: None,
        }
    }

    fn delimited(path: &str, delimiter: char, header: bool) -> Self {
        Self {
            delimiter,
            header,
            ..Self::single(path)
        }
    }

    fn fragments(paths: &[&str]) -> Self {
        Self {
            path: None,
            paths: paths.iter().map(PathBuf::from).collect(),
            delimiter: ',',
            header: true,
            url: None,
        }
    }
}

fn builtin_entries() -> BTreeMap<String, StoreEntry> {
    let mut entries = BTreeMap::new();
    entries.insert(
        "nyctaxi_sample".to_owned(),
        StoreEntry::single("nyctaxi_sample.csv"),
    );
    entries.insert(
        "fanniemae_sample".to_owned(),
        StoreEntry::delimited("fanniemae_sample.csv", '|', false),
    );
    entries.insert(
        "chi_traffic_sample".to_owned(),
        StoreEntry {
            url: Some("https://ursa-qa.s3.amazonaws.com/chitraffic/chi_traffic_sample.parquet".to_owned()),
            ..StoreEntry::single("chi_traffic_sample.parquet")
        },
    );
    entries.insert(
        "nyctaxi_multi_parquet_sample".to_owned(),
        StoreEntry::fragments(&[
            "nyctaxi_multi/2009/01/data.parquet",
            "nyctaxi_multi/2009/02/data.parquet",
        ]),
    );
    entries
}

fn default_data_dir() -> PathBuf {
    env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Named store of benchmark input sources
#[derive(Debug, Clone)]
pub struct Store {
    entries: BTreeMap<String, StoreEntry>,
    data_dir: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_data_dir(default_data_dir())
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: builtin_entries(),
            data_dir: data_dir.into(),
        }
    }

    /// Merge entries from a YAML manifest over the built-in store
    pub fn overlay(&mut self, manifest: &Path) -> Result<(), SourceError> {
        let raw = fs::read_to_string(manifest)?;
        let entries: BTreeMap<String, StoreEntry> = serde_yaml::from_str(&raw)?;

        info!(
            manifest = %manifest.display(),
            count = entries.len(),
            "Overlaying source manifest"
        );
        self.entries.extend(entries);

        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: StoreEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Result<Source, SourceError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| SourceError::UnknownSource(name.to_owned()))?;

        Ok(Source::new(name, entry.clone(), self.data_dir.clone()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Temp dir for derived artifacts, shared by all sources of a data dir
pub fn temp_dir(data_dir: &Path) -> Result<PathBuf, SourceError> {
    let dir = data_dir.join("temp");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// A named input dataset usable as a table, a dataframe, or a file at a
/// given format/codec pair
#[derive(Debug)]
pub struct Source {
    name: String,
    entry: StoreEntry,
    data_dir: PathBuf,
    table: OnceCell<Table>,
    dataframe: OnceCell<formats::Dataframe>,
}

impl Source {
    pub fn new(name: impl Into<String>, entry: StoreEntry, data_dir: PathBuf) -> Self {
        Self {
            name: name.into(),
            entry,
            data_dir,
            table: OnceCell::new(),
            dataframe: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical file of a single-file source, verified to exist
    pub fn source_path(&self) -> Result<PathBuf, SourceError> {
        let relative = self
            .entry
            .path
            .as_ref()
            .ok_or_else(|| SourceError::NoPath(self.name.clone()))?;
        let path = self.data_dir.join(relative);

        if !path.is_file() {
            return Err(SourceError::MissingFixture {
                path,
                url: self.entry.url.clone(),
            });
        }

        Ok(path)
    }

    /// Fragment files of a multi-file dataset source, each verified to exist
    pub fn dataset_paths(&self) -> Result<Vec<PathBuf>, SourceError> {
        if self.entry.paths.is_empty() {
            // single-file sources still work as a one-fragment dataset
            return Ok(vec![self.source_path()?]);
        }

        self.entry
            .paths
            .iter()
            .map(|relative| {
                let path = self.data_dir.join(relative);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(SourceError::MissingFixture {
                        path,
                        url: self.entry.url.clone(),
                    })
                }
            })
            .collect()
    }

    /// Derived-artifact path: `<data_dir>/temp/<name>.<codec>.<file_type>`
    pub fn temp_path(&self, file_type: FileType, codec: Codec) -> Result<PathBuf, SourceError> {
        let dir = temp_dir(&self.data_dir)?;
        Ok(dir.join(format!("{}.{}.{}", self.name, codec, file_type)))
    }

    /// Materialize the source at (file_type, codec), reusing an existing
    /// artifact. Creation stages to a `.part` file and renames into place so
    /// an interrupted write never passes for a cached artifact.
    pub fn create_if_not_exists(
        &self,
        file_type: FileType,
        codec: Codec,
    ) -> Result<PathBuf, SourceError> {
        let path = self.temp_path(file_type, codec)?;
        if path.exists() {
            debug!(path = %path.display(), "Reusing materialized artifact");
            return Ok(path);
        }

        let staging = path.with_extension(format!("{file_type}.part"));
        let table = self.table()?;
        match file_type {
            FileType::Parquet => formats::write_parquet(table, &staging, codec)?,
            FileType::Feather => formats::write_feather(table, &staging, codec)?,
        }
        fs::rename(&staging, &path)?;

        info!(path = %path.display(), "Materialized source artifact");
        Ok(path)
    }

    /// Columnar form of the canonical file, read once and cached
    pub fn table(&self) -> Result<&Table, SourceError> {
        self.table.get_or_try_init(|| {
            let path = self.source_path()?;
            match path.extension().and_then(|extension| extension.to_str()) {
                Some("csv") => Ok(formats::read_csv(
                    &path,
                    self.entry.delimiter as u8,
                    self.entry.header,
                )?),
                Some("parquet") => Ok(formats::read_parquet(&path, false)?),
                _ => Err(SourceError::UnsupportedExtension(path)),
            }
        })
    }

    /// Contiguous-frame form, derived from the table once and cached
    pub fn dataframe(&self) -> Result<&formats::Dataframe, SourceError> {
        self.dataframe
            .get_or_try_init(|| Ok(self.table()?.to_dataframe()?))
    }
}
