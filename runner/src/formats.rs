use arrow::array::{ArrayRef, Float64Array, RecordBatch, RecordBatchReader, Scalar, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::{concat_batches, filter_record_batch};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::{FileWriter, IpcWriteOptions};
use arrow::ipc::CompressionType;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("unknown file type {0:?}")]
    UnknownFileType(String),
    #[error("unknown compression {0:?}")]
    UnknownCodec(String),
    #[error("unknown representation {0:?}")]
    UnknownRepresentation(String),
    #[error("{file_type} files do not support {codec} compression")]
    UnsupportedCodec { file_type: FileType, codec: Codec },
    #[error("no column named {0:?} in the table")]
    MissingColumn(String),
    #[error("I/O failed")]
    Io(#[from] std::io::Error),
    #[error("arrow operation failed")]
    Arrow(#[from] ArrowError),
    #[error("parquet operation failed")]
    Parquet(#[from] ParquetError),
}

/// On-disk file formats the harness benchmarks against
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Parquet,
    Feather,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Feather => "feather",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "parquet" => Ok(Self::Parquet),
            "feather" => Ok(Self::Feather),
            other => Err(FormatError::UnknownFileType(other.to_owned())),
        }
    }
}

/// Logical compression names, normalized per target format before writing
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Uncompressed,
    Snappy,
    Lz4,
    Zstd,
}

impl Codec {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncompressed => "uncompressed",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// Concrete codec token for the parquet writer ("uncompressed" maps to NONE)
    pub fn parquet(self) -> Compression {
        match self {
            Self::Uncompressed => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Lz4 => Compression::LZ4_RAW,
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }

    /// Concrete codec token for the feather (IPC) writer, None meaning no compression
    /// IPC has no snappy codec, the declared matrices never pair them
    pub fn feather(self) -> Result<Option<CompressionType>, FormatError> {
        match self {
            Self::Uncompressed => Ok(None),
            Self::Lz4 => Ok(Some(CompressionType::LZ4_FRAME)),
            Self::Zstd => Ok(Some(CompressionType::ZSTD)),
            Self::Snappy => Err(FormatError::UnsupportedCodec {
                file_type: FileType::Feather,
                codec: self,
            }),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "uncompressed" => Ok(Self::Uncompressed),
            "snappy" => Ok(Self::Snappy),
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            other => Err(FormatError::UnknownCodec(other.to_owned())),
        }
    }
}

/// In-memory shape a benchmark reads into or writes from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Table,
    Dataframe,
}

impl Representation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Dataframe => "dataframe",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Representation {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "table" => Ok(Self::Table),
            "dataframe" => Ok(Self::Dataframe),
            other => Err(FormatError::UnknownRepresentation(other.to_owned())),
        }
    }
}

/// Columnar table: a schema plus the record batches read or generated for it
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Compact all batches into a single contiguous frame
    pub fn to_dataframe(&self) -> Result<Dataframe, FormatError> {
        let batch = concat_batches(&self.schema, self.batches.iter())?;
        Ok(Dataframe { batch })
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table: {} rows x {} columns ({} batches)",
            self.num_rows(),
            self.num_columns(),
            self.batches.len()
        )
    }
}

/// Single contiguous record batch, the harness' dataframe representation
#[derive(Debug, Clone)]
pub struct Dataframe {
    batch: RecordBatch,
}

impl Dataframe {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn to_table(&self) -> Table {
        Table::new(self.batch.schema(), vec![self.batch.clone()])
    }
}

impl fmt::Display for Dataframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows x {} columns", self.num_rows(), self.num_columns())
    }
}

/// Read a delimited text file, inferring the schema from the full file
pub fn read_csv(path: &Path, delimiter: u8, header: bool) -> Result<Table, FormatError> {
    let mut file = File::open(path)?;
    let format = Format::default()
        .with_header(header)
        .with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(Table::new(schema, batches))
}

/// Read a parquet file into a table
/// `pre_buffer` slurps the whole file into memory before decoding starts
pub fn read_parquet(path: &Path, pre_buffer: bool) -> Result<Table, FormatError> {
    let reader = if pre_buffer {
        let buffer = Bytes::from(std::fs::read(path)?);
        ParquetRecordBatchReaderBuilder::try_new(buffer)?.build()?
    } else {
        ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?
    };

    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(Table::new(schema, batches))
}

pub fn write_parquet(table: &Table, path: &Path, codec: Codec) -> Result<(), FormatError> {
    let properties = WriterProperties::builder()
        .set_compression(codec.parquet())
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, table.schema(), Some(properties))?;

    for batch in table.batches() {
        writer.write(batch)?;
    }
    writer.close()?;

    Ok(())
}

pub fn read_feather(path: &Path) -> Result<Table, FormatError> {
    let reader = FileReader::try_new(File::open(path)?, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(Table::new(schema, batches))
}

pub fn write_feather(table: &Table, path: &Path, codec: Codec) -> Result<(), FormatError> {
    let options = IpcWriteOptions::default().try_with_compression(codec.feather()?)?;
    let schema = table.schema();
    let mut writer = FileWriter::try_new_with_options(File::create(path)?, &schema, options)?;

    for batch in table.batches() {
        writer.write(batch)?;
    }
    writer.finish()?;

    Ok(())
}

/// Keep only the rows where `column` equals `value`, batch by batch
pub fn filter_equals(table: &Table, column: &str, value: &str) -> Result<Table, FormatError> {
    let needle = Scalar::new(StringArray::from(vec![value]));
    let mut filtered = Vec::with_capacity(table.batches().len());

    for batch in table.batches() {
        let haystack = batch
            .column_by_name(column)
            .ok_or_else(|| FormatError::MissingColumn(column.to_owned()))?;
        let mask = eq(haystack, &needle)?;
        filtered.push(filter_record_batch(batch, &mask)?);
    }

    Ok(Table::new(table.schema(), filtered))
}

/// Generate a deterministic float64 table of the requested shape as a single batch
pub fn generate_wide_table(rows: usize, columns: usize) -> Result<Table, FormatError> {
    let fields: Vec<Field> = (0..columns)
        .map(|index| Field::new(format!("f{index}"), DataType::Float64, false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let arrays: Vec<ArrayRef> = (0..columns)
        .map(|index| {
            let values = (0..rows).map(|row| (index * rows + row) as f64);
            Arc::new(Float64Array::from_iter_values(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    Ok(Table::new(schema, vec![batch]))
}
