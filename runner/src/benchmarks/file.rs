use super::{required_source, RunError};
use crate::config::{Language, RunOptions};
use crate::dispatch::{
    self, build_r_command, Dispatch, ExecutableUnit, NativeUnit, RArgument,
};
use crate::formats::{self, Codec, Dataframe, FileType, Representation, Table};
use crate::matrix::{BenchmarkSchema, Case, Dimension};
use crate::measure::Output;
use crate::sources::Source;
use std::path::PathBuf;

const FILE_CASES: &[&[&str]] = &[
    &["parquet", "uncompressed", "table"],
    &["parquet", "uncompressed", "dataframe"],
    &["parquet", "snappy", "table"],
    &["parquet", "snappy", "dataframe"],
    &["feather", "uncompressed", "table"],
    &["feather", "uncompressed", "dataframe"],
    &["feather", "lz4", "table"],
    &["feather", "lz4", "dataframe"],
    &["feather", "zstd", "table"],
    &["feather", "zstd", "dataframe"],
];

const FILE_TYPE: Dimension = Dimension {
    name: "file_type",
    choices: &["feather", "parquet"],
};
const COMPRESSION: Dimension = Dimension {
    name: "compression",
    choices: &["uncompressed", "snappy", "lz4", "zstd"],
};

pub static FILE_READ: BenchmarkSchema = BenchmarkSchema {
    name: "file-read",
    r_name: Some("read_file"),
    dimensions: &[
        FILE_TYPE,
        COMPRESSION,
        Dimension {
            name: "output_type",
            choices: &["table", "dataframe"],
        },
    ],
    matrix: FILE_CASES,
};

pub static FILE_WRITE: BenchmarkSchema = BenchmarkSchema {
    name: "file-write",
    r_name: Some("write_file"),
    dimensions: &[
        FILE_TYPE,
        COMPRESSION,
        Dimension {
            name: "input_type",
            choices: &["table", "dataframe"],
        },
    ],
    matrix: FILE_CASES,
};

fn parse_case(case: &Case) -> Result<(FileType, Codec, Representation), RunError> {
    let file_type: FileType = case.get(0).parse()?;
    let codec: Codec = case.get(1).parse()?;
    let representation: Representation = case.get(2).parse()?;
    Ok((file_type, codec, representation))
}

fn skip_for_r(codec: Codec, case: &Case) -> Option<Dispatch> {
    if dispatch::r_supports(codec) {
        None
    } else {
        Some(Dispatch::Skip {
            reason: format!(
                "arrowbench does not support compression={codec}, skipping case {}",
                case.id()
            ),
        })
    }
}

type ReadUnit = fn(PathBuf) -> NativeUnit;

/// format x representation -> unit constructor; adding a combination is a
/// table insertion, not another branch chain
const READ_UNITS: &[(FileType, Representation, ReadUnit)] = &[
    (FileType::Parquet, Representation::Table, read_parquet_table),
    (
        FileType::Parquet,
        Representation::Dataframe,
        read_parquet_dataframe,
    ),
    (FileType::Feather, Representation::Table, read_feather_table),
    (
        FileType::Feather,
        Representation::Dataframe,
        read_feather_dataframe,
    ),
];

fn read_unit(file_type: FileType, representation: Representation) -> Option<ReadUnit> {
    READ_UNITS
        .iter()
        .find(|(declared_type, declared_representation, _)| {
            *declared_type == file_type && *declared_representation == representation
        })
        .map(|(_, _, constructor)| *constructor)
}

fn read_parquet_table(path: PathBuf) -> NativeUnit {
    NativeUnit::new(move || Ok(Output::Table(formats::read_parquet(&path, false)?)))
}

fn read_parquet_dataframe(path: PathBuf) -> NativeUnit {
    NativeUnit::new(move || {
        let table = formats::read_parquet(&path, false)?;
        Ok(Output::Dataframe(table.to_dataframe()?))
    })
}

fn read_feather_table(path: PathBuf) -> NativeUnit {
    NativeUnit::new(move || Ok(Output::Table(formats::read_feather(&path)?)))
}

fn read_feather_dataframe(path: PathBuf) -> NativeUnit {
    NativeUnit::new(move || {
        let table = formats::read_feather(&path)?;
        Ok(Output::Dataframe(table.to_dataframe()?))
    })
}

/// Read parquet & feather files into tables & dataframes
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReadBenchmark;

impl FileReadBenchmark {
    pub fn dispatch(
        &self,
        source: Option<&Source>,
        case: &Case,
        options: &RunOptions,
    ) -> Result<Dispatch, RunError> {
        let source = required_source(source, FILE_READ.name)?;
        let (file_type, codec, representation) = parse_case(case)?;

        if options.language == Language::R {
            let r_name = FILE_READ.r_name.ok_or(RunError::UnsupportedLanguage {
                benchmark: FILE_READ.name,
            })?;
            if let Some(skip) = skip_for_r(codec, case) {
                return Ok(skip);
            }
            let command = build_r_command(
                r_name,
                RArgument::Output,
                source.name(),
                file_type,
                codec,
                representation,
                options,
            );
            return Ok(Dispatch::Unit(ExecutableUnit::External(command)));
        }

        // materializing the input file is setup, not part of the read
        let path = source.create_if_not_exists(file_type, codec)?;
        let constructor =
            read_unit(file_type, representation).ok_or_else(|| RunError::NoNativeUnit {
                id: case.id(),
            })?;

        Ok(Dispatch::Unit(ExecutableUnit::Native(constructor(path))))
    }
}

/// The in-memory object a write benchmark consumes, materialized before
/// the measured unit is built
enum WriteInput {
    Table(Table),
    Dataframe(Dataframe),
}

fn write_parquet_unit(input: WriteInput, path: PathBuf, codec: Codec) -> NativeUnit {
    match input {
        WriteInput::Table(table) => NativeUnit::new(move || {
            formats::write_parquet(&table, &path, codec)?;
            Ok(Output::Written(path.clone()))
        }),
        WriteInput::Dataframe(frame) => NativeUnit::new(move || {
            // reassembling a table from the frame is part of the write under test
            formats::write_parquet(&frame.to_table(), &path, codec)?;
            Ok(Output::Written(path.clone()))
        }),
    }
}

fn write_feather_unit(input: WriteInput, path: PathBuf, codec: Codec) -> NativeUnit {
    match input {
        WriteInput::Table(table) => NativeUnit::new(move || {
            formats::write_feather(&table, &path, codec)?;
            Ok(Output::Written(path.clone()))
        }),
        WriteInput::Dataframe(frame) => NativeUnit::new(move || {
            formats::write_feather(&frame.to_table(), &path, codec)?;
            Ok(Output::Written(path.clone()))
        }),
    }
}

/// Write parquet & feather files from tables & dataframes
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriteBenchmark;

impl FileWriteBenchmark {
    pub fn dispatch(
        &self,
        source: Option<&Source>,
        case: &Case,
        options: &RunOptions,
    ) -> Result<Dispatch, RunError> {
        let source = required_source(source, FILE_WRITE.name)?;
        let (file_type, codec, representation) = parse_case(case)?;

        if options.language == Language::R {
            let r_name = FILE_WRITE.r_name.ok_or(RunError::UnsupportedLanguage {
                benchmark: FILE_WRITE.name,
            })?;
            if let Some(skip) = skip_for_r(codec, case) {
                return Ok(skip);
            }
            let command = build_r_command(
                r_name,
                RArgument::Input,
                source.name(),
                file_type,
                codec,
                representation,
                options,
            );
            return Ok(Dispatch::Unit(ExecutableUnit::External(command)));
        }

        let path = source.temp_path(file_type, codec)?;
        // building the table/dataframe is expensive setup and must stay
        // outside the measured unit
        let input = match representation {
            Representation::Table => WriteInput::Table(source.table()?.clone()),
            Representation::Dataframe => WriteInput::Dataframe(source.dataframe()?.clone()),
        };

        let unit = match file_type {
            FileType::Parquet => write_parquet_unit(input, path, codec),
            FileType::Feather => write_feather_unit(input, path, codec),
        };

        Ok(Dispatch::Unit(ExecutableUnit::Native(unit)))
    }
}
