use itertools::Itertools;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidCaseError {
    #[error("case {id:?} is not in the declared matrix for {benchmark}")]
    UnknownCase { benchmark: &'static str, id: String },
    #[error("{benchmark} has no case dimension named {name:?}")]
    UnknownDimension { benchmark: &'static str, name: String },
    #[error("{value:?} is not a valid {dimension} for {benchmark}")]
    UnknownValue {
        benchmark: &'static str,
        dimension: &'static str,
        value: String,
    },
    #[error("{benchmark} cases have {expected} values, got {got}")]
    WrongArity {
        benchmark: &'static str,
        expected: usize,
        got: usize,
    },
}

/// One case dimension: its semantic name and value domain.
/// The first choice is the default when the dimension is left unspecified.
#[derive(Debug, Clone, Copy)]
pub struct Dimension {
    pub name: &'static str,
    pub choices: &'static [&'static str],
}

/// Declared identity of a benchmark type: its name on both runtimes, the
/// case dimensions and the full list of valid combinations, in the order
/// "run all" iterates them
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkSchema {
    pub name: &'static str,
    /// Registered symbol on the external runtime, None when unsupported there
    pub r_name: Option<&'static str>,
    pub dimensions: &'static [Dimension],
    pub matrix: &'static [&'static [&'static str]],
}

/// One concrete parameter tuple, ordered like the schema's dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    values: Vec<String>,
}

impl Case {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> &str {
        &self.values[index]
    }

    /// Human-readable identifier: dimension values joined with `-`
    pub fn id(&self) -> String {
        self.values.iter().join("-")
    }
}

/// How the caller picks cases out of the declared matrix
#[derive(Debug, Clone)]
pub enum CaseSelection {
    /// Every declared case, in declaration order
    All,
    /// One full tuple, validated against the matrix
    Single(Vec<String>),
    /// Named per-dimension values; unset dimensions default to the first
    /// choice of their domain
    Options(BTreeMap<String, String>),
}

impl BenchmarkSchema {
    /// The declared matrix as concrete cases, in declaration order
    pub fn cases(&self) -> Vec<Case> {
        self.matrix
            .iter()
            .map(|values| Case::new(values.iter().map(|value| (*value).to_owned()).collect()))
            .collect()
    }

    pub fn case_ids(&self) -> Vec<String> {
        self.cases().iter().map(Case::id).collect()
    }

    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions
            .iter()
            .position(|dimension| dimension.name == name)
    }

    /// Resolve a selection into the concrete case list. Recomputed per call,
    /// so repeated resolution of the same selection is restartable.
    pub fn resolve(&self, selection: &CaseSelection) -> Result<Vec<Case>, InvalidCaseError> {
        match selection {
            CaseSelection::All => Ok(self.cases()),
            CaseSelection::Single(values) => {
                let case = Case::new(values.clone());
                self.validate(&case)?;
                Ok(vec![case])
            }
            CaseSelection::Options(options) => {
                for name in options.keys() {
                    if self.dimension_index(name).is_none() {
                        return Err(InvalidCaseError::UnknownDimension {
                            benchmark: self.name,
                            name: name.clone(),
                        });
                    }
                }

                let values = self
                    .dimensions
                    .iter()
                    .map(|dimension| match options.get(dimension.name) {
                        Some(value) if dimension.choices.contains(&value.as_str()) => {
                            Ok(value.clone())
                        }
                        Some(value) => Err(InvalidCaseError::UnknownValue {
                            benchmark: self.name,
                            dimension: dimension.name,
                            value: value.clone(),
                        }),
                        None => Ok(dimension.choices[0].to_owned()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let case = Case::new(values);
                self.validate(&case)?;
                Ok(vec![case])
            }
        }
    }

    fn validate(&self, case: &Case) -> Result<(), InvalidCaseError> {
        if case.values().len() != self.dimensions.len() {
            return Err(InvalidCaseError::WrongArity {
                benchmark: self.name,
                expected: self.dimensions.len(),
                got: case.values().len(),
            });
        }

        for (dimension, value) in self.dimensions.iter().zip(case.values()) {
            if !dimension.choices.contains(&value.as_str()) {
                return Err(InvalidCaseError::UnknownValue {
                    benchmark: self.name,
                    dimension: dimension.name,
                    value: value.clone(),
                });
            }
        }

        let declared = self
            .matrix
            .iter()
            .any(|declared| {
                declared
                    .iter()
                    .copied()
                    .eq(case.values().iter().map(String::as_str))
            });
        if !declared {
            return Err(InvalidCaseError::UnknownCase {
                benchmark: self.name,
                id: case.id(),
            });
        }

        Ok(())
    }
}
