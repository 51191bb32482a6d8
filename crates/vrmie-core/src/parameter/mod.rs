//! Parameter records for pure substances and their lookup in json files.
use crate::errors::{EosError, EosResult};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::ops::Deref;
use std::path::Path;

mod identifier;
pub use identifier::{Identifier, IdentifierOption};

/// A collection of parameters of a pure substance.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PureRecord<M> {
    pub identifier: Identifier,
    /// Molar weight in units of g/mol
    pub molarweight: f64,
    #[serde(flatten)]
    pub model_record: M,
}

impl<M> PureRecord<M> {
    pub fn new(identifier: Identifier, molarweight: f64, model_record: M) -> Self {
        Self {
            identifier,
            molarweight,
            model_record,
        }
    }

    /// Read the records of the given substances from a json file.
    ///
    /// The records are returned in the order of `substances`.
    pub fn from_json<P, S>(
        substances: &[S],
        file: P,
        identifier_option: IdentifierOption,
    ) -> EosResult<Vec<Self>>
    where
        P: AsRef<Path>,
        S: Deref<Target = str>,
        M: DeserializeOwned,
    {
        let mut queried = IndexSet::with_capacity(substances.len());
        for s in substances {
            if !queried.insert(s.deref()) {
                return Err(EosError::DuplicateSubstance(s.to_string()));
            }
        }

        let reader = BufReader::new(File::open(file)?);
        let file_records: Vec<Self> = serde_json::from_reader(reader)?;
        let mut records: HashMap<String, Self> = file_records
            .into_iter()
            .filter_map(|record| {
                record
                    .identifier
                    .as_str(identifier_option)
                    .map(|id| id.to_owned())
                    .filter(|id| queried.contains(id.as_str()))
                    .map(|id| (id, record))
            })
            .collect();

        let missing = queried
            .iter()
            .filter(|id| !records.contains_key(**id))
            .join(", ");
        if !missing.is_empty() {
            return Err(EosError::SubstanceNotFound(missing));
        }

        Ok(queried
            .into_iter()
            .filter_map(|id| records.remove(id))
            .collect())
    }
}

impl<M: fmt::Display> fmt::Display for PureRecord<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PureRecord(identifier={}, molarweight={}, model_record={})",
            self.identifier, self.molarweight, self.model_record
        )
    }
}
