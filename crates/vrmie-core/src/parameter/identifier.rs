use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Possible variants to identify a substance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierOption {
    Cas,
    Name,
    IupacName,
    Smiles,
    Inchi,
    Formula,
}

impl fmt::Display for IdentifierOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            Self::Cas => "CAS",
            Self::Name => "name",
            Self::IupacName => "IUPAC name",
            Self::Smiles => "SMILES",
            Self::Inchi => "InChI",
            Self::Formula => "formula",
        };
        write!(f, "{str}")
    }
}

/// A collection of identifiers for a substance.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    /// CAS number
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// Commonly used english name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// IUPAC name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,
    /// SMILES key
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,
    /// InchI key
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inchi: Option<String>,
    /// Chemical formula
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Identifier {
    /// Identifier that only carries a name.
    pub fn from_name(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn as_str(&self, option: IdentifierOption) -> Option<&str> {
        match option {
            IdentifierOption::Cas => self.cas.as_deref(),
            IdentifierOption::Name => self.name.as_deref(),
            IdentifierOption::IupacName => self.iupac_name.as_deref(),
            IdentifierOption::Smiles => self.smiles.as_deref(),
            IdentifierOption::Inchi => self.inchi.as_deref(),
            IdentifierOption::Formula => self.formula.as_deref(),
        }
    }

    fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("cas", self.cas.as_deref()),
            ("name", self.name.as_deref()),
            ("iupac_name", self.iupac_name.as_deref()),
            ("smiles", self.smiles.as_deref()),
            ("inchi", self.inchi.as_deref()),
            ("formula", self.formula.as_deref()),
        ]
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self
            .entries()
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
            .join(", ");
        write!(f, "Identifier({ids})")
    }
}
