use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Normal forms the engine can decompose a relation into, in the order the
/// stages run. Requesting a form runs every stage up to and including it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalForm {
    /// No repeating groups: multivalued attributes extracted.
    First,
    /// No partial dependencies on a key.
    Second,
    /// No transitive dependencies of non-key attributes.
    Third,
    /// Every determinant is the key.
    BoyceCodd,
    /// No non-trivial multivalued dependencies.
    Fourth,
    /// No non-trivial join dependencies.
    Fifth,
}

impl NormalForm {
    pub const ALL: [NormalForm; 6] = [
        NormalForm::First,
        NormalForm::Second,
        NormalForm::Third,
        NormalForm::BoyceCodd,
        NormalForm::Fourth,
        NormalForm::Fifth,
    ];

    /// Returns the token used on the command line and in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalForm::First => "1NF",
            NormalForm::Second => "2NF",
            NormalForm::Third => "3NF",
            NormalForm::BoyceCodd => "BCNF",
            NormalForm::Fourth => "4NF",
            NormalForm::Fifth => "5NF",
        }
    }

    /// Returns every stage that has to run to reach this form, in order.
    pub fn stages(self) -> impl Iterator<Item = NormalForm> {
        Self::ALL.into_iter().filter(move |form| *form <= self)
    }

    /// Returns true for the stages that consult sample tuples.
    pub fn uses_samples(&self) -> bool {
        matches!(self, NormalForm::Fourth | NormalForm::Fifth)
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalForm {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "1NF" => Ok(NormalForm::First),
            "2NF" => Ok(NormalForm::Second),
            "3NF" => Ok(NormalForm::Third),
            "BCNF" => Ok(NormalForm::BoyceCodd),
            "4NF" => Ok(NormalForm::Fourth),
            "5NF" => Ok(NormalForm::Fifth),
            _ => Err(SchemaError::UnknownNormalForm(s.trim().to_string())),
        }
    }
}
