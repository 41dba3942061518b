use thiserror::Error;

use relnorm_model::{NormalForm, Relation, SchemaError};

/// Errors raised while normalizing a schema.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The schema (or input supplied while normalizing) breaks a structural rule.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A stage found the relation in a state its own bookkeeping should
    /// have ruled out. This is a defect in the engine, not in the input.
    #[error("internal error in {stage} on relation {relation}: {message}")]
    Invariant {
        stage: NormalForm,
        relation: String,
        message: String,
    },

    /// Reading supplementary dependencies or sample tuples failed.
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}

impl NormalizeError {
    pub fn invariant(stage: NormalForm, relation: &Relation, message: impl Into<String>) -> Self {
        NormalizeError::Invariant {
            stage,
            relation: relation.name.clone(),
            message: message.into(),
        }
    }

    /// True for engine defects, as opposed to user-input errors.
    pub fn is_internal(&self) -> bool {
        matches!(self, NormalizeError::Invariant { .. })
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
