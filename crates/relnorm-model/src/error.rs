use thiserror::Error;

/// Violations of the structural rules a relation must satisfy.
///
/// These are user-input errors: they describe a schema that cannot be
/// normalized as written, never a fault of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("relation name must not be empty")]
    EmptyName,

    #[error("relation {relation} has no attributes")]
    EmptyAttributes { relation: String },

    #[error("relation {relation} has no primary key")]
    EmptyPrimaryKey { relation: String },

    #[error("relation {relation} declares attribute {attribute} more than once")]
    DuplicateAttribute { relation: String, attribute: String },

    #[error("{context} in relation {relation} references unknown attribute {attribute}")]
    UnknownAttribute {
        relation: String,
        attribute: String,
        context: &'static str,
    },

    #[error("multivalued attribute {attribute} of relation {relation} is part of the primary key")]
    MultivaluedKeyAttribute { relation: String, attribute: String },

    #[error("functional dependency has an empty determinant")]
    EmptyDeterminant,

    #[error("functional dependency {determinant} has no dependent attributes")]
    EmptyDependents { determinant: String },

    #[error("tuple {index} of relation {relation} has {actual} values, expected {expected}")]
    TupleArity {
        relation: String,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown normal form '{0}' (expected 1NF, 2NF, 3NF, BCNF, 4NF or 5NF)")]
    UnknownNormalForm(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
