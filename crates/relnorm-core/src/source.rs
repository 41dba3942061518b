//! Supplementary input consulted by the 4NF and 5NF stages.
//!
//! Multivalued dependencies beyond the declared schema and sample tuples are
//! not part of the schema file; the orchestrator asks a [`DependencySource`]
//! for them right before a stage visits a relation.

use relnorm_model::{FunctionalDependency, Relation, Tuple};

use crate::error::Result;

/// Provider of extra dependencies and sample tuples for a relation.
///
/// Implementations validate their own input (re-prompting on malformed
/// declarations, for instance); whatever they return is still checked
/// against the relation before it is attached.
pub trait DependencySource {
    /// Additional (typically multivalued) dependencies holding on `relation`.
    fn additional_dependencies(&mut self, relation: &Relation) -> Result<Vec<FunctionalDependency>>;

    /// Sample tuples for `relation`, aligned with its attributes.
    fn sample_tuples(&mut self, relation: &Relation) -> Result<Vec<Tuple>>;
}

/// A source that never supplies anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAdditionalInput;

impl DependencySource for NoAdditionalInput {
    fn additional_dependencies(
        &mut self,
        _relation: &Relation,
    ) -> Result<Vec<FunctionalDependency>> {
        Ok(Vec::new())
    }

    fn sample_tuples(&mut self, _relation: &Relation) -> Result<Vec<Tuple>> {
        Ok(Vec::new())
    }
}
