//! Bookkeeping shared by the dependency-driven stages.
//!
//! Every split carves a set of attributes out of a parent relation into a new
//! child keyed by some determinant. The helpers here keep the attributes,
//! keys, sample data and dependencies of both sides consistent.

use std::collections::BTreeSet;

use relnorm_model::{FunctionalDependency, NormalForm, Relation, same_attribute_set};
use tracing::debug;

use crate::error::{NormalizeError, Result};

/// Name of a derived relation: the concatenated attribute names plus `Data`.
pub(crate) fn derived_name<S: AsRef<[String]>>(parts: &[S]) -> String {
    let mut seen = BTreeSet::new();
    let mut name = String::new();
    for part in parts {
        for attr in part.as_ref() {
            if seen.insert(attr.as_str()) {
                name.push_str(attr);
            }
        }
    }
    name.push_str("Data");
    name
}

/// Fail with an invariant error unless every name is an attribute of `relation`.
pub(crate) fn ensure_present(
    relation: &Relation,
    stage: NormalForm,
    names: &[String],
) -> Result<()> {
    match names.iter().find(|name| !relation.has_attribute(name)) {
        Some(missing) => Err(NormalizeError::invariant(
            stage,
            relation,
            format!(
                "dependency references attribute {missing} which is no longer in the relation"
            ),
        )),
        None => Ok(()),
    }
}

/// Attributes of `relation` reachable from `start` through its single-valued
/// dependencies, skipping the dependencies at `skip`.
pub(crate) fn closure(
    relation: &Relation,
    start: &[String],
    skip: &BTreeSet<usize>,
) -> BTreeSet<String> {
    let mut reached: BTreeSet<String> = start.iter().cloned().collect();
    loop {
        let mut changed = false;
        for (index, fd) in relation.fds.iter().enumerate() {
            if skip.contains(&index) || fd.is_multivalued() {
                continue;
            }
            if !fd.determinant.iter().all(|name| reached.contains(name)) {
                continue;
            }
            for name in fd.dependent_attributes() {
                if relation.has_attribute(name) && reached.insert(name.clone()) {
                    changed = true;
                }
            }
        }
        if !changed {
            return reached;
        }
    }
}

/// True when `attrs` determine every attribute of `relation`.
///
/// The closure runs over the single-valued dependencies not in `skip`; once
/// it contains the primary key or a candidate key it covers the relation.
pub(crate) fn is_superkey(relation: &Relation, attrs: &[String], skip: &BTreeSet<usize>) -> bool {
    let reached = closure(relation, attrs, skip);
    let holds = |key: &Vec<String>| key.iter().all(|name| reached.contains(name));
    holds(&relation.primary_key)
        || relation.candidate_keys.iter().any(holds)
        || relation.attributes.iter().all(|attr| reached.contains(&attr.name))
}

/// Carve `key` plus `moving` out of `relation` into a child keyed by `key`.
///
/// Dependencies touching a moved attribute follow it: the child receives the
/// part that fits inside its attributes, the parent keeps whatever remains.
/// A dependency whose determinant loses a moved attribute but reaches outside
/// the child stays on the parent with `key` in place of the moved attributes,
/// since `key` determines them. Dependencies the parent can no longer hold
/// are added to `detached`; the caller removes them in one pass once the
/// stage is done with the indices.
pub(crate) fn split_off(
    relation: &mut Relation,
    stage: NormalForm,
    key: &[String],
    moving: &[String],
    detached: &mut BTreeSet<usize>,
) -> Result<Relation> {
    let mut child_names = key.to_vec();
    for name in moving {
        if !child_names.contains(name) {
            child_names.push(name.clone());
        }
    }
    let attributes = relation
        .typed_attributes(&child_names)
        .map_err(|error| NormalizeError::invariant(stage, relation, error.to_string()))?;
    let child_set: BTreeSet<String> = child_names.iter().cloned().collect();
    let moved: BTreeSet<String> = moving.iter().cloned().collect();

    let mut child = Relation::new(derived_name(&[key]), attributes, key.to_vec());
    child.data = relation.project_data(&child_names);

    let parent_name = relation.name.clone();
    for (index, fd) in relation.fds.iter_mut().enumerate() {
        if detached.contains(&index) || !fd.references_any(&moved) {
            continue;
        }
        if let Some(part) = fd.restricted_to(&child_set)
            && part.references_any(&moved)
            && !child.fds.contains(&part)
        {
            child.fds.push(part);
        }
        if fd.determinant_intersects(&moved) {
            if fd.references_only(&child_set) {
                detached.insert(index);
                continue;
            }
            let original = fd.to_string();
            fd.substitute_determinant(&moved, key);
            debug!(
                relation = %parent_name,
                from = %original,
                to = %fd,
                "rewrote dependency on a moved determinant"
            );
        }
        strip_dependents(fd, &moved);
        if !fd.has_dependents() {
            detached.insert(index);
        }
    }

    for name in moving {
        relation.remove_attribute(name);
    }
    child.candidate_keys = contained_keys(relation, &child_set, key);
    relation.prune_candidate_keys();
    Ok(child)
}

/// Remove every attribute in `removed` from the dependents of `fd`.
pub(crate) fn strip_dependents(fd: &mut FunctionalDependency, removed: &BTreeSet<String>) {
    for name in removed {
        fd.remove_dependent(name);
    }
}

/// Candidate keys of `relation` that fit inside `attrs`, other than `key`.
pub(crate) fn contained_keys(
    relation: &Relation,
    attrs: &BTreeSet<String>,
    key: &[String],
) -> Vec<Vec<String>> {
    relation
        .candidate_keys
        .iter()
        .filter(|candidate| candidate.iter().all(|name| attrs.contains(name)))
        .filter(|candidate| !same_attribute_set(candidate, key))
        .cloned()
        .collect()
}

/// Rewrite the primary key after key attributes moved out of the relation.
///
/// Surviving key attributes keep their order; `determinant` attributes are
/// appended. A key left empty falls back to every remaining attribute.
pub(crate) fn rekey(relation: &mut Relation, removed: &BTreeSet<String>, determinant: &[String]) {
    if !relation.primary_key.iter().any(|name| removed.contains(name)) {
        return;
    }
    let mut key: Vec<String> = relation
        .primary_key
        .iter()
        .filter(|name| !removed.contains(*name))
        .cloned()
        .collect();
    for name in determinant {
        if relation.has_attribute(name) && !key.contains(name) {
            key.push(name.clone());
        }
    }
    if key.is_empty() {
        key = relation.attribute_names();
    }
    relation.primary_key = key;
}
