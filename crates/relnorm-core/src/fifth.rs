//! Fifth normal form: lossless decomposition by join dependency.
//!
//! Join dependencies cannot be declared in the schema, so they are tested
//! empirically against the relation's sample tuples. Candidate
//! decompositions are tried in this order:
//!
//! 1. every two-way cover with a non-empty overlap, smallest overlap first;
//! 2. for component size `m = 2..n-1`, the cover by all `m`-attribute
//!    subsets, greedily reduced while it stays lossless.
//!
//! The first decomposition whose projections join back to exactly the
//! sample tuples is applied, provided every dependency fits inside one
//! component and the keys do not already imply it. A join dependency is
//! implied by the keys when merging components whose shared attributes form
//! a superkey ends in one component spanning the relation. A relation whose
//! only join dependencies are of that kind is already in fifth normal form.

use std::collections::BTreeSet;

use relnorm_model::{NormalForm, Relation, Tuple};
use tracing::{debug, warn};

use crate::error::{NormalizeError, Result};
use crate::join::{covers, is_lossless};
use crate::split::{contained_keys, derived_name, is_superkey, rekey, strip_dependents};

/// Default upper bound on the attribute count the search runs on.
pub const DEFAULT_JOIN_SEARCH_LIMIT: usize = 10;

/// Attribute masks are `u32`; keep well clear of the width.
const MAX_SEARCH_ATTRIBUTES: usize = 16;

/// Decompose along a join dependency using the default search limit.
pub fn to_5nf(relation: &mut Relation) -> Result<Vec<Relation>> {
    to_5nf_with_limit(relation, DEFAULT_JOIN_SEARCH_LIMIT)
}

/// Decompose along a join dependency found in the sample tuples.
///
/// Relations with two or fewer attributes, without sample tuples, or with
/// more than `limit` attributes are returned unchanged. The receiver keeps
/// the component holding its primary key (or the first component); the other
/// components are returned.
pub fn to_5nf_with_limit(relation: &mut Relation, limit: usize) -> Result<Vec<Relation>> {
    let stage = NormalForm::Fifth;
    let arity = relation.attributes.len();
    if arity <= 2 || relation.data.is_empty() {
        return Ok(Vec::new());
    }
    let limit = limit.min(MAX_SEARCH_ATTRIBUTES);
    if arity > limit {
        warn!(
            relation = %relation.name,
            attributes = arity,
            limit,
            "too many attributes for the join dependency search"
        );
        return Ok(Vec::new());
    }

    let current: &Relation = relation;
    let found = find_join_decomposition(&current.data, arity, |components| {
        preserves_dependencies(current, components) && !implied_by_keys(current, components)
    });
    let Some(mut components) = found else {
        debug!(
            relation = %relation.name,
            rows = relation.data.len(),
            "no join dependency beyond the keys"
        );
        return Ok(Vec::new());
    };

    let key_columns = relation
        .primary_key
        .iter()
        .map(|name| relation.column_index(name))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| {
            NormalizeError::invariant(stage, relation, "primary key attribute missing")
        })?;
    if let Some(position) = components
        .iter()
        .position(|component| key_columns.iter().all(|column| component.contains(column)))
    {
        let keep = components.remove(position);
        components.insert(0, keep);
    }

    let all_names = relation.attribute_names();
    let component_names: Vec<Vec<String>> = components
        .iter()
        .map(|component| component.iter().map(|&column| all_names[column].clone()).collect())
        .collect();

    let mut created = Vec::new();
    for names in &component_names[1..] {
        let child_set: BTreeSet<String> = names.iter().cloned().collect();
        let key = if relation.primary_key.iter().all(|name| child_set.contains(name)) {
            relation.primary_key.clone()
        } else {
            names.clone()
        };
        let attributes = relation
            .typed_attributes(names)
            .map_err(|error| NormalizeError::invariant(stage, relation, error.to_string()))?;
        let mut child = Relation::new(derived_name(&[names]), attributes, key.clone());
        child.data = relation.project_data(names);
        child.fds = relation
            .fds
            .iter()
            .filter(|fd| fd.references_only(&child_set))
            .cloned()
            .collect();
        child.candidate_keys = contained_keys(relation, &child_set, &key);
        created.push(child);
    }

    let kept: BTreeSet<String> = component_names[0].iter().cloned().collect();
    let removed: BTreeSet<String> = all_names
        .iter()
        .filter(|name| !kept.contains(*name))
        .cloned()
        .collect();
    let mut detached = BTreeSet::new();
    for (index, fd) in relation.fds.iter_mut().enumerate() {
        if fd.determinant_intersects(&removed) {
            detached.insert(index);
            continue;
        }
        strip_dependents(fd, &removed);
        if !fd.has_dependents() {
            detached.insert(index);
        }
    }
    relation.detach_dependencies(&detached);
    for name in &removed {
        relation.remove_attribute(name);
    }
    let remaining = relation.attribute_names();
    rekey(relation, &removed, &remaining);
    relation.prune_candidate_keys();

    debug!(
        relation = %relation.name,
        components = component_names.len(),
        "applied join dependency"
    );
    Ok(created)
}

/// Search the candidate decompositions of a relation of `arity` columns.
///
/// Only decompositions passing `accept` are returned.
fn find_join_decomposition<F>(rows: &[Tuple], arity: usize, accept: F) -> Option<Vec<Vec<usize>>>
where
    F: Fn(&[Vec<usize>]) -> bool,
{
    let full: u32 = (1u32 << arity) - 1;

    let mut pairs: Vec<(u32, u32)> = Vec::new();
    for left in 1..full {
        let rest = full & !left;
        if rest == 0 {
            continue;
        }
        let mut shared = (left - 1) & left;
        while shared > 0 {
            let right = rest | shared;
            if left < right {
                pairs.push((left, right));
            }
            shared = (shared - 1) & left;
        }
    }
    pairs.sort_by_key(|(left, right)| (left & right).count_ones());
    for (left, right) in pairs {
        let components = vec![columns(left, arity), columns(right, arity)];
        if accept(&components[..]) && is_lossless(rows, arity, &components) {
            return Some(components);
        }
    }

    for size in 2..arity {
        let mut components: Vec<Vec<usize>> = (1..full)
            .filter(|mask| mask.count_ones() as usize == size)
            .map(|mask| columns(mask, arity))
            .collect();
        if !is_lossless(rows, arity, &components) {
            continue;
        }
        let mut index = 0;
        while index < components.len() && components.len() > 2 {
            let mut candidate = components.clone();
            candidate.remove(index);
            if covers(&candidate, arity) && is_lossless(rows, arity, &candidate) {
                components = candidate;
            } else {
                index += 1;
            }
        }
        if accept(&components[..]) {
            return Some(components);
        }
    }
    None
}

/// True when every dependency fits inside one of `components`.
fn preserves_dependencies(relation: &Relation, components: &[Vec<usize>]) -> bool {
    let names = relation.attribute_names();
    let sets: Vec<BTreeSet<String>> = components
        .iter()
        .map(|component| component.iter().map(|&column| names[column].clone()).collect())
        .collect();
    relation
        .fds
        .iter()
        .all(|fd| sets.iter().any(|set| fd.references_only(set)))
}

/// True when the join dependency over `components` follows from the keys.
fn implied_by_keys(relation: &Relation, components: &[Vec<usize>]) -> bool {
    let names = relation.attribute_names();
    let unused = BTreeSet::new();
    let mut merged: Vec<BTreeSet<usize>> = components
        .iter()
        .map(|component| component.iter().copied().collect())
        .collect();
    loop {
        if merged.iter().any(|component| component.len() == names.len()) {
            return true;
        }
        let mut joinable = None;
        'search: for left in 0..merged.len() {
            for right in left + 1..merged.len() {
                let shared: Vec<String> = merged[left]
                    .intersection(&merged[right])
                    .map(|&column| names[column].clone())
                    .collect();
                if !shared.is_empty() && is_superkey(relation, &shared, &unused) {
                    joinable = Some((left, right));
                    break 'search;
                }
            }
        }
        let Some((left, right)) = joinable else {
            return false;
        };
        let absorbed = merged.remove(right);
        merged[left].extend(absorbed);
    }
}

fn columns(mask: u32, arity: usize) -> Vec<usize> {
    (0..arity).filter(|&column| (mask & (1u32 << column)) != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::{Attribute, FunctionalDependency};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn supply() -> Relation {
        Relation::new(
            "Supply",
            vec![
                Attribute::new("Supplier", "VARCHAR"),
                Attribute::new("Part", "VARCHAR"),
                Attribute::new("Project", "VARCHAR"),
            ],
            names(&["Supplier", "Part", "Project"]),
        )
        .with_data(vec![
            names(&["s1", "p1", "j2"]),
            names(&["s1", "p2", "j1"]),
            names(&["s2", "p1", "j1"]),
            names(&["s1", "p1", "j1"]),
        ])
    }

    #[test]
    fn cyclic_data_splits_three_ways() {
        let mut relation = supply();
        let created = to_5nf(&mut relation).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(relation.attribute_names(), names(&["Supplier", "Part"]));
        assert_eq!(relation.primary_key, names(&["Supplier", "Part"]));
        let mut sets: Vec<Vec<String>> = created.iter().map(Relation::attribute_names).collect();
        sets.sort();
        assert_eq!(
            sets,
            vec![names(&["Part", "Project"]), names(&["Supplier", "Project"])]
        );
    }

    #[test]
    fn data_without_join_dependency_is_unchanged() {
        let mut relation = supply().with_data(vec![
            names(&["s1", "p1", "j1"]),
            names(&["s1", "p2", "j2"]),
            names(&["s2", "p1", "j2"]),
        ]);
        let before = relation.clone();
        assert!(to_5nf(&mut relation).unwrap().is_empty());
        assert_eq!(relation, before);
    }

    #[test]
    fn functional_dependency_in_data_gives_two_way_split() {
        let mut relation = Relation::new(
            "Orders",
            vec![
                Attribute::new("OrderID", "INT"),
                Attribute::new("CustID", "INT"),
                Attribute::new("CustName", "VARCHAR"),
            ],
            names(&["OrderID"]),
        )
        .with_dependencies(vec![
            FunctionalDependency::new(names(&["OrderID"]), names(&["CustID"])).unwrap(),
        ])
        .with_data(vec![
            names(&["1", "10", "alice"]),
            names(&["2", "10", "alice"]),
            names(&["3", "20", "bob"]),
        ]);
        let created = to_5nf(&mut relation).unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(relation.primary_key, names(&["OrderID"]));
        assert!(relation.has_attribute("OrderID"));
        assert_eq!(relation.attributes.len() + created[0].attributes.len(), 4);
    }

    #[test]
    fn key_determined_relation_stays_whole() {
        let mut relation = Relation::new(
            "Orders",
            vec![
                Attribute::new("OrderID", "INT"),
                Attribute::new("CustID", "INT"),
                Attribute::new("Product", "VARCHAR"),
            ],
            names(&["OrderID"]),
        )
        .with_dependencies(vec![
            FunctionalDependency::new(names(&["OrderID"]), names(&["CustID", "Product"])).unwrap(),
        ])
        .with_data(vec![
            names(&["1", "10", "pen"]),
            names(&["2", "10", "ink"]),
            names(&["3", "20", "pen"]),
        ]);
        let before = relation.clone();

        assert!(to_5nf(&mut relation).unwrap().is_empty());
        assert_eq!(relation, before);
    }

    #[test]
    fn candidate_key_implies_the_split_too() {
        let mut relation = Relation::new(
            "Badge",
            vec![
                Attribute::new("BadgeID", "INT"),
                Attribute::new("Email", "VARCHAR"),
                Attribute::new("Room", "VARCHAR"),
            ],
            names(&["BadgeID", "Room"]),
        )
        .with_candidate_keys(vec![names(&["Email"])]);
        let components = vec![vec![0, 1], vec![1, 2]];
        assert!(implied_by_keys(&relation, &components));
        assert!(!implied_by_keys(&relation, &[vec![0, 1], vec![0, 2]]));
        relation.candidate_keys.clear();
        assert!(!implied_by_keys(&relation, &components));
    }

    #[test]
    fn decomposition_losing_a_dependency_is_not_applied() {
        let mut relation = Relation::new(
            "R",
            vec![
                Attribute::new("A", "INT"),
                Attribute::new("B", "VARCHAR"),
                Attribute::new("C", "VARCHAR"),
            ],
            names(&["A", "B", "C"]),
        )
        .with_dependencies(vec![
            FunctionalDependency::new(names(&["A", "C"]), names(&["B"])).unwrap(),
        ])
        .with_data(vec![names(&["1", "x", "p"]), names(&["2", "y", "q"])]);
        let before = relation.clone();

        assert!(to_5nf(&mut relation).unwrap().is_empty());
        assert_eq!(relation, before);
    }

    #[test]
    fn small_or_empty_relations_are_skipped() {
        let mut relation = supply();
        relation.data.clear();
        assert!(to_5nf(&mut relation).unwrap().is_empty());

        let mut narrow = Relation::new(
            "Pair",
            vec![Attribute::new("A", "INT"), Attribute::new("B", "INT")],
            names(&["A"]),
        )
        .with_data(vec![names(&["1", "2"])]);
        assert!(to_5nf(&mut narrow).unwrap().is_empty());
    }

    #[test]
    fn search_limit_is_respected() {
        let mut relation = supply();
        assert!(to_5nf_with_limit(&mut relation, 2).unwrap().is_empty());
        assert_eq!(relation.attributes.len(), 3);
    }
}
