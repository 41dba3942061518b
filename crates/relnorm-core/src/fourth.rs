//! Fourth normal form: one relation per multivalued dependency alternative.

use std::collections::BTreeSet;

use relnorm_model::{NormalForm, Relation};
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::split::{contained_keys, derived_name, ensure_present, rekey, strip_dependents};

/// Decompose every multivalued dependency `{A} ->> {B} | {C}` into relations
/// over `A ∪ B` and `A ∪ C`, each keyed by all of its attributes.
///
/// The dependent-set attributes leave the parent, which keeps the
/// determinant and whatever the dependency did not mention.
pub fn to_4nf(relation: &mut Relation) -> Result<Vec<Relation>> {
    let stage = NormalForm::Fourth;
    let multivalued: Vec<usize> = relation
        .fds
        .iter()
        .enumerate()
        .filter(|(_, fd)| fd.is_multivalued())
        .map(|(index, _)| index)
        .collect();
    let mut created = Vec::new();
    if multivalued.is_empty() {
        return Ok(created);
    }

    let mut detached = BTreeSet::new();
    let mut removed: Vec<String> = Vec::new();
    let mut determinants: Vec<String> = Vec::new();

    for index in multivalued {
        let mvd = relation.fds[index].clone();
        let mentioned: Vec<String> = mvd.attributes().cloned().collect();
        ensure_present(relation, stage, &mentioned)?;

        for set in &mvd.dependents {
            let mut child_names = mvd.determinant.clone();
            for name in set {
                if !child_names.contains(name) {
                    child_names.push(name.clone());
                }
            }
            let attributes = relation
                .typed_attributes(&child_names)
                .map_err(|error| NormalizeError::invariant(stage, relation, error.to_string()))?;
            let child_set: BTreeSet<String> = child_names.iter().cloned().collect();

            let mut child = Relation::new(
                derived_name(&[&mvd.determinant, set]),
                attributes,
                child_names.clone(),
            );
            child.data = relation.project_data(&child_names);
            child.fds = relation
                .fds
                .iter()
                .filter(|fd| !fd.is_multivalued() && fd.references_only(&child_set))
                .cloned()
                .collect();
            child.candidate_keys = contained_keys(relation, &child_set, &child_names);
            debug!(
                relation = %relation.name,
                child = %child,
                dependency = %mvd,
                rows = child.data.len(),
                "split multivalued dependency"
            );
            created.push(child);
        }

        detached.insert(index);
        for name in mvd.dependent_attributes() {
            if !mvd.determinant.contains(name) && !removed.contains(name) {
                removed.push(name.clone());
            }
        }
        for name in &mvd.determinant {
            if !determinants.contains(name) {
                determinants.push(name.clone());
            }
        }
    }

    let removed_set: BTreeSet<String> = removed.iter().cloned().collect();
    for (index, fd) in relation.fds.iter_mut().enumerate() {
        if detached.contains(&index) {
            continue;
        }
        if fd.determinant_intersects(&removed_set) {
            detached.insert(index);
            continue;
        }
        strip_dependents(fd, &removed_set);
        if !fd.has_dependents() {
            detached.insert(index);
        }
    }
    relation.detach_dependencies(&detached);
    for name in &removed {
        relation.remove_attribute(name);
    }
    rekey(relation, &removed_set, &determinants);
    relation.prune_candidate_keys();

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::{Attribute, FunctionalDependency};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn course() -> Relation {
        Relation::new(
            "CourseOffer",
            vec![
                Attribute::new("Course", "VARCHAR"),
                Attribute::new("Teacher", "VARCHAR"),
                Attribute::new("Book", "VARCHAR"),
            ],
            names(&["Course", "Teacher", "Book"]),
        )
        .with_dependencies(vec![
            FunctionalDependency::with_alternatives(
                names(&["Course"]),
                vec![names(&["Teacher"]), names(&["Book"])],
            )
            .unwrap(),
        ])
    }

    #[test]
    fn one_relation_per_alternative() {
        let mut relation = course();
        let created = to_4nf(&mut relation).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].name, "CourseTeacherData");
        assert_eq!(created[0].attribute_names(), names(&["Course", "Teacher"]));
        assert_eq!(created[0].primary_key, names(&["Course", "Teacher"]));
        assert_eq!(created[1].name, "CourseBookData");
        assert_eq!(created[1].primary_key, names(&["Course", "Book"]));

        assert_eq!(relation.attribute_names(), names(&["Course"]));
        assert_eq!(relation.primary_key, names(&["Course"]));
        assert!(relation.fds.is_empty());
    }

    #[test]
    fn sample_rows_are_projected_and_deduplicated() {
        let mut relation = course().with_data(vec![
            names(&["Math", "Smith", "Algebra"]),
            names(&["Math", "Smith", "Calculus"]),
            names(&["Math", "Jones", "Algebra"]),
            names(&["Math", "Jones", "Calculus"]),
        ]);
        let created = to_4nf(&mut relation).unwrap();

        assert_eq!(
            created[0].data,
            vec![names(&["Math", "Smith"]), names(&["Math", "Jones"])]
        );
        assert_eq!(
            created[1].data,
            vec![names(&["Math", "Algebra"]), names(&["Math", "Calculus"])]
        );
        assert_eq!(relation.data, vec![names(&["Math"])]);
    }

    #[test]
    fn relation_without_multivalued_dependencies_is_unchanged() {
        let mut relation = course();
        relation.fds.clear();
        let before = relation.clone();
        assert!(to_4nf(&mut relation).unwrap().is_empty());
        assert_eq!(relation, before);
    }
}
