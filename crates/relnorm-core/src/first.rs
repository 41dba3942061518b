//! First normal form: extraction of multivalued attributes.

use std::collections::BTreeSet;

use relnorm_model::{FunctionalDependency, NormalForm, Relation};
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::split::contained_keys;

/// Move every pending multivalued attribute into a relation of its own.
///
/// The new relation is keyed by the determinant of a dependency isolating the
/// attribute (`{d} -> {attr}`) when one exists, otherwise by the parent's
/// primary key; the attribute itself always joins the key. A dependency whose
/// determinant includes the attribute moves to the new relation together
/// with every attribute it mentions.
pub fn to_1nf(relation: &mut Relation) -> Result<Vec<Relation>> {
    let stage = NormalForm::First;
    let pending = std::mem::take(&mut relation.multivalued_attributes);
    let mut created = Vec::new();

    for attr in &pending {
        let attr = attr.clone();
        if !relation.has_attribute(&attr) {
            debug!(
                relation = %relation.name,
                attribute = %attr,
                "multivalued attribute already extracted"
            );
            continue;
        }

        let isolating = relation.fds.iter().position(|fd| {
            fd.dependents.len() == 1 && fd.dependents[0].len() == 1 && fd.dependents[0][0] == attr
        });
        let (key, trigger) = match isolating {
            Some(index) => {
                let fd = relation.fds.remove(index);
                let mut key = fd.determinant.clone();
                if !key.contains(&attr) {
                    key.push(attr.clone());
                }
                (key, Some(fd))
            }
            None => {
                let mut key = relation.primary_key.clone();
                key.push(attr.clone());
                (key, None)
            }
        };

        let mut child_names = key.clone();
        for fd in relation.fds.iter().filter(|fd| fd.determinant.contains(&attr)) {
            for name in fd.attributes() {
                if !child_names.contains(name) {
                    child_names.push(name.clone());
                }
            }
        }

        let attributes = relation
            .typed_attributes(&child_names)
            .map_err(|error| NormalizeError::invariant(stage, relation, error.to_string()))?;
        let child_set: BTreeSet<String> = child_names.iter().cloned().collect();
        let key_set: BTreeSet<String> = relation.primary_key.iter().cloned().collect();

        let mut child = Relation::new(format!("{attr}Data"), attributes, key.clone());
        child.data = relation.project_data(&child_names);
        child.multivalued_attributes = child_names
            .iter()
            .filter(|name| **name != attr && !key.contains(*name) && pending.contains(*name))
            .cloned()
            .collect();
        if let Some(fd) = &trigger {
            child.fds.push(fd.clone());
        }

        for fd in &relation.fds {
            let carried = fd.references_only(&key_set) && fd.references_only(&child_set);
            if carried && !child.fds.contains(fd) {
                child.fds.push(fd.clone());
            }
        }

        if trigger.is_none() {
            for fd in &relation.fds {
                if !fd.is_dependent(&attr)
                    || !fd.determinant.iter().all(|name| child_set.contains(name))
                {
                    continue;
                }
                let rewritten = FunctionalDependency {
                    determinant: fd.determinant.clone(),
                    dependents: vec![vec![attr.clone()]],
                };
                if !child.fds.contains(&rewritten) {
                    child.fds.push(rewritten);
                }
            }
        }

        let mut emptied = BTreeSet::new();
        for (index, fd) in relation.fds.iter_mut().enumerate() {
            if fd.determinant.contains(&attr) {
                if !child.fds.contains(fd) {
                    child.fds.push(fd.clone());
                }
                emptied.insert(index);
                continue;
            }
            fd.remove_dependent(&attr);
            if !fd.has_dependents() {
                emptied.insert(index);
            }
        }
        relation.detach_dependencies(&emptied);
        relation.remove_attribute(&attr);

        child.candidate_keys = contained_keys(relation, &child_set, &key);
        relation.prune_candidate_keys();

        debug!(
            relation = %relation.name,
            child = %child,
            key = ?child.primary_key,
            isolated = trigger.is_some(),
            "extracted multivalued attribute"
        );
        created.push(child);
    }

    Ok(created)
}
