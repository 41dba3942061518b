//! Second normal form: removal of partial dependencies.

use std::collections::BTreeSet;

use relnorm_model::{NormalForm, Relation};
use tracing::debug;

use crate::error::Result;
use crate::split::{closure, ensure_present, split_off};

/// Split out every dependency whose determinant overlaps the prime attributes
/// without being a key.
///
/// The new relation is keyed by the determinant and receives the non-prime
/// attributes the determinant reaches, directly or through a chain of
/// dependencies. Dependencies that move are detached from the parent in a
/// single pass once every dependency has been examined; passes repeat until
/// nothing moves.
pub fn to_2nf(relation: &mut Relation) -> Result<Vec<Relation>> {
    let mut created = Vec::new();
    loop {
        let children = split_pass(relation)?;
        if children.is_empty() {
            return Ok(created);
        }
        created.extend(children);
    }
}

fn split_pass(relation: &mut Relation) -> Result<Vec<Relation>> {
    let stage = NormalForm::Second;
    let prime = relation.prime_attributes();
    let mut detached = BTreeSet::new();
    let mut created = Vec::new();

    for index in 0..relation.fds.len() {
        if detached.contains(&index) {
            continue;
        }
        let fd = &relation.fds[index];
        if fd.is_multivalued()
            || !fd.determinant_intersects(&prime)
            || relation.is_key(&fd.determinant)
        {
            continue;
        }
        let has_non_prime = fd
            .dependent_attributes()
            .into_iter()
            .any(|name| !prime.contains(name) && relation.has_attribute(name));
        if !has_non_prime {
            continue;
        }

        let determinant = fd.determinant.clone();
        ensure_present(relation, stage, &determinant)?;
        let reached = closure(relation, &determinant, &detached);
        let moving: Vec<String> = relation
            .attribute_names()
            .into_iter()
            .filter(|name| reached.contains(name))
            .filter(|name| !prime.contains(name) && !determinant.contains(name))
            .collect();
        if moving.is_empty() {
            continue;
        }

        let child = split_off(relation, stage, &determinant, &moving, &mut detached)?;
        debug!(
            relation = %relation.name,
            child = %child,
            determinant = ?determinant,
            "split partial dependency"
        );
        created.push(child);
    }

    relation.detach_dependencies(&detached);
    Ok(created)
}
