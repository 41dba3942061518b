//! Third and Boyce-Codd normal forms.
//!
//! Both stages split off dependencies whose determinant is not a superkey.
//! 3NF only acts on dependencies that reach an attribute outside the primary
//! key (transitive dependencies) and never moves key attributes. BCNF treats
//! every such determinant as a violation, may move key attributes, and
//! rewrites the parent's key when it does.
//!
//! A determinant is a superkey when its closure under the relation's
//! single-valued dependencies contains the primary key, a candidate key, or
//! every attribute. A stage repeats until a pass splits nothing, so
//! dependencies rewritten by an earlier split are examined again.

use std::collections::BTreeSet;

use relnorm_model::{NormalForm, Relation};
use tracing::debug;

use crate::error::Result;
use crate::split::{closure, ensure_present, is_superkey, rekey, split_off};

/// Split out transitive dependencies.
pub fn to_3nf(relation: &mut Relation) -> Result<Vec<Relation>> {
    split_non_key_determinants(relation, NormalForm::Third)
}

/// Split out every dependency whose determinant is not a superkey.
pub fn to_bcnf(relation: &mut Relation) -> Result<Vec<Relation>> {
    split_non_key_determinants(relation, NormalForm::BoyceCodd)
}

fn split_non_key_determinants(relation: &mut Relation, stage: NormalForm) -> Result<Vec<Relation>> {
    let mut created = Vec::new();
    loop {
        let children = split_pass(relation, stage)?;
        if children.is_empty() {
            return Ok(created);
        }
        created.extend(children);
    }
}

fn split_pass(relation: &mut Relation, stage: NormalForm) -> Result<Vec<Relation>> {
    let moves_key = stage == NormalForm::BoyceCodd;
    let mut detached = BTreeSet::new();
    let mut created = Vec::new();

    for index in 0..relation.fds.len() {
        if detached.contains(&index) {
            continue;
        }
        let fd = &relation.fds[index];
        if fd.is_multivalued() || is_superkey(relation, &fd.determinant, &detached) {
            continue;
        }
        if !moves_key
            && !fd
                .dependent_attributes()
                .into_iter()
                .any(|name| !relation.primary_key.contains(name))
        {
            continue;
        }

        let determinant = fd.determinant.clone();
        ensure_present(relation, stage, &determinant)?;
        let reached = closure(relation, &determinant, &detached);
        let moving: Vec<String> = relation
            .attribute_names()
            .into_iter()
            .filter(|name| reached.contains(name) && !determinant.contains(name))
            .filter(|name| moves_key || !relation.primary_key.contains(name))
            .collect();
        if moving.is_empty() {
            continue;
        }

        let child = split_off(relation, stage, &determinant, &moving, &mut detached)?;
        if moves_key {
            let moved: BTreeSet<String> = moving.iter().cloned().collect();
            rekey(relation, &moved, &determinant);
        }
        debug!(
            stage = %stage,
            relation = %relation.name,
            child = %child,
            determinant = ?determinant,
            "split non-key determinant"
        );
        created.push(child);
    }

    relation.detach_dependencies(&detached);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::{Attribute, FunctionalDependency};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn fd(determinant: &[&str], dependents: &[&str]) -> FunctionalDependency {
        FunctionalDependency::new(names(determinant), names(dependents)).unwrap()
    }

    fn relation(attrs: &[&str], key: &[&str], fds: Vec<FunctionalDependency>) -> Relation {
        Relation::new(
            "R",
            attrs.iter().map(|name| Attribute::new(*name, "INT")).collect(),
            names(key),
        )
        .with_dependencies(fds)
    }

    #[test]
    fn moves_transitive_dependency() {
        let mut orders = Relation::new(
            "Orders",
            vec![
                Attribute::new("OrderID", "INT"),
                Attribute::new("CustID", "INT"),
                Attribute::new("CustName", "VARCHAR"),
                Attribute::new("Product", "VARCHAR"),
            ],
            names(&["OrderID"]),
        )
        .with_dependencies(vec![
            fd(&["OrderID"], &["CustID"]),
            fd(&["CustID"], &["CustName"]),
        ]);
        let created = to_3nf(&mut orders).unwrap();

        assert_eq!(created.len(), 1);
        let child = &created[0];
        assert_eq!(child.name, "CustIDData");
        assert_eq!(child.attribute_names(), names(&["CustID", "CustName"]));
        assert_eq!(child.primary_key, names(&["CustID"]));
        assert_eq!(child.fds, vec![fd(&["CustID"], &["CustName"])]);
        assert_eq!(orders.attribute_names(), names(&["OrderID", "CustID", "Product"]));
        assert_eq!(orders.fds, vec![fd(&["OrderID"], &["CustID"])]);
    }

    #[test]
    fn third_normal_form_keeps_key_dependents() {
        let mut r = relation(&["A", "B", "C"], &["A", "B"], vec![fd(&["C"], &["B"])]);
        assert!(to_3nf(&mut r).unwrap().is_empty());
        assert_eq!(r.attributes.len(), 3);
    }

    #[test]
    fn bcnf_moves_key_attribute_and_rekeys() {
        let mut r = relation(
            &["Student", "Course", "Teacher"],
            &["Student", "Course"],
            vec![fd(&["Teacher"], &["Course"])],
        );
        let created = to_bcnf(&mut r).unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].attribute_names(), names(&["Teacher", "Course"]));
        assert_eq!(created[0].primary_key, names(&["Teacher"]));
        assert_eq!(r.attribute_names(), names(&["Student", "Teacher"]));
        assert_eq!(r.primary_key, names(&["Student", "Teacher"]));
        assert!(r.fds.is_empty());
    }

    #[test]
    fn determinant_covering_relation_is_left_alone() {
        let mut r = relation(&["A", "B"], &["A"], vec![fd(&["B"], &["A"])]);
        assert!(to_bcnf(&mut r).unwrap().is_empty());
        assert_eq!(r.fds.len(), 1);
    }

    #[test]
    fn superkey_determinant_is_left_alone_at_any_width() {
        let mut narrow = relation(&["A", "B", "C"], &["A"], vec![fd(&["A", "B"], &["C"])]);
        assert!(to_3nf(&mut narrow).unwrap().is_empty());
        assert!(to_bcnf(&mut narrow).unwrap().is_empty());

        let mut wide = relation(&["A", "B", "C", "D"], &["A"], vec![fd(&["A", "B"], &["C"])]);
        assert!(to_3nf(&mut wide).unwrap().is_empty());
        assert!(to_bcnf(&mut wide).unwrap().is_empty());
        assert_eq!(wide.attributes.len(), 4);
    }

    #[test]
    fn candidate_key_determinant_is_a_superkey() {
        let mut r = relation(&["A", "B", "C"], &["A"], vec![fd(&["B"], &["C"])])
            .with_candidate_keys(vec![names(&["B"])]);
        assert!(to_bcnf(&mut r).unwrap().is_empty());
        assert_eq!(r.fds.len(), 1);
    }

    #[test]
    fn dependency_on_moved_determinant_is_rewritten_and_split() {
        let mut r = relation(
            &["A", "B", "C", "D", "E"],
            &["A"],
            vec![
                fd(&["A"], &["B", "D"]),
                fd(&["B"], &["C"]),
                fd(&["C", "D"], &["E"]),
            ],
        );
        let created = to_3nf(&mut r).unwrap();

        assert_eq!(r.attribute_names(), names(&["A", "B", "D"]));
        assert_eq!(r.fds, vec![fd(&["A"], &["B", "D"])]);
        let children: Vec<(String, Vec<String>)> = created
            .iter()
            .map(|child| (child.name.clone(), child.attribute_names()))
            .collect();
        assert_eq!(
            children,
            vec![
                ("BData".to_string(), names(&["B", "C"])),
                ("BDData".to_string(), names(&["B", "D", "E"])),
            ]
        );
        assert_eq!(created[0].fds, vec![fd(&["B"], &["C"])]);
        assert_eq!(created[1].fds, vec![fd(&["B", "D"], &["E"])]);
    }

    #[test]
    fn multivalued_dependencies_are_deferred() {
        let mvd = FunctionalDependency::with_alternatives(
            names(&["A"]),
            vec![names(&["B"]), names(&["C"])],
        )
        .unwrap();
        let mut r = relation(&["A", "B", "C"], &["A", "B", "C"], vec![mvd]);
        assert!(to_3nf(&mut r).unwrap().is_empty());
        assert!(to_bcnf(&mut r).unwrap().is_empty());
    }
}
