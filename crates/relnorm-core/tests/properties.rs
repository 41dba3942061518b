//! Property tests for stage invariants.

use std::collections::BTreeSet;

use proptest::prelude::*;
use relnorm_core::{Normalize, dedupe_relations};
use relnorm_model::{Attribute, Relation};

fn relation_with(name: &str, width: usize, multivalued: &[usize]) -> Relation {
    let attributes: Vec<Attribute> = (0..width)
        .map(|index| Attribute::new(format!("A{index}"), "VARCHAR"))
        .collect();
    Relation::new(name, attributes, vec!["A0".to_string()]).with_multivalued_attributes(
        multivalued
            .iter()
            .map(|index| format!("A{index}"))
            .collect(),
    )
}

proptest! {
    #[test]
    fn first_normal_form_extracts_every_multivalued_attribute(
        width in 2usize..8,
        picks in proptest::collection::btree_set(1usize..8, 0..6),
    ) {
        let multivalued: Vec<usize> = picks.into_iter().filter(|index| *index < width).collect();
        let mut relation = relation_with("Wide", width, &multivalued);
        relation.validate().unwrap();

        let created = relation.to_1nf().unwrap();

        prop_assert_eq!(created.len(), multivalued.len());
        prop_assert!(relation.multivalued_attributes.is_empty());
        prop_assert_eq!(relation.attributes.len(), width - multivalued.len());
        for (child, index) in created.iter().zip(&multivalued) {
            let attr = format!("A{index}");
            prop_assert!(!relation.has_attribute(&attr));
            prop_assert_eq!(child.attribute_names(), vec!["A0".to_string(), attr.clone()]);
            prop_assert_eq!(&child.name, &format!("{attr}Data"));
            child.validate().unwrap();
        }
    }

    #[test]
    fn dedupe_leaves_distinct_attribute_sets(
        widths in proptest::collection::vec(1usize..5, 0..12),
    ) {
        let mut relations: Vec<Relation> = widths
            .iter()
            .enumerate()
            .map(|(index, width)| relation_with(&format!("R{index}"), *width, &[]))
            .collect();
        let distinct: BTreeSet<usize> = widths.iter().copied().collect();

        let removed = dedupe_relations(&mut relations);

        prop_assert_eq!(relations.len(), distinct.len());
        prop_assert_eq!(removed, widths.len() - distinct.len());
        prop_assert_eq!(dedupe_relations(&mut relations), 0);
    }
}
