use std::collections::BTreeSet;

use relnorm_model::Relation;
use tracing::debug;

/// Drop relations whose attribute-name set repeats an earlier relation's.
///
/// The first occurrence wins. Returns the number of relations removed.
pub fn dedupe_relations(relations: &mut Vec<Relation>) -> usize {
    let before = relations.len();
    let mut seen: BTreeSet<BTreeSet<String>> = BTreeSet::new();
    relations.retain(|relation| {
        let keep = seen.insert(relation.attribute_set());
        if !keep {
            debug!(relation = %relation, "dropping duplicate relation");
        }
        keep
    });
    before - relations.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::Attribute;

    fn relation(name: &str, attrs: &[&str]) -> Relation {
        Relation::new(
            name,
            attrs.iter().map(|attr| Attribute::new(*attr, "INT")).collect(),
            vec![attrs[0].to_string()],
        )
    }

    #[test]
    fn keeps_first_of_identical_attribute_sets() {
        let mut relations = vec![
            relation("First", &["A", "B"]),
            relation("Other", &["A", "C"]),
            relation("Second", &["B", "A"]),
        ];
        assert_eq!(dedupe_relations(&mut relations), 1);
        let names: Vec<&str> = relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Other"]);
    }
}
