//! Serializer for the schema text format.
//!
//! Output reparses with [`parse_schema`](crate::parse_schema): empty key and
//! attribute lists render as `None`, a relation without dependencies renders
//! `Functional Dependencies: N/A`, and the `Data:` section only appears when
//! the relation carries sample tuples.

use std::path::Path;

use relnorm_model::{Relation, braced};
use tracing::info;

use crate::error::{IngestError, Result};

/// Render one relation block, ending with a newline.
pub fn render_relation(relation: &Relation) -> String {
    let mut out = String::new();
    let attributes: Vec<String> = relation.attributes.iter().map(ToString::to_string).collect();
    let candidate_keys = if relation.candidate_keys.is_empty() {
        "None".to_string()
    } else {
        relation
            .candidate_keys
            .iter()
            .map(|key| braced(key))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let multivalued = if relation.multivalued_attributes.is_empty() {
        "None".to_string()
    } else {
        relation.multivalued_attributes.join(", ")
    };

    out.push_str(&format!("Relation: {}\n", relation.name));
    out.push_str(&format!("Attributes: {}\n", attributes.join(", ")));
    out.push_str(&format!("Primary Key: {}\n", braced(&relation.primary_key)));
    out.push_str(&format!("Candidate Keys: {candidate_keys}\n"));
    out.push_str(&format!("Multi-Valued Attributes: {multivalued}\n"));
    if relation.fds.is_empty() {
        out.push_str("Functional Dependencies: N/A\n");
    } else {
        out.push_str("Functional Dependencies:\n");
        for fd in &relation.fds {
            out.push_str(&format!("{fd}\n"));
        }
    }
    if !relation.data.is_empty() {
        out.push_str("Data:\n");
        for row in &relation.data {
            out.push_str(&row.join(", "));
            out.push('\n');
        }
    }
    out
}

/// Render every relation, blocks separated by a blank line.
pub fn render_schema(relations: &[Relation]) -> String {
    relations
        .iter()
        .map(render_relation)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the rendered schema to `path`.
pub fn write_schema(path: &Path, relations: &[Relation]) -> Result<()> {
    std::fs::write(path, render_schema(relations)).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), relations = relations.len(), "wrote schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::{Attribute, FunctionalDependency};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn renders_relation_without_dependencies() {
        let relation = Relation::new(
            "TagsData",
            vec![Attribute::new("ItemID", "INT"), Attribute::new("Tags", "VARCHAR")],
            names(&["ItemID", "Tags"]),
        );
        insta::assert_snapshot!(render_relation(&relation), @r"
        Relation: TagsData
        Attributes: ItemID:INT, Tags:VARCHAR
        Primary Key: {ItemID, Tags}
        Candidate Keys: None
        Multi-Valued Attributes: None
        Functional Dependencies: N/A
        ");
    }

    #[test]
    fn renders_keys_dependencies_and_data() {
        let relation = Relation::new(
            "Student",
            vec![
                Attribute::new("StudentID", "INT"),
                Attribute::new("Email", "VARCHAR"),
                Attribute::new("Phone", "VARCHAR"),
            ],
            names(&["StudentID"]),
        )
        .with_candidate_keys(vec![names(&["Email"])])
        .with_multivalued_attributes(names(&["Phone"]))
        .with_dependencies(vec![
            FunctionalDependency::new(names(&["StudentID"]), names(&["Email"])).unwrap(),
            FunctionalDependency::with_alternatives(
                names(&["StudentID"]),
                vec![names(&["Email"]), names(&["Phone"])],
            )
            .unwrap(),
        ])
        .with_data(vec![names(&["1", "ada@x", "555"])]);
        insta::assert_snapshot!(render_relation(&relation), @r"
        Relation: Student
        Attributes: StudentID:INT, Email:VARCHAR, Phone:VARCHAR
        Primary Key: {StudentID}
        Candidate Keys: {Email}
        Multi-Valued Attributes: Phone
        Functional Dependencies:
        {StudentID} -> {Email}
        {StudentID} ->> {Email} | {Phone}
        Data:
        1, ada@x, 555
        ");
    }

    #[test]
    fn blocks_are_separated_by_a_blank_line() {
        let relation = Relation::new("R", vec![Attribute::new("A", "INT")], names(&["A"]));
        let rendered = render_schema(&[relation.clone(), relation]);
        assert_eq!(rendered.matches("\n\nRelation: R").count(), 1);
    }
}
