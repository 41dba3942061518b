use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::dependency::{FunctionalDependency, same_attribute_set};
use crate::error::{Result, SchemaError};

/// One sample row, values aligned with [`Relation::attributes`].
pub type Tuple = Vec<String>;

/// A named, typed column of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Free-form type label taken from the schema (e.g. `INT`, `VARCHAR`).
    pub data_type: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.data_type)
    }
}

/// A relation schema fragment and the dependencies that hold on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub candidate_keys: Vec<Vec<String>>,
    /// Attributes holding repeating values, waiting for 1NF extraction.
    #[serde(default)]
    pub multivalued_attributes: Vec<String>,
    #[serde(default)]
    pub fds: Vec<FunctionalDependency>,
    /// Sample tuples; empty when no data was supplied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Tuple>,
}

impl Relation {
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        primary_key: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            primary_key,
            candidate_keys: Vec::new(),
            multivalued_attributes: Vec::new(),
            fds: Vec::new(),
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_candidate_keys(mut self, keys: Vec<Vec<String>>) -> Self {
        self.candidate_keys = keys;
        self
    }

    #[must_use]
    pub fn with_multivalued_attributes(mut self, attrs: Vec<String>) -> Self {
        self.multivalued_attributes = attrs;
        self
    }

    #[must_use]
    pub fn with_dependencies(mut self, fds: Vec<FunctionalDependency>) -> Self {
        self.fds = fds;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<Tuple>) -> Self {
        self.data = data;
        self
    }

    /// Check every structural rule a loaded relation has to satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if self.attributes.is_empty() {
            return Err(SchemaError::EmptyAttributes {
                relation: self.name.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    relation: self.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }
        if self.primary_key.is_empty() {
            return Err(SchemaError::EmptyPrimaryKey {
                relation: self.name.clone(),
            });
        }
        self.ensure_known(&self.primary_key, "primary key")?;
        for key in &self.candidate_keys {
            self.ensure_known(key, "candidate key")?;
        }
        self.ensure_known(&self.multivalued_attributes, "multivalued attribute list")?;
        if let Some(attribute) = self
            .multivalued_attributes
            .iter()
            .find(|name| self.primary_key.contains(name))
        {
            return Err(SchemaError::MultivaluedKeyAttribute {
                relation: self.name.clone(),
                attribute: attribute.clone(),
            });
        }
        for fd in &self.fds {
            self.ensure_dependency_known(fd)?;
        }
        self.ensure_arity(&self.data)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|attr| attr.name.clone()).collect()
    }

    pub fn attribute_set(&self) -> BTreeSet<String> {
        self.attributes.iter().map(|attr| attr.name.clone()).collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name == name)
    }

    /// Look up the typed attributes for `names`, preserving their order and
    /// skipping repeats.
    pub fn typed_attributes(&self, names: &[String]) -> Result<Vec<Attribute>> {
        let mut seen = BTreeSet::new();
        let mut typed = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let attribute = self
                .attribute(name)
                .ok_or_else(|| SchemaError::UnknownAttribute {
                    relation: self.name.clone(),
                    attribute: name.clone(),
                    context: "decomposition",
                })?;
            typed.push(attribute.clone());
        }
        Ok(typed)
    }

    /// Remove an attribute and its sample column.
    ///
    /// Sample rows that become identical after the removal collapse into one.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let index = self.column_index(name)?;
        let removed = self.attributes.remove(index);
        if !self.data.is_empty() {
            let mut seen = BTreeSet::new();
            let rows = std::mem::take(&mut self.data);
            for mut row in rows {
                if index < row.len() {
                    row.remove(index);
                }
                if seen.insert(row.clone()) {
                    self.data.push(row);
                }
            }
        }
        Some(removed)
    }

    /// Union of the primary key and every candidate key.
    pub fn prime_attributes(&self) -> BTreeSet<String> {
        self.primary_key
            .iter()
            .chain(self.candidate_keys.iter().flatten())
            .cloned()
            .collect()
    }

    /// True when `attrs` is set-equal to the primary key or a candidate key.
    pub fn is_key(&self, attrs: &[String]) -> bool {
        same_attribute_set(attrs, &self.primary_key)
            || self
                .candidate_keys
                .iter()
                .any(|key| same_attribute_set(attrs, key))
    }

    /// Drop candidate keys that reference attributes no longer present.
    ///
    /// Returns the number of keys removed.
    pub fn prune_candidate_keys(&mut self) -> usize {
        let attrs = self.attribute_set();
        let before = self.candidate_keys.len();
        self.candidate_keys
            .retain(|key| key.iter().all(|name| attrs.contains(name)));
        before - self.candidate_keys.len()
    }

    /// Attach a dependency after checking it only mentions known attributes.
    pub fn attach_dependency(&mut self, fd: FunctionalDependency) -> Result<()> {
        self.ensure_dependency_known(&fd)?;
        self.fds.push(fd);
        Ok(())
    }

    /// Remove the dependencies at `indices` in one pass.
    ///
    /// Removal runs by descending index so the remaining positions stay
    /// valid; the removed dependencies are returned in ascending order.
    pub fn detach_dependencies(&mut self, indices: &BTreeSet<usize>) -> Vec<FunctionalDependency> {
        let mut removed = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            if index < self.fds.len() {
                removed.push(self.fds.remove(index));
            }
        }
        removed.reverse();
        removed
    }

    /// Replace the sample tuples after checking their arity.
    pub fn set_data(&mut self, data: Vec<Tuple>) -> Result<()> {
        self.ensure_arity(&data)?;
        self.data = data;
        Ok(())
    }

    /// Project the sample tuples onto `names`, dropping duplicate rows.
    ///
    /// Names that are not attributes of the relation are ignored.
    pub fn project_data(&self, names: &[String]) -> Vec<Tuple> {
        let columns: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        let mut seen = BTreeSet::new();
        let mut projected = Vec::new();
        for row in &self.data {
            let tuple: Tuple = columns
                .iter()
                .map(|&index| row.get(index).cloned().unwrap_or_default())
                .collect();
            if seen.insert(tuple.clone()) {
                projected.push(tuple);
            }
        }
        projected
    }

    fn ensure_known(&self, names: &[String], context: &'static str) -> Result<()> {
        match names.iter().find(|name| !self.has_attribute(name)) {
            Some(missing) => Err(SchemaError::UnknownAttribute {
                relation: self.name.clone(),
                attribute: missing.clone(),
                context,
            }),
            None => Ok(()),
        }
    }

    fn ensure_dependency_known(&self, fd: &FunctionalDependency) -> Result<()> {
        match fd.attributes().find(|name| !self.has_attribute(name)) {
            Some(missing) => Err(SchemaError::UnknownAttribute {
                relation: self.name.clone(),
                attribute: missing.clone(),
                context: "functional dependency",
            }),
            None => Ok(()),
        }
    }

    fn ensure_arity(&self, data: &[Tuple]) -> Result<()> {
        let expected = self.attributes.len();
        match data.iter().position(|row| row.len() != expected) {
            Some(index) => Err(SchemaError::TupleArity {
                relation: self.name.clone(),
                index,
                expected,
                actual: data[index].len(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.attribute_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn orders() -> Relation {
        Relation::new(
            "Orders",
            vec![
                Attribute::new("OrderID", "INT"),
                Attribute::new("CustID", "INT"),
                Attribute::new("Product", "VARCHAR"),
            ],
            names(&["OrderID"]),
        )
    }

    #[test]
    fn validate_rejects_unknown_dependency_attribute() {
        let relation = orders().with_dependencies(vec![
            FunctionalDependency::new(names(&["OrderID"]), names(&["Missing"])).unwrap(),
        ]);
        let error = relation.validate().unwrap_err();
        assert!(matches!(
            error,
            SchemaError::UnknownAttribute { ref attribute, .. } if attribute == "Missing"
        ));
    }

    #[test]
    fn validate_rejects_empty_key_and_attributes() {
        let mut relation = orders();
        relation.primary_key.clear();
        assert!(matches!(
            relation.validate(),
            Err(SchemaError::EmptyPrimaryKey { .. })
        ));
        let empty = Relation::new("Empty", vec![], names(&["a"]));
        assert!(matches!(
            empty.validate(),
            Err(SchemaError::EmptyAttributes { .. })
        ));
    }

    #[test]
    fn removing_attribute_collapses_duplicate_rows() {
        let mut relation = orders().with_data(vec![
            names(&["1", "7", "Widget"]),
            names(&["1", "7", "Gadget"]),
        ]);
        relation.remove_attribute("Product");
        assert_eq!(relation.attribute_names(), names(&["OrderID", "CustID"]));
        assert_eq!(relation.data, vec![names(&["1", "7"])]);
    }

    #[test]
    fn detach_dependencies_by_descending_index() {
        let mut relation = orders().with_dependencies(vec![
            FunctionalDependency::new(names(&["OrderID"]), names(&["CustID"])).unwrap(),
            FunctionalDependency::new(names(&["OrderID"]), names(&["Product"])).unwrap(),
            FunctionalDependency::new(names(&["CustID"]), names(&["Product"])).unwrap(),
        ]);
        let removed = relation.detach_dependencies(&BTreeSet::from([0, 2]));
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].to_string(), "{OrderID} -> {CustID}");
        assert_eq!(relation.fds.len(), 1);
        assert_eq!(relation.fds[0].to_string(), "{OrderID} -> {Product}");
    }

    #[test]
    fn projection_deduplicates() {
        let relation = orders().with_data(vec![
            names(&["1", "7", "Widget"]),
            names(&["2", "7", "Widget"]),
        ]);
        assert_eq!(
            relation.project_data(&names(&["CustID", "Product"])),
            vec![names(&["7", "Widget"])]
        );
    }

    #[test]
    fn set_data_checks_arity() {
        let mut relation = orders();
        let error = relation.set_data(vec![names(&["1", "2"])]).unwrap_err();
        assert_eq!(
            error,
            SchemaError::TupleArity {
                relation: "Orders".to_string(),
                index: 0,
                expected: 3,
                actual: 2,
            }
        );
    }
}
