//! Functional and multivalued dependencies.
//!
//! A dependency with a single dependent set is an ordinary functional
//! dependency (`{a} -> {b, c}`). A dependency with several alternative
//! dependent sets is a multivalued dependency (`{a} ->> {b} | {c}`), whose
//! sets are independent projections of the non-determinant attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SchemaError};

/// A `determinant -> dependents` rule attached to a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub determinant: Vec<String>,
    pub dependents: Vec<Vec<String>>,
}

impl FunctionalDependency {
    /// Build a single-valued dependency `determinant -> dependents`.
    pub fn new(determinant: Vec<String>, dependents: Vec<String>) -> Result<Self> {
        Self::with_alternatives(determinant, vec![dependents])
    }

    /// Build a dependency from one or more alternative dependent sets.
    ///
    /// More than one set makes the dependency multivalued.
    pub fn with_alternatives(
        determinant: Vec<String>,
        dependents: Vec<Vec<String>>,
    ) -> Result<Self> {
        if determinant.is_empty() {
            return Err(SchemaError::EmptyDeterminant);
        }
        let dependency = Self {
            determinant,
            dependents,
        };
        if dependency.dependents.is_empty() || dependency.dependents.iter().any(Vec::is_empty) {
            return Err(SchemaError::EmptyDependents {
                determinant: braced(&dependency.determinant),
            });
        }
        Ok(dependency)
    }

    /// True when `attr` occurs in any dependent set.
    pub fn is_dependent(&self, attr: &str) -> bool {
        self.dependents
            .iter()
            .any(|set| set.iter().any(|name| name == attr))
    }

    /// Remove `attr` from every dependent set, dropping sets left empty.
    ///
    /// Returns true when anything was removed.
    pub fn remove_dependent(&mut self, attr: &str) -> bool {
        let mut removed = false;
        for set in &mut self.dependents {
            let before = set.len();
            set.retain(|name| name != attr);
            removed |= set.len() != before;
        }
        self.dependents.retain(|set| !set.is_empty());
        removed
    }

    /// True when the determinant shares at least one attribute with `attrs`.
    pub fn determinant_intersects<'a, I>(&self, attrs: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        attrs
            .into_iter()
            .any(|attr| self.determinant.contains(attr))
    }

    /// True for dependencies with more than one alternative dependent set.
    pub fn is_multivalued(&self) -> bool {
        self.dependents.len() > 1
    }

    /// True while at least one dependent attribute remains.
    pub fn has_dependents(&self) -> bool {
        self.dependents.iter().any(|set| !set.is_empty())
    }

    /// Dependent attributes across all sets, first occurrence order.
    pub fn dependent_attributes(&self) -> Vec<&String> {
        let mut seen = BTreeSet::new();
        self.dependents
            .iter()
            .flatten()
            .filter(|name| seen.insert(name.as_str()))
            .collect()
    }

    /// Every attribute the dependency mentions, determinant first.
    pub fn attributes(&self) -> impl Iterator<Item = &String> {
        self.determinant.iter().chain(self.dependents.iter().flatten())
    }

    /// True when every attribute the dependency mentions is in `attrs`.
    pub fn references_only(&self, attrs: &BTreeSet<String>) -> bool {
        self.attributes().all(|name| attrs.contains(name))
    }

    /// True when the dependency mentions any attribute in `attrs`.
    pub fn references_any(&self, attrs: &BTreeSet<String>) -> bool {
        self.attributes().any(|name| attrs.contains(name))
    }

    /// Replace the determinant attributes in `replaced` by `replacement`.
    ///
    /// The replacement goes where the first replaced attribute stood.
    /// Dependents that end up in the determinant are dropped.
    pub fn substitute_determinant(&mut self, replaced: &BTreeSet<String>, replacement: &[String]) {
        let mut determinant: Vec<String> = Vec::new();
        for name in &self.determinant {
            let names = if replaced.contains(name) {
                replacement
            } else {
                std::slice::from_ref(name)
            };
            for name in names {
                if !determinant.contains(name) {
                    determinant.push(name.clone());
                }
            }
        }
        for name in &determinant {
            self.remove_dependent(name);
        }
        self.determinant = determinant;
    }

    /// Restrict the dependency to the attributes in `attrs`.
    ///
    /// Returns `None` when the determinant does not fit or no dependent
    /// attribute survives.
    pub fn restricted_to(&self, attrs: &BTreeSet<String>) -> Option<Self> {
        if !self.determinant.iter().all(|name| attrs.contains(name)) {
            return None;
        }
        let dependents: Vec<Vec<String>> = self
            .dependents
            .iter()
            .map(|set| {
                set.iter()
                    .filter(|name| attrs.contains(*name))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|set| !set.is_empty())
            .collect();
        if dependents.is_empty() {
            return None;
        }
        Some(Self {
            determinant: self.determinant.clone(),
            dependents,
        })
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.is_multivalued() { "->>" } else { "->" };
        let dependents: Vec<String> = self.dependents.iter().map(|set| braced(set)).collect();
        write!(
            f,
            "{} {} {}",
            braced(&self.determinant),
            arrow,
            dependents.join(" | ")
        )
    }
}

/// Render an attribute list as `{a, b}`.
pub fn braced(names: &[String]) -> String {
    format!("{{{}}}", names.join(", "))
}

/// Order-independent comparison of two attribute lists.
pub fn same_attribute_set(left: &[String], right: &[String]) -> bool {
    let left: BTreeSet<&String> = left.iter().collect();
    let right: BTreeSet<&String> = right.iter().collect();
    left == right
}
