//! Line-oriented parser for the schema text format.
//!
//! A schema file holds one or more relation blocks separated by blank lines:
//!
//! ```text
//! Relation: Orders
//! Attributes: OrderID:INT, CustID:INT, CustName:VARCHAR
//! Primary Key: {OrderID}
//! Candidate Keys: None
//! Multi-Valued Attributes: None
//! Functional Dependencies:
//! {OrderID} -> {CustID}
//! {CustID} -> {CustName}
//! Data:
//! 1, 10, Alice
//! ```
//!
//! The five header lines are required and appear in that order. The
//! `Functional Dependencies:` and `Data:` sections are optional. Each block is
//! first read into a [`RelationBlock`] and only then turned into a validated
//! [`Relation`].

use std::path::Path;

use relnorm_model::{Attribute, FunctionalDependency, Relation, Tuple};
use tracing::debug;

use crate::error::{IngestError, Result};

const RELATION: &str = "Relation";
const ATTRIBUTES: &str = "Attributes";
const PRIMARY_KEY: &str = "Primary Key";
const CANDIDATE_KEYS: &str = "Candidate Keys";
const MULTIVALUED: &str = "Multi-Valued Attributes";
const DEPENDENCIES: &str = "Functional Dependencies";
const DATA: &str = "Data";

/// Marker for an absent list.
const NONE: &str = "None";
/// Marker for an empty dependency section.
const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

/// One relation block, parsed but not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationBlock {
    /// Line number of the `Relation:` line.
    pub line: usize,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub primary_key: Vec<String>,
    pub candidate_keys: Vec<Vec<String>>,
    pub multivalued_attributes: Vec<String>,
    pub dependencies: Vec<FunctionalDependency>,
    pub data: Vec<Tuple>,
}

impl RelationBlock {
    /// Build the relation and check its structural rules.
    pub fn into_relation(self) -> Result<Relation> {
        let relation = Relation::new(self.name, self.attributes, self.primary_key)
            .with_candidate_keys(self.candidate_keys)
            .with_multivalued_attributes(self.multivalued_attributes)
            .with_dependencies(self.dependencies)
            .with_data(self.data);
        relation.validate()?;
        Ok(relation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Dependencies,
    Data,
}

/// Read and parse a schema file.
pub fn read_schema(path: &Path) -> Result<Vec<Relation>> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let relations = parse_schema(&text)?;
    debug!(path = %path.display(), relations = relations.len(), "read schema");
    Ok(relations)
}

/// Parse schema text into validated relations.
pub fn parse_schema(text: &str) -> Result<Vec<Relation>> {
    let relations = parse_blocks(text)?
        .into_iter()
        .map(RelationBlock::into_relation)
        .collect::<Result<Vec<_>>>()?;
    if relations.is_empty() {
        return Err(IngestError::EmptySchema);
    }
    Ok(relations)
}

/// Parse schema text into unvalidated relation blocks.
pub fn parse_blocks(text: &str) -> Result<Vec<RelationBlock>> {
    split_blocks(text)
        .iter()
        .map(|lines| parse_block(lines))
        .collect()
}

/// Parse a single `{det} -> {dep}` or `{det} ->> {a} | {b}` declaration.
pub fn parse_dependency(text: &str) -> Result<FunctionalDependency> {
    dependency(text).map_err(|message| IngestError::Dependency {
        text: text.trim().to_string(),
        message,
    })
}

/// Group non-blank lines into blocks, keeping 1-based line numbers.
fn split_blocks(text: &str) -> Vec<Vec<Line<'_>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let text = raw.trim_end();
        if text.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(Line {
            number: index + 1,
            text,
        });
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[Line<'_>]) -> Result<RelationBlock> {
    let last = lines.last().map_or(1, |line| line.number);
    let mut rest = lines.iter().copied();

    let (line, name) = field(rest.next(), RELATION, last)?;
    let mut block = RelationBlock {
        line,
        name: name.to_string(),
        ..RelationBlock::default()
    };

    let (line, value) = field(rest.next(), ATTRIBUTES, last)?;
    block.attributes = attributes(value).map_err(|message| syntax(line, message))?;

    let (line, value) = field(rest.next(), PRIMARY_KEY, last)?;
    block.primary_key = attribute_list(value).map_err(|message| syntax(line, message))?;

    let (line, value) = field(rest.next(), CANDIDATE_KEYS, last)?;
    block.candidate_keys = candidate_keys(value).map_err(|message| syntax(line, message))?;

    let (_, value) = field(rest.next(), MULTIVALUED, last)?;
    block.multivalued_attributes = name_list(value);

    let mut section = Section::Header;
    for line in rest {
        if let Some(value) = labelled(line.text, DEPENDENCIES) {
            if !value.is_empty() && value != NOT_APPLICABLE {
                return Err(syntax(
                    line.number,
                    "dependencies go on the lines below the section label",
                ));
            }
            section = Section::Dependencies;
            continue;
        }
        if let Some(value) = labelled(line.text, DATA) {
            if !value.is_empty() {
                return Err(syntax(
                    line.number,
                    "sample rows go on the lines below the section label",
                ));
            }
            section = Section::Data;
            continue;
        }
        match section {
            Section::Header => {
                return Err(syntax(
                    line.number,
                    format!("unexpected line '{}' after the header", line.text.trim()),
                ));
            }
            Section::Dependencies => {
                let fd = dependency(line.text).map_err(|message| syntax(line.number, message))?;
                block.dependencies.push(fd);
            }
            Section::Data => block.data.push(row(line.text)),
        }
    }
    Ok(block)
}

/// Expect `line` to be `label: value` and return the trimmed value.
fn field<'a>(line: Option<Line<'a>>, label: &str, last: usize) -> Result<(usize, &'a str)> {
    let Some(line) = line else {
        return Err(syntax(last, format!("missing '{label}:' line")));
    };
    labelled(line.text, label)
        .map(|value| (line.number, value))
        .ok_or_else(|| syntax(line.number, format!("expected '{label}:' line")))
}

fn labelled<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.trim_start()
        .strip_prefix(label)?
        .strip_prefix(':')
        .map(str::trim)
}

fn syntax(line: usize, message: impl Into<String>) -> IngestError {
    IngestError::Syntax {
        line,
        message: message.into(),
    }
}

/// `a:INT, b:VARCHAR`
fn attributes(value: &str) -> std::result::Result<Vec<Attribute>, String> {
    name_list(value)
        .into_iter()
        .map(|item| match item.split_once(':') {
            Some((name, data_type)) if !name.trim().is_empty() && !data_type.trim().is_empty() => {
                Ok(Attribute::new(name.trim(), data_type.trim()))
            }
            _ => Err(format!("attribute '{item}' must be written as name:TYPE")),
        })
        .collect()
}

/// `{a, b}`
fn attribute_list(value: &str) -> std::result::Result<Vec<String>, String> {
    let inner = value
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| format!("'{}' must be surrounded by braces", value.trim()))?;
    if inner.contains(['{', '}']) {
        return Err(format!("unbalanced braces in '{}'", value.trim()));
    }
    let names = name_list(inner);
    if names.is_empty() {
        return Err("braces hold no attributes".to_string());
    }
    Ok(names)
}

/// `{a}, {b, c}` or `None`
fn candidate_keys(value: &str) -> std::result::Result<Vec<Vec<String>>, String> {
    let value = value.trim();
    if value == NONE {
        return Ok(Vec::new());
    }
    if value.is_empty() {
        return Err(format!("candidate keys are missing (use '{NONE}' if there are none)"));
    }
    let mut keys = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let close = rest
            .find('}')
            .ok_or_else(|| format!("unterminated candidate key in '{value}'"))?;
        keys.push(attribute_list(&rest[..=close])?);
        rest = rest[close + 1..].trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after.trim_start();
            if rest.is_empty() {
                return Err(format!("trailing comma in '{value}'"));
            }
        } else if !rest.is_empty() {
            return Err(format!("candidate keys in '{value}' must be separated by commas"));
        }
    }
    Ok(keys)
}

/// `a, b`, `None` or nothing at all.
fn name_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() || value == NONE {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn dependency(text: &str) -> std::result::Result<FunctionalDependency, String> {
    let text = text.trim();
    let built = if let Some((determinant, dependents)) = text.split_once("->>") {
        let determinant = attribute_list(determinant)?;
        let sets = dependents
            .split('|')
            .map(attribute_list)
            .collect::<std::result::Result<Vec<_>, String>>()?;
        if sets.len() < 2 {
            return Err("a multivalued dependency needs at least two dependent sets".to_string());
        }
        FunctionalDependency::with_alternatives(determinant, sets)
    } else if let Some((determinant, dependents)) = text.split_once("->") {
        FunctionalDependency::new(attribute_list(determinant)?, attribute_list(dependents)?)
    } else {
        return Err("expected '->' or '->>' between determinant and dependents".to_string());
    };
    built.map_err(|error| error.to_string())
}

fn row(text: &str) -> Tuple {
    text.split(',').map(|value| value.trim().to_string()).collect()
}
