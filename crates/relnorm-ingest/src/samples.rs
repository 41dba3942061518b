//! Sample tuples loaded from CSV.
//!
//! The header row names the relation's attributes in any order; columns the
//! relation does not have are ignored. Rows are reordered to match the
//! attribute order and values are trimmed.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use relnorm_model::{Relation, Tuple};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Read sample tuples for `relation` from a CSV file.
pub fn read_samples(path: &Path, relation: &Relation) -> Result<Vec<Tuple>> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    samples_from_reader(reader, path, relation)
}

fn samples_from_reader<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
    relation: &Relation,
) -> Result<Vec<Tuple>> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let mut columns = Vec::with_capacity(relation.attributes.len());
    for attribute in &relation.attributes {
        let column = headers
            .iter()
            .position(|header| *header == attribute.name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: attribute.name.clone(),
                path: path.to_path_buf(),
            })?;
        columns.push(column);
    }
    for header in &headers {
        if !relation.has_attribute(header) {
            warn!(
                path = %path.display(),
                column = %header,
                "ignoring column without a matching attribute"
            );
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Tuple = columns
            .iter()
            .map(|&column| record.get(column).unwrap_or("").trim().to_string())
            .collect();
        rows.push(row);
    }
    debug!(
        path = %path.display(),
        relation = %relation.name,
        rows = rows.len(),
        "read sample tuples"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::Attribute;

    fn supply() -> Relation {
        Relation::new(
            "Supply",
            vec![
                Attribute::new("Supplier", "VARCHAR"),
                Attribute::new("Part", "VARCHAR"),
                Attribute::new("Project", "VARCHAR"),
            ],
            vec!["Supplier".to_string()],
        )
    }

    fn from_text(text: &str, relation: &Relation) -> Result<Vec<Tuple>> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        samples_from_reader(reader, Path::new("inline.csv"), relation)
    }

    #[test]
    fn columns_are_reordered_to_attribute_order() {
        let rows = from_text("Project,Supplier,Part,Note\nj1, s1 ,p1,x\n", &supply()).unwrap();
        assert_eq!(rows, vec![vec!["s1".to_string(), "p1".to_string(), "j1".to_string()]]);
    }

    #[test]
    fn missing_attribute_column_is_an_error() {
        let error = from_text("Supplier,Part\ns1,p1\n", &supply()).unwrap_err();
        assert!(matches!(error, IngestError::MissingColumn { column, .. } if column == "Project"));
    }
}
