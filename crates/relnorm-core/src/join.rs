//! Natural joins over projections of sample tuples.
//!
//! Columns are identified by their position in the original relation, so a
//! decomposition is a list of column-index sets.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use relnorm_model::Tuple;
use tracing::debug;

/// Intermediate join results larger than this abort the check.
pub(crate) const MAX_JOIN_ROWS: usize = 1_000_000;

struct Joined {
    columns: Vec<usize>,
    rows: BTreeSet<Tuple>,
}

/// Project `rows` onto `columns`, dropping duplicates.
pub(crate) fn project(rows: &[Tuple], columns: &[usize]) -> BTreeSet<Tuple> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|&column| row.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// True when the components cover every column of a relation of `arity`.
pub(crate) fn covers(components: &[Vec<usize>], arity: usize) -> bool {
    let covered: BTreeSet<usize> = components.iter().flatten().copied().collect();
    (0..arity).all(|column| covered.contains(&column))
}

/// True when joining the projections of `rows` onto `components` on their
/// shared columns reproduces exactly the distinct rows.
pub(crate) fn is_lossless(rows: &[Tuple], arity: usize, components: &[Vec<usize>]) -> bool {
    if components.is_empty() || !covers(components, arity) {
        return false;
    }
    let original: BTreeSet<Tuple> = rows.iter().cloned().collect();

    let mut remaining: Vec<&Vec<usize>> = components.iter().collect();
    let first = remaining.remove(0);
    let mut joined = Joined {
        columns: first.clone(),
        rows: project(rows, first),
    };
    while !remaining.is_empty() {
        // Join the most connected component next to keep intermediates small.
        let pick = remaining
            .iter()
            .enumerate()
            .max_by_key(|(index, component)| {
                let shared = component
                    .iter()
                    .filter(|column| joined.columns.contains(column))
                    .count();
                (shared, Reverse(*index))
            })
            .map_or(0, |(index, _)| index);
        let component = remaining.remove(pick);
        let Some(next) = join(&joined, component, &project(rows, component)) else {
            debug!(components = components.len(), "join grew past the row limit");
            return false;
        };
        joined = next;
    }

    let Some(order) = (0..arity)
        .map(|column| joined.columns.iter().position(|c| *c == column))
        .collect::<Option<Vec<usize>>>()
    else {
        return false;
    };
    let rebuilt: BTreeSet<Tuple> = joined
        .rows
        .iter()
        .map(|row| order.iter().map(|&index| row[index].clone()).collect())
        .collect();
    rebuilt == original
}

fn join(left: &Joined, columns: &[usize], right: &BTreeSet<Tuple>) -> Option<Joined> {
    let mut shared = Vec::new();
    let mut extra = Vec::new();
    for (right_pos, column) in columns.iter().enumerate() {
        match left.columns.iter().position(|c| c == column) {
            Some(left_pos) => shared.push((left_pos, right_pos)),
            None => extra.push(right_pos),
        }
    }

    let mut index: BTreeMap<Vec<&str>, Vec<&Tuple>> = BTreeMap::new();
    for row in right {
        let key = shared.iter().map(|&(_, pos)| row[pos].as_str()).collect();
        index.entry(key).or_default().push(row);
    }

    let mut out_columns = left.columns.clone();
    out_columns.extend(extra.iter().map(|&pos| columns[pos]));
    let mut rows = BTreeSet::new();
    for row in &left.rows {
        let key: Vec<&str> = shared.iter().map(|&(pos, _)| row[pos].as_str()).collect();
        let Some(matches) = index.get(&key) else {
            continue;
        };
        for other in matches {
            let mut merged = row.clone();
            merged.extend(extra.iter().map(|&pos| other[pos].clone()));
            rows.insert(merged);
            if rows.len() > MAX_JOIN_ROWS {
                return None;
            }
        }
    }
    Some(Joined {
        columns: out_columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> Vec<Tuple> {
        values
            .iter()
            .map(|row| row.iter().map(|value| (*value).to_string()).collect())
            .collect()
    }

    fn supplier_part_project() -> Vec<Tuple> {
        rows(&[
            &["s1", "p1", "j2"],
            &["s1", "p2", "j1"],
            &["s2", "p1", "j1"],
            &["s1", "p1", "j1"],
        ])
    }

    #[test]
    fn cyclic_join_dependency_is_lossless() {
        let data = supplier_part_project();
        let components = vec![vec![0, 1], vec![1, 2], vec![0, 2]];
        assert!(is_lossless(&data, 3, &components));
    }

    #[test]
    fn two_way_split_of_cyclic_data_is_lossy() {
        let data = supplier_part_project();
        assert!(!is_lossless(&data, 3, &[vec![0, 1], vec![1, 2]]));
        assert!(!is_lossless(&data, 3, &[vec![0, 1], vec![0, 2]]));
        assert!(!is_lossless(&data, 3, &[vec![1, 2], vec![0, 2]]));
    }

    #[test]
    fn functional_dependency_split_is_lossless() {
        let data = rows(&[
            &["1", "10", "alice"],
            &["2", "10", "alice"],
            &["3", "20", "bob"],
        ]);
        assert!(is_lossless(&data, 3, &[vec![0, 1], vec![1, 2]]));
    }

    #[test]
    fn uncovered_columns_are_rejected() {
        let data = supplier_part_project();
        assert!(!is_lossless(&data, 3, &[vec![0, 1]]));
        assert!(!covers(&[vec![0], vec![2]], 3));
    }
}
