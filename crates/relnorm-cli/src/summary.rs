use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use relnorm_model::{Relation, braced};

use crate::commands::NormalizeRun;

pub fn print_summary(run: &NormalizeRun) {
    println!("Input: {}", run.input.display());
    println!("Target: {}", run.target);
    match &run.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    println!("{}", relation_table(&run.outcome.relations));
    println!();
    println!("Stages:");
    println!("{}", stage_table(run));
}

fn relation_table(relations: &[Relation]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Relation"),
        header_cell("Attributes"),
        header_cell("Primary Key"),
        header_cell("Dependencies"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for relation in relations {
        table.add_row(vec![
            Cell::new(&relation.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(relation.attribute_names().join(", ")),
            Cell::new(braced(&relation.primary_key)),
            count_cell(relation.fds.len()),
            count_cell(relation.data.len()),
        ]);
    }
    let (dependencies, rows) = totals(relations);
    table.add_row(vec![
        Cell::new(format!("TOTAL ({})", relations.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(dependencies).add_attribute(Attribute::Bold),
        Cell::new(rows).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Dependency and sample row counts summed over `relations`.
fn totals(relations: &[Relation]) -> (usize, usize) {
    relations.iter().fold((0, 0), |(dependencies, rows), relation| {
        (dependencies + relation.fds.len(), rows + relation.data.len())
    })
}

fn stage_table(run: &NormalizeRun) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Visited"),
        header_cell("Created"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for stage in &run.outcome.stages {
        table.add_row(vec![
            Cell::new(stage.form).add_attribute(Attribute::Bold),
            Cell::new(stage.visited),
            count_cell(stage.created),
        ]);
    }
    table.add_row(vec![
        dim_cell("duplicates removed"),
        dim_cell("-"),
        count_cell(run.outcome.duplicates_removed),
    ]);
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnorm_model::{Attribute as Column, FunctionalDependency};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn totals_sum_rows_not_relations() {
        let pair = Relation::new(
            "Pair",
            vec![Column::new("A", "INT"), Column::new("B", "INT")],
            names(&["A"]),
        )
        .with_dependencies(vec![
            FunctionalDependency::new(names(&["A"]), names(&["B"])).unwrap(),
        ])
        .with_data(vec![names(&["1", "2"]), names(&["2", "2"]), names(&["3", "4"])]);
        let single = Relation::new("Single", vec![Column::new("A", "INT")], names(&["A"]));

        assert_eq!(totals(&[pair, single]), (1, 3));
        assert_eq!(totals(&[]), (0, 0));
    }
}
