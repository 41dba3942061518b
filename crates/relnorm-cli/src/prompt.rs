//! Interactive terminal prompts.
//!
//! The 4NF and 5NF stages ask for multivalued dependencies the schema file
//! does not declare and for sample tuples. Each list ends at an empty line,
//! `done`, or end of input. Malformed entries are reported and asked for
//! again; they never abort the run.

use std::io::{self, BufRead, Write};

use relnorm_core::DependencySource;
use relnorm_ingest::parse_dependency;
use relnorm_model::{FunctionalDependency, NormalForm, Relation, Tuple};
use tracing::debug;

/// Word that ends a list of entries.
pub const SENTINEL: &str = "done";

/// A [`DependencySource`] that asks the user.
pub struct InteractiveSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Ask for a target normal form until a valid token is entered.
    ///
    /// Returns `None` when input ends first.
    pub fn prompt_normal_form(&mut self) -> io::Result<Option<NormalForm>> {
        loop {
            write!(self.output, "Target normal form (1NF, 2NF, 3NF, BCNF, 4NF, 5NF): ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.parse::<NormalForm>() {
                Ok(form) => return Ok(Some(form)),
                Err(error) => writeln!(self.output, "{error}")?,
            }
        }
    }

    /// Next line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Next list entry; `None` at a sentinel or end of input.
    fn read_entry(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        Ok(self
            .read_line()?
            .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case(SENTINEL)))
    }
}

impl<R: BufRead, W: Write> DependencySource for InteractiveSource<R, W> {
    fn additional_dependencies(
        &mut self,
        relation: &Relation,
    ) -> relnorm_core::Result<Vec<FunctionalDependency>> {
        writeln!(
            self.output,
            "Multivalued dependencies for {relation}, as {{A}} ->> {{B}} | {{C}} \
             (empty line or '{SENTINEL}' to finish):"
        )?;
        let attributes = relation.attribute_set();
        let mut declared = Vec::new();
        while let Some(entry) = self.read_entry()? {
            let fd = match parse_dependency(&entry) {
                Ok(fd) => fd,
                Err(error) => {
                    writeln!(self.output, "{error}")?;
                    continue;
                }
            };
            if !fd.is_multivalued() {
                writeln!(self.output, "'{entry}' is not a multivalued dependency; use '->>'")?;
                continue;
            }
            if let Some(unknown) = fd.attributes().find(|name| !attributes.contains(*name)) {
                writeln!(self.output, "{} has no attribute '{unknown}'", relation.name)?;
                continue;
            }
            debug!(relation = %relation.name, dependency = %fd, "declared multivalued dependency");
            declared.push(fd);
        }
        Ok(declared)
    }

    fn sample_tuples(&mut self, relation: &Relation) -> relnorm_core::Result<Vec<Tuple>> {
        let names = relation.attribute_names();
        writeln!(
            self.output,
            "Sample tuples for {relation}, values for {} separated by commas \
             (empty line or '{SENTINEL}' to finish):",
            names.join(", ")
        )?;
        let mut rows = Vec::new();
        while let Some(entry) = self.read_entry()? {
            let row: Tuple = entry.split(',').map(|value| value.trim().to_string()).collect();
            if row.len() != names.len() {
                writeln!(self.output, "expected {} values, got {}", names.len(), row.len())?;
                continue;
            }
            rows.push(row);
        }
        debug!(relation = %relation.name, rows = rows.len(), "collected sample tuples");
        Ok(rows)
    }
}
