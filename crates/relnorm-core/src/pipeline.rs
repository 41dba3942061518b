//! Normalization pipeline with ordered stage execution.
//!
//! Each normal form is a [`NormalizationStep`]. The pipeline runs its steps
//! in order over a worklist of relations that starts with the root relation
//! and grows as stages split relations apart.
//!
//! # Standard Pipeline Order
//!
//! 1. **FirstNormalFormStep** - Extract multivalued attributes
//! 2. **SecondNormalFormStep** - Split partial dependencies
//! 3. **ThirdNormalFormStep** - Split transitive dependencies
//! 4. **BoyceCoddStep** - Split non-key determinants
//! 5. **FourthNormalFormStep** - Split multivalued dependencies
//! 6. **FifthNormalFormStep** - Split join dependencies found in sample data
//!
//! # Example
//!
//! ```ignore
//! use relnorm_core::{NoAdditionalInput, build_pipeline};
//!
//! let pipeline = build_pipeline(NormalForm::Third);
//! let outcome = pipeline.run(root, &mut NoAdditionalInput)?;
//! ```

use relnorm_model::{NormalForm, Relation};
use tracing::{debug, info, info_span};

use crate::dedupe::dedupe_relations;
use crate::error::Result;
use crate::fifth::{DEFAULT_JOIN_SEARCH_LIMIT, to_5nf_with_limit};
use crate::normalize::Normalize;
use crate::source::DependencySource;

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Largest attribute count the 5NF join dependency search runs on.
    pub join_search_limit: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            join_search_limit: DEFAULT_JOIN_SEARCH_LIMIT,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn with_join_search_limit(mut self, limit: usize) -> Self {
        self.join_search_limit = limit;
        self
    }
}

/// A single normal-form stage in the pipeline.
pub trait NormalizationStep {
    /// The normal form this step establishes.
    fn normal_form(&self) -> NormalForm;

    /// Human-readable name for this step (for logging/debugging).
    fn step_name(&self) -> &str;

    /// Gather supplementary input for `relation` before it is processed.
    ///
    /// Default implementation asks for nothing.
    fn prepare(&self, _relation: &mut Relation, _source: &mut dyn DependencySource) -> Result<()> {
        Ok(())
    }

    /// Decompose `relation` in place and return the relations split off.
    fn execute(&self, relation: &mut Relation, options: &PipelineOptions) -> Result<Vec<Relation>>;
}

/// Step 1: extract multivalued attributes.
pub struct FirstNormalFormStep;

impl NormalizationStep for FirstNormalFormStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::First
    }

    fn step_name(&self) -> &str {
        "first_normal_form"
    }

    fn execute(
        &self,
        relation: &mut Relation,
        _options: &PipelineOptions,
    ) -> Result<Vec<Relation>> {
        relation.to_1nf()
    }
}

/// Step 2: split partial dependencies.
pub struct SecondNormalFormStep;

impl NormalizationStep for SecondNormalFormStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::Second
    }

    fn step_name(&self) -> &str {
        "second_normal_form"
    }

    fn execute(
        &self,
        relation: &mut Relation,
        _options: &PipelineOptions,
    ) -> Result<Vec<Relation>> {
        relation.to_2nf()
    }
}

/// Step 3: split transitive dependencies.
pub struct ThirdNormalFormStep;

impl NormalizationStep for ThirdNormalFormStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::Third
    }

    fn step_name(&self) -> &str {
        "third_normal_form"
    }

    fn execute(
        &self,
        relation: &mut Relation,
        _options: &PipelineOptions,
    ) -> Result<Vec<Relation>> {
        relation.to_3nf()
    }
}

/// Step 4: split every determinant that is not the primary key.
pub struct BoyceCoddStep;

impl NormalizationStep for BoyceCoddStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::BoyceCodd
    }

    fn step_name(&self) -> &str {
        "boyce_codd_normal_form"
    }

    fn execute(
        &self,
        relation: &mut Relation,
        _options: &PipelineOptions,
    ) -> Result<Vec<Relation>> {
        relation.to_bcnf()
    }
}

/// Step 5: split multivalued dependencies, including ones declared by the
/// dependency source.
pub struct FourthNormalFormStep;

impl NormalizationStep for FourthNormalFormStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::Fourth
    }

    fn step_name(&self) -> &str {
        "fourth_normal_form"
    }

    fn prepare(&self, relation: &mut Relation, source: &mut dyn DependencySource) -> Result<()> {
        for fd in source.additional_dependencies(relation)? {
            debug!(relation = %relation.name, dependency = %fd, "attaching declared dependency");
            relation.attach_dependency(fd)?;
        }
        if relation.data.is_empty() && relation.fds.iter().any(|fd| fd.is_multivalued()) {
            let rows = source.sample_tuples(relation)?;
            relation.set_data(rows)?;
        }
        Ok(())
    }

    fn execute(
        &self,
        relation: &mut Relation,
        _options: &PipelineOptions,
    ) -> Result<Vec<Relation>> {
        relation.to_4nf()
    }
}

/// Step 6: split join dependencies found in the sample tuples.
pub struct FifthNormalFormStep;

impl NormalizationStep for FifthNormalFormStep {
    fn normal_form(&self) -> NormalForm {
        NormalForm::Fifth
    }

    fn step_name(&self) -> &str {
        "fifth_normal_form"
    }

    fn prepare(&self, relation: &mut Relation, source: &mut dyn DependencySource) -> Result<()> {
        if relation.attributes.len() > 2 && relation.data.is_empty() {
            let rows = source.sample_tuples(relation)?;
            relation.set_data(rows)?;
        }
        Ok(())
    }

    fn execute(&self, relation: &mut Relation, options: &PipelineOptions) -> Result<Vec<Relation>> {
        to_5nf_with_limit(relation, options.join_search_limit)
    }
}

/// Counts for one stage pass over the worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub form: NormalForm,
    /// Relations visited, including ones created during this pass.
    pub visited: usize,
    /// Relations split off during this pass.
    pub created: usize,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct NormalizationOutcome {
    pub relations: Vec<Relation>,
    pub stages: Vec<StageReport>,
    pub duplicates_removed: usize,
}

/// An ordered pipeline of normalization steps.
pub struct NormalizationPipeline {
    steps: Vec<Box<dyn NormalizationStep>>,
    options: PipelineOptions,
}

impl Default for NormalizationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizationPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            options: PipelineOptions::default(),
        }
    }

    /// Add a step to the end of the pipeline.
    #[must_use]
    pub fn add_step(mut self, step: Box<dyn NormalizationStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Remove a step by name.
    #[must_use]
    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|step| step.step_name() != step_name);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.step_name()).collect()
    }

    /// Run every step over the worklist seeded with `root`, then drop
    /// relations with duplicate attribute sets.
    pub fn run(
        &self,
        root: Relation,
        source: &mut dyn DependencySource,
    ) -> Result<NormalizationOutcome> {
        self.run_all(vec![root], source)
    }

    /// Like [`run`](Self::run), with every relation of a schema in one
    /// worklist so names and duplicates are resolved across all of them.
    pub fn run_all(
        &self,
        roots: Vec<Relation>,
        source: &mut dyn DependencySource,
    ) -> Result<NormalizationOutcome> {
        for root in &roots {
            root.validate()?;
        }
        let mut worklist = roots;
        let mut stages = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let form = step.normal_form();
            let span = info_span!("stage", form = %form);
            let report = span
                .in_scope(|| run_stage(step.as_ref(), &mut worklist, source, &self.options))?;
            info!(
                form = %form,
                visited = report.visited,
                created = report.created,
                relations = worklist.len(),
                "stage complete"
            );
            stages.push(report);
        }
        let duplicates_removed = dedupe_relations(&mut worklist);
        if duplicates_removed > 0 {
            info!(removed = duplicates_removed, "removed duplicate relations");
        }
        Ok(NormalizationOutcome {
            relations: worklist,
            stages,
            duplicates_removed,
        })
    }
}

/// Apply one step to every relation in the worklist.
///
/// The loop runs by index while the worklist grows: relations appended by
/// this pass are visited by this same pass, so chains of dependencies keep
/// splitting until no relation in the chain violates the form.
fn run_stage(
    step: &dyn NormalizationStep,
    worklist: &mut Vec<Relation>,
    source: &mut dyn DependencySource,
    options: &PipelineOptions,
) -> Result<StageReport> {
    let mut report = StageReport {
        form: step.normal_form(),
        visited: 0,
        created: 0,
    };
    let mut index = 0;
    while index < worklist.len() {
        let relation = &mut worklist[index];
        step.prepare(relation, source)?;
        let children = step.execute(relation, options)?;
        report.visited += 1;
        report.created += children.len();
        for mut child in children {
            child.name = unique_name(worklist, &child);
            debug!(step = step.step_name(), child = %child, "appending relation");
            worklist.push(child);
        }
        index += 1;
    }
    Ok(report)
}

/// A name for `child` that does not clash with a relation holding a
/// different attribute set. Clashes with an identical attribute set are kept
/// for the final dedup pass to collapse.
fn unique_name(worklist: &[Relation], child: &Relation) -> String {
    let attrs = child.attribute_set();
    let clashes = |name: &str| {
        worklist
            .iter()
            .any(|existing| existing.name == name && existing.attribute_set() != attrs)
    };
    if !clashes(&child.name) {
        return child.name.clone();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}{suffix}", child.name);
        if !clashes(&candidate) && !worklist.iter().any(|existing| existing.name == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Build the pipeline that brings a schema to `target`.
///
/// Every stage up to and including the target runs, in order.
pub fn build_pipeline(target: NormalForm) -> NormalizationPipeline {
    target
        .stages()
        .fold(NormalizationPipeline::new(), |pipeline, form| {
            pipeline.add_step(step_for(form))
        })
}

/// The step implementing `form`.
pub fn step_for(form: NormalForm) -> Box<dyn NormalizationStep> {
    match form {
        NormalForm::First => Box::new(FirstNormalFormStep),
        NormalForm::Second => Box::new(SecondNormalFormStep),
        NormalForm::Third => Box::new(ThirdNormalFormStep),
        NormalForm::BoyceCodd => Box::new(BoyceCoddStep),
        NormalForm::Fourth => Box::new(FourthNormalFormStep),
        NormalForm::Fifth => Box::new(FifthNormalFormStep),
    }
}
