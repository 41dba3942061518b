use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span};

use relnorm_cli::prompt::InteractiveSource;
use relnorm_core::{NoAdditionalInput, NormalizationOutcome, PipelineOptions, build_pipeline};
use relnorm_ingest::{read_samples, read_schema, write_schema};
use relnorm_model::NormalForm;

use crate::cli::{Cli, OutputFormatArg};

/// Everything the summary reports about one run.
pub struct NormalizeRun {
    pub input: PathBuf,
    pub target: NormalForm,
    /// `None` for dry runs.
    pub output: Option<PathBuf>,
    pub outcome: NormalizationOutcome,
}

pub fn run_normalize(cli: &Cli) -> Result<NormalizeRun> {
    let span = info_span!("normalize", input = %cli.input.display());
    let _guard = span.enter();

    let interactive = !cli.no_prompt && io::stdin().is_terminal();
    let mut prompts = InteractiveSource::new(io::stdin().lock(), io::stdout());
    let target = resolve_form(cli.form.as_deref(), interactive.then_some(&mut prompts))?;

    let mut relations = read_schema(&cli.input)
        .with_context(|| format!("read schema {}", cli.input.display()))?;
    if let Some(path) = &cli.samples {
        let root = relations
            .first_mut()
            .ok_or_else(|| anyhow!("schema has no relation to attach samples to"))?;
        let rows = read_samples(path, root)
            .with_context(|| format!("read samples {}", path.display()))?;
        root.set_data(rows)
            .with_context(|| format!("attach samples to {}", root.name))?;
    }

    let pipeline = build_pipeline(target).with_options(
        PipelineOptions::default().with_join_search_limit(cli.max_join_attributes),
    );
    info!(
        target = %target,
        steps = ?pipeline.step_names(),
        relations = relations.len(),
        "starting normalization"
    );
    let result = if interactive && target.uses_samples() {
        pipeline.run_all(relations, &mut prompts)
    } else {
        pipeline.run_all(relations, &mut NoAdditionalInput)
    };
    let outcome = result.context("normalize schema")?;

    let output = if cli.dry_run {
        None
    } else {
        write_output(cli, &outcome)?;
        Some(cli.output.clone())
    };
    Ok(NormalizeRun {
        input: cli.input.clone(),
        target,
        output,
        outcome,
    })
}

/// Parse the requested form, asking again while it is missing or invalid.
pub fn resolve_form<R: BufRead, W: Write>(
    requested: Option<&str>,
    prompts: Option<&mut InteractiveSource<R, W>>,
) -> Result<NormalForm> {
    let parsed = requested.map(str::parse::<NormalForm>);
    match (parsed, prompts) {
        (Some(Ok(form)), _) => Ok(form),
        (Some(Err(error)), Some(prompts)) => {
            eprintln!("{error}");
            prompt_form(prompts)
        }
        (None, Some(prompts)) => prompt_form(prompts),
        (Some(Err(error)), None) => Err(error.into()),
        (None, None) => {
            bail!("no target normal form given; pass --form (1NF, 2NF, 3NF, BCNF, 4NF or 5NF)")
        }
    }
}

fn prompt_form<R: BufRead, W: Write>(prompts: &mut InteractiveSource<R, W>) -> Result<NormalForm> {
    prompts
        .prompt_normal_form()
        .context("read target normal form")?
        .ok_or_else(|| anyhow!("input ended before a target normal form was entered"))
}

fn write_output(cli: &Cli, outcome: &NormalizationOutcome) -> Result<()> {
    match cli.format {
        OutputFormatArg::Text => write_schema(&cli.output, &outcome.relations)
            .with_context(|| format!("write {}", cli.output.display())),
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&outcome.relations)
                .context("serialize relations")?;
            std::fs::write(&cli.output, json)
                .with_context(|| format!("write {}", cli.output.display()))?;
            info!(
                path = %cli.output.display(),
                relations = outcome.relations.len(),
                "wrote schema"
            );
            Ok(())
        }
    }
}
