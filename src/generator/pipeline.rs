use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::materialize::{create_layout, write_and_log};
use super::templates::{render_model_artifacts, GeneratedArtifact, ModelArtifact, SharedArtifact};
use crate::config::ScaffoldConfig;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::reconcile::{ensure_all, reconcile_env_file, PackageInstaller, PackageManifest};
use crate::report::report_tree;
use crate::schema::{case_collisions, MetadataSource, ModelName, SchemaReader};

/// Outcome of a completed run
///
/// A run that reaches the end returns a report even if individual steps
/// failed; those failures are collected in `failures`.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Models whose route file was written, in discovery order; these are
    /// the routers the app bootstrap mounts
    pub models: Vec<ModelName>,
    /// Files written, relative to the project root
    pub written: Vec<PathBuf>,
    /// Discovered table names that are not valid model names or that collide
    /// with another table once lower-cased
    pub skipped: Vec<String>,
    /// Packages installed this run
    pub installed: Vec<String>,
    /// Variables appended to the environment file
    pub env_added: Vec<String>,
    /// Non-fatal failures, in the order they happened
    pub failures: Vec<ScaffoldError>,
}

impl GenerationReport {
    /// No step failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, err: ScaffoldError) {
        error!("{err}");
        self.failures.push(err);
    }
}

/// Check that the project is ready for generation
///
/// Requires a `src/` directory and every prerequisite package declared in
/// `package.json`.
///
/// # Errors
///
/// Returns [`ScaffoldError::Prerequisite`] describing what is missing.
pub fn check_prerequisites(config: &ScaffoldConfig) -> ScaffoldResult<()> {
    if !config.src_dir().is_dir() {
        return Err(ScaffoldError::Prerequisite(
            "src directory not found. Run `api-scaffold setup` first.".to_string(),
        ));
    }

    let manifest_path = config.manifest_path();
    let manifest = PackageManifest::load(&manifest_path)
        .map_err(|e| ScaffoldError::Prerequisite(format!("{e:#}")))?;
    let missing: Vec<&str> = config
        .prerequisite_packages
        .iter()
        .filter(|pkg| !manifest.declares(pkg))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(ScaffoldError::Prerequisite(format!(
            "{} must be installed. Run `npm install {}` first.",
            missing.join(" and "),
            missing.join(" ")
        )));
    }
    Ok(())
}

/// One scaffolding run over a metadata source
///
/// Steps run strictly in sequence: list models, then for each model fetch
/// fields, render and write its artifacts, then shared scaffolding,
/// dependencies, the environment file and finally the tree report.
///
/// Failing to create the directory layout or to fetch metadata ends the run.
/// Render, write, install, env and report failures are recorded and the run
/// carries on. The source is closed exactly once whichever way the run ends.
pub struct Pipeline<S, I> {
    reader: SchemaReader<S>,
    installer: I,
    config: ScaffoldConfig,
}

impl<S: MetadataSource, I: PackageInstaller> Pipeline<S, I> {
    pub fn new(source: S, installer: I, config: ScaffoldConfig) -> Self {
        let reader = SchemaReader::new(source, config.db_schema.clone());
        Self {
            reader,
            installer,
            config,
        }
    }

    pub fn source(&self) -> &S {
        self.reader.source()
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Run generation, printing the resulting tree to `out`
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped the run. The source has been
    /// closed by the time this returns.
    pub async fn run<W: Write>(&self, out: &mut W) -> ScaffoldResult<GenerationReport> {
        let result = self.run_steps(out).await;
        if let Err(e) = &result {
            error!("Error generating API: {e}");
        }
        self.reader.close().await;

        if let Ok(report) = &result {
            if report.is_clean() {
                info!("API generation completed successfully.");
            } else {
                warn!("API generation completed with {} failure(s).", report.failures.len());
            }
        }
        result
    }

    async fn run_steps<W: Write>(&self, out: &mut W) -> ScaffoldResult<GenerationReport> {
        let mut report = GenerationReport::default();
        let root = self.config.project_root.as_path();
        let src_dir = self.config.src_dir();
        let ctx = self.config.render_context();

        create_layout(&src_dir)?;

        let names = self.reader.list_models().await?;
        info!("Found {} model(s)", names.len());
        let collisions = case_collisions(&names);

        for raw in names {
            let Some(model) = ModelName::parse(&raw) else {
                if self.config.warn_on_skipped_models {
                    warn!("Skipping table {raw:?}: not a valid model name");
                } else {
                    debug!("Skipping table {raw:?}");
                }
                report.skipped.push(raw);
                continue;
            };

            if collisions.contains(&model.lower()) {
                warn!(
                    "Skipping table {raw:?}: another table has the same lower-cased name {:?}",
                    model.lower()
                );
                report.skipped.push(raw);
                continue;
            }

            let fields = self.reader.fields_of(&model).await?;
            debug!(model = %model, fields = fields.len(), "rendering model");

            match render_model_artifacts(&model, &fields, &ctx) {
                Ok(artifacts) => {
                    let route_path = ModelArtifact::Route.relative_path(&model);
                    let mut route_written = false;
                    for artifact in &artifacts {
                        let written = write_artifact(root, artifact, &mut report);
                        route_written |= written && artifact.path == route_path;
                    }
                    // Only models with a route on disk can be mounted by the app
                    if route_written {
                        report.models.push(model);
                    }
                }
                Err(e) => report.record(e),
            }
        }

        for kind in SharedArtifact::for_scope(self.config.full_app) {
            match kind.to_artifact(&report.models, &ctx) {
                Ok(artifact) => {
                    write_artifact(root, &artifact, &mut report);
                }
                Err(e) => report.record(e),
            }
        }

        let packages = self.config.packages_for_run();
        let (installed, failures) =
            ensure_all(&self.installer, &self.config.manifest_path(), &packages).await;
        report.installed = installed;
        report.failures.extend(failures);

        match reconcile_env_file(&self.config.env_path(), &self.config.resolved_env()) {
            Ok(added) => report.env_added = added,
            Err(e) => report.record(e),
        }

        if let Err(e) = report_tree(out, &src_dir) {
            report.record(e);
        }

        Ok(report)
    }
}

fn write_artifact(
    root: &Path,
    artifact: &GeneratedArtifact,
    report: &mut GenerationReport,
) -> bool {
    match write_and_log(&root.join(&artifact.path), &artifact.content) {
        Ok(()) => {
            report.written.push(artifact.path.clone());
            true
        }
        Err(e) => {
            report.record(e);
            false
        }
    }
}
