use crate::core::callspec::CallSpec;
use crate::core::components::ComponentRegistry;
use crate::core::config::ConfigurationDocument;
use crate::core::error::AssemblyError;
use crate::engine::binder::{self, BoundOptimization};
use crate::engine::builder::ModelBuilder;
use crate::engine::model::ModelTreeNode;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// A fully validated problem, ready to be handed to the execution engine.
///
/// Owns its model tree; the source document may be dropped once this exists.
#[derive(Debug)]
pub struct AssembledProblem {
    pub title: String,
    pub model: ModelTreeNode,
    pub optimization: Option<BoundOptimization>,
    pub driver: Option<CallSpec>,
    /// Resolved against the document's directory.
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
}

/// Assembles a document against the built-in components plus whatever its module folders
/// contribute.
pub fn assemble(
    document: &ConfigurationDocument,
    reporter: &ProgressReporter,
) -> Result<AssembledProblem, AssemblyError> {
    assemble_with(document, &ComponentRegistry::with_builtins()?, reporter)
}

/// Assembles a document starting from a copy of `base_registry`.
///
/// The stages run in a fixed order: component discovery, model tree construction, then
/// driver parsing and optimization binding. The first failure is returned unchanged and
/// `base_registry` is never modified.
#[instrument(skip_all, name = "assembly_workflow", fields(title = %document.title))]
pub fn assemble_with(
    document: &ConfigurationDocument,
    base_registry: &ComponentRegistry,
    reporter: &ProgressReporter,
) -> Result<AssembledProblem, AssemblyError> {
    // === Phase 1: Component discovery ===
    let registry = reporter.phase("Discovering components", || {
        let mut registry = base_registry.clone();
        if !document.module_folders.is_empty() {
            let count = registry.discover(&document.module_folders, document.base_dir.as_deref())?;
            info!(
                "Discovered {} component(s) in {} module folder(s).",
                count,
                document.module_folders.len()
            );
        }
        Ok::<_, AssemblyError>(registry)
    })?;

    // === Phase 2: Model tree construction ===
    let model = reporter.phase("Building model", || {
        ModelBuilder::new(&registry, reporter).build(&document.model)
    })?;
    info!(
        "Built model tree with {} node(s) declaring {} variable(s).",
        model.node_count(),
        model.variables().len()
    );

    // === Phase 3: Driver and optimization binding ===
    let (driver, optimization) = reporter.phase("Binding optimization", || {
        let driver = document
            .driver
            .as_deref()
            .map(binder::parse_driver)
            .transpose()?;
        let optimization = document
            .optimization
            .as_ref()
            .map(|spec| binder::bind(spec, &model))
            .transpose()?;
        Ok::<_, AssemblyError>((driver, optimization))
    })?;

    if optimization.is_some() && driver.is_none() {
        warn!("An optimization problem is defined but no driver is configured.");
        reporter.report(Progress::Message(
            "optimization defined without a driver".to_string(),
        ));
    }

    Ok(AssembledProblem {
        title: document.title.clone(),
        model,
        optimization,
        driver,
        input_file: document.input_file.as_deref().map(|p| document.resolve_path(p)),
        output_file: document.output_file.as_deref().map(|p| document.resolve_path(p)),
    })
}
