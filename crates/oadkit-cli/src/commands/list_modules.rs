use crate::cli::ListModulesArgs;
use crate::error::Result;
use oadkit::core::components::{ComponentRegistry, Origin};
use oadkit::core::config::load_document;
use std::fmt::Write;
use tracing::info;

pub fn run(args: ListModulesArgs) -> Result<()> {
    let registry = collect_registry(&args)?;
    print!("{}", render_registry(&registry));
    Ok(())
}

/// The built-in components plus everything found in the requested module folders.
pub fn collect_registry(args: &ListModulesArgs) -> Result<ComponentRegistry> {
    let mut registry = ComponentRegistry::with_builtins()?;

    if let Some(config) = &args.config {
        let document = load_document(config)?;
        let count = registry.discover(&document.module_folders, document.base_dir.as_deref())?;
        info!("Discovered {} component(s) from {:?}", count, config);
    }
    if !args.folders.is_empty() {
        let count = registry.discover(&args.folders, None)?;
        info!("Discovered {} component(s) from command-line folders", count);
    }
    Ok(registry)
}

pub fn render_registry(registry: &ComponentRegistry) -> String {
    let width = registry
        .identifiers()
        .iter()
        .map(|id| id.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for registration in registry.iter() {
        let origin = match &registration.origin {
            Origin::BuiltIn => "built-in".to_string(),
            Origin::Discovered { manifest } => manifest.display().to_string(),
        };
        let _ = writeln!(
            out,
            "{:<width$}  [{}]  {}",
            registration.identifier,
            origin,
            registration.factory.description(),
        );
    }
    let _ = writeln!(out, "{} component(s) available.", registry.len());
    out
}
