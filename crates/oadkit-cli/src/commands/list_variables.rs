use crate::cli::ListVariablesArgs;
use crate::error::Result;
use oadkit::core::components::{ComponentRegistry, Direction};
use oadkit::core::config::load_document;
use oadkit::core::variables::VariableDescriptions;
use oadkit::engine::builder;
use oadkit::engine::model::ModelTreeNode;
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::info;

pub fn run(args: ListVariablesArgs) -> Result<()> {
    let document = load_document(&args.config)?;

    let mut registry = ComponentRegistry::with_builtins()?;
    registry.discover(&document.module_folders, document.base_dir.as_deref())?;
    let model = builder::build(&document.model, &registry)?;

    let mut descriptions =
        VariableDescriptions::from_folders(&document.module_folders, document.base_dir.as_deref())?;
    if let Some(path) = &args.descriptions {
        info!("Loading variable descriptions from {:?}", path);
        descriptions.extend(VariableDescriptions::load(path)?);
    }

    print!("{}", render_variables(&model, &descriptions));
    Ok(())
}

pub fn render_variables(model: &ModelTreeNode, descriptions: &VariableDescriptions) -> String {
    let declarations = model.declarations();
    let width = declarations.keys().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    for (name, directions) in &declarations {
        let _ = write!(out, "{name:<width$}  [{:<6}]", direction_label(directions));
        if let Some(description) = descriptions.get(name) {
            let _ = write!(out, "  {description}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{} variable(s) declared.", declarations.len());
    out
}

fn direction_label(directions: &BTreeSet<Direction>) -> &'static str {
    match (
        directions.contains(&Direction::Input),
        directions.contains(&Direction::Output),
    ) {
        (true, true) => "in/out",
        (false, true) => "out",
        _ => "in",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oadkit::core::config::{ConfigFormat, parse_document};

    #[test]
    fn lists_directions_and_descriptions() {
        let document = parse_document(
            "[model.geometry]\nid = \"fastoad.geometry.legacy\"\n[model.low]\nid = \"fastoad.aerodynamics.lowspeed.legacy\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let model = builder::build(&document.model, &ComponentRegistry::with_builtins().unwrap()).unwrap();
        let descriptions =
            VariableDescriptions::parse("data:geometry:wing:span || wing span\n").unwrap();

        let rendered = render_variables(&model, &descriptions);
        let span = rendered
            .lines()
            .find(|l| l.starts_with("data:geometry:wing:span "))
            .unwrap();
        assert!(span.contains("[in/out]"));
        assert!(span.ends_with("wing span"));

        let area = rendered
            .lines()
            .find(|l| l.starts_with("data:geometry:wing:area "))
            .unwrap();
        assert!(area.contains("[in    ]"));
        assert!(rendered.ends_with(&format!("{} variable(s) declared.\n", model.variables().len())));
    }
}
