use crate::cli::CheckArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use oadkit::core::config::{load_document, load_document_as};
use oadkit::engine::binder::{BoundOptimization, VariableBinding};
use oadkit::engine::model::ModelTreeNode;
use oadkit::engine::progress::ProgressReporter;
use oadkit::workflows::assemble::{self, AssembledProblem};
use std::fmt::Write;
use tracing::info;

pub fn run(args: CheckArgs, progress: &CliProgressHandler) -> Result<()> {
    info!("Loading process description from {:?}", &args.config);
    let document = match args.format {
        Some(format) => load_document_as(&args.config, format)?,
        None => load_document(&args.config)?,
    };

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let problem = assemble::assemble(&document, &reporter)?;

    print!("{}", render_problem(&problem));
    println!("✓ '{}' assembled successfully.", args.config.display());
    Ok(())
}

pub fn render_problem(problem: &AssembledProblem) -> String {
    let mut out = String::new();
    if !problem.title.is_empty() {
        let _ = writeln!(out, "Problem: {}", problem.title);
    }
    if let Some(path) = &problem.input_file {
        let _ = writeln!(out, "Input file: {}", path.display());
    }
    if let Some(path) = &problem.output_file {
        let _ = writeln!(out, "Output file: {}", path.display());
    }
    if let Some(driver) = &problem.driver {
        let _ = writeln!(out, "Driver: {driver}");
    }

    let _ = writeln!(out, "Model:");
    render_node(&mut out, "model", &problem.model, 1);

    if let Some(optimization) = &problem.optimization {
        render_optimization(&mut out, optimization);
    }
    out
}

fn render_node(out: &mut String, name: &str, node: &ModelTreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        ModelTreeNode::Component(instance) => {
            let _ = write!(out, "{indent}{name}: {}", instance.identifier);
            if !instance.options.is_empty() {
                let options: Vec<String> = instance
                    .options
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                let _ = write!(out, " ({})", options.join(", "));
            }
            out.push('\n');
        }
        ModelTreeNode::Group(group) => {
            let _ = writeln!(
                out,
                "{indent}{name} [nonlinear: {}, linear: {}]",
                group.nonlinear_solver, group.linear_solver
            );
            for (child_name, child) in &group.children {
                render_node(out, child_name, child, depth + 1);
            }
        }
    }
}

fn render_optimization(out: &mut String, optimization: &BoundOptimization) {
    let _ = writeln!(out, "Optimization:");
    for binding in &optimization.design_variables {
        render_binding(out, binding);
    }
    for binding in &optimization.constraints {
        render_binding(out, binding);
    }
    render_binding(out, &optimization.objective);
}

fn render_binding(out: &mut String, binding: &VariableBinding) {
    let _ = write!(out, "  {}: {}", binding.role, binding.name);
    let bound = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    if binding.lower.is_some() || binding.upper.is_some() {
        let _ = write!(out, " in [{}, {}]", bound(binding.lower), bound(binding.upper));
    }
    if let Some(units) = &binding.units {
        let _ = write!(out, " {units}");
    }
    if let Some(scaler) = binding.scaler {
        let _ = write!(out, " (scaler {scaler})");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use oadkit::core::config::{ConfigFormat, parse_document};

    #[test]
    fn renders_tree_solvers_and_bindings() {
        let document = parse_document(
            r#"
title = "Rendering"
driver = "om.ScipyOptimizeDriver(optimizer='SLSQP')"

[model]
nonlinear_solver = "om.NonlinearBlockGS(maxiter=10)"

[model.geometry]
id = "fastoad.geometry.legacy"
cabin_sizing = 0.5

[optimization]
design_var = { name = "data:geometry:wing:area", lower = 100, upper = 150, units = "m**2" }
objective = { name = "data:geometry:wing:span" }
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        let problem = assemble::assemble(&document, &ProgressReporter::new()).unwrap();

        let rendered = render_problem(&problem);
        assert!(rendered.contains("Problem: Rendering"));
        assert!(rendered.contains("Driver: om.ScipyOptimizeDriver(optimizer='SLSQP')"));
        assert!(rendered.contains("  model [nonlinear: NonlinearBlockGS(maxiter=10), linear: engine default]"));
        assert!(rendered.contains("    geometry: fastoad.geometry.legacy (cabin_sizing=0.5)"));
        assert!(rendered.contains("  design variable: data:geometry:wing:area in [100, 150] m**2"));
        assert!(rendered.contains("  objective: data:geometry:wing:span"));
    }
}
