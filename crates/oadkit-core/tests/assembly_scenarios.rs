use oadkit::core::components::{ComponentRegistry, ComponentSchema, Origin};
use oadkit::core::config::{ConfigFormat, ConfigurationNode, load_document, parse_document};
use oadkit::core::error::{AssemblyError, ErrorKind, VariableRole};
use oadkit::engine::model::{SolverBinding, SolverKind};
use oadkit::engine::progress::ProgressReporter;
use oadkit::workflows::assemble::{assemble, assemble_with};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

fn two_discipline_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for schema in [
        ComponentSchema::new("test.disc1").inputs(&["x"]).outputs(&["y1"]),
        ComponentSchema::new("test.disc2").inputs(&["y1"]).outputs(&["y2"]),
    ] {
        let identifier = schema.identifier.clone();
        registry
            .register(&identifier, Arc::new(schema), Origin::BuiltIn)
            .unwrap();
    }
    registry
}

fn two_discipline_document(objective: &str) -> String {
    format!(
        r#"
title = "Sellar-like"

[model]
nonlinear_solver = "om.NonlinearBlockGS(maxiter=20)"

[model.disc1]
id = "test.disc1"

[model.disc2]
id = "test.disc2"

[optimization]
design_var = {{ name = "x", lower = 0, upper = 10 }}
objective = {{ name = "{objective}" }}
"#
    )
}

#[test]
fn two_disciplines_with_known_objective_assemble() {
    let document = parse_document(&two_discipline_document("y2"), ConfigFormat::Toml).unwrap();
    let problem = assemble_with(&document, &two_discipline_registry(), &ProgressReporter::new()).unwrap();

    let root = problem.model.as_group().unwrap();
    assert!(matches!(
        &root.nonlinear_solver,
        SolverBinding::Explicit(spec) if spec.kind == SolverKind::NonlinearBlockGS
    ));
    assert_eq!(problem.optimization.unwrap().objective.name, "y2");
}

#[test]
fn two_disciplines_with_unknown_objective_fail() {
    let document = parse_document(&two_discipline_document("y3"), ConfigFormat::Toml).unwrap();
    let err = assemble_with(&document, &two_discipline_registry(), &ProgressReporter::new()).unwrap_err();
    match err {
        AssemblyError::UnknownVariable { name, role } => {
            assert_eq!(name, "y3");
            assert_eq!(role, VariableRole::Objective);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_module_folder_fails_discovery_naming_the_folder() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("process.yml");
    fs::write(
        &path,
        "module_folders: [\"./bad_path\"]\nmodel:\n  never_built:\n    id: not.registered\n",
    )
    .unwrap();

    let document = load_document(&path).unwrap();
    let err = assemble(&document, &ProgressReporter::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DiscoveryError);
    assert_eq!(err.location(), "./bad_path");
}

#[test]
fn leaf_with_child_table_is_malformed_at_its_path() {
    let err = parse_document(
        "[model.aero]\nid = \"x\"\n\n[model.aero.polar]\nid = \"y\"\n",
        ConfigFormat::Toml,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedConfiguration);
    assert_eq!(err.location(), "model.aero");

    let err = parse_document(
        "model:\n  aero:\n    id: x\n    polar:\n      id: y\n",
        ConfigFormat::Yaml,
    )
    .unwrap_err();
    assert_eq!(err.location(), "model.aero");
}

#[test]
fn inverted_bounds_fail_whether_or_not_the_variable_exists() {
    for name in ["x", "nowhere"] {
        let text = format!(
            "model:\n  disc1:\n    id: test.disc1\n  disc2:\n    id: test.disc2\noptimization:\n  design_var:\n    name: {name}\n    lower: 10\n    upper: 0\n  objective:\n    name: y2\n"
        );
        let document = parse_document(&text, ConfigFormat::Yaml).unwrap();
        let err = assemble_with(&document, &two_discipline_registry(), &ProgressReporter::new()).unwrap_err();
        assert!(
            matches!(err, AssemblyError::InvalidBounds { name: ref found, .. } if found == name),
            "{err}"
        );
    }
}

#[test]
fn document_can_be_dropped_after_assembly() {
    let problem = {
        let document = parse_document(&two_discipline_document("y2"), ConfigFormat::Toml).unwrap();
        assemble_with(&document, &two_discipline_registry(), &ProgressReporter::new()).unwrap()
    };
    assert_eq!(problem.model.variables().len(), 3);
}

#[test]
fn discovered_components_join_the_builtins() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("modules/aero")).unwrap();
    fs::write(
        dir.path().join("modules/aero/polar.yaml"),
        r#"
component:
  - id: acme.aero.polar
    inputs: ["data:geometry:wing:area"]
    outputs: ["acme:polar:cd0"]
    option:
      - name: k_factor
        kind: float
        default: 1.0
        lower: 0.0
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("process.toml"),
        r#"
module_folders = ["modules"]
output_file = "out/results.xml"

[model.geometry]
id = "fastoad.geometry.legacy"

[model.polar]
id = "acme.aero.polar"
k_factor = 2

[optimization]
objective = { name = "acme:polar:cd0" }
"#,
    )
    .unwrap();

    let document = load_document(&dir.path().join("process.toml")).unwrap();
    let problem = assemble(&document, &ProgressReporter::new()).unwrap();

    let polar = problem.model.find("polar").and_then(|n| n.as_component()).unwrap();
    assert_eq!(polar.identifier, "acme.aero.polar");
    assert_eq!(problem.output_file, Some(dir.path().join("out/results.xml")));
    assert!(problem.driver.is_none());
}

#[test]
fn discovered_identifier_colliding_with_builtin_is_rejected() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("plugins")).unwrap();
    fs::write(
        dir.path().join("plugins/geometry.toml"),
        "[[component]]\nid = \"fastoad.geometry.legacy\"\n",
    )
    .unwrap();

    let mut document = parse_document("[model]\n", ConfigFormat::Toml).unwrap();
    document.module_folders = vec![PathBuf::from("plugins")];
    document.base_dir = Some(dir.path().to_path_buf());

    let err = assemble(&document, &ProgressReporter::new()).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::DuplicateIdentifier { ref existing, .. } if *existing == Origin::BuiltIn
    ));
}

#[test]
fn identifier_declared_in_two_module_folders_is_rejected() {
    let dir = tempdir().unwrap();
    for folder in ["first", "second"] {
        fs::create_dir(dir.path().join(folder)).unwrap();
        fs::write(
            dir.path().join(folder).join("x.toml"),
            "[[component]]\nid = \"acme.x\"\n",
        )
        .unwrap();
    }

    let mut registry = ComponentRegistry::with_builtins().unwrap();
    let before = registry.len();
    let err = registry
        .discover(
            &[PathBuf::from("first"), PathBuf::from("second")],
            Some(dir.path()),
        )
        .unwrap_err();

    match err {
        AssemblyError::DuplicateIdentifier {
            identifier,
            existing: Origin::Discovered { manifest: existing },
            incoming: Origin::Discovered { manifest: incoming },
        } => {
            assert_eq!(identifier, "acme.x");
            assert!(existing.starts_with(dir.path().join("first")));
            assert!(incoming.starts_with(dir.path().join("second")));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(registry.len(), before);
    assert!(!registry.contains("acme.x"));
}

#[test]
fn failed_discovery_leaves_registry_untouched() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("good")).unwrap();
    fs::write(
        dir.path().join("good/extra.toml"),
        "[[component]]\nid = \"acme.extra\"\n",
    )
    .unwrap();

    let mut registry = ComponentRegistry::with_builtins().unwrap();
    let before = registry.identifiers().len();
    let err = registry
        .discover(
            &[PathBuf::from("good"), PathBuf::from("missing")],
            Some(dir.path()),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DiscoveryError);
    assert_eq!(registry.identifiers().len(), before);
    assert!(!registry.contains("acme.extra"));
}

#[test]
fn empty_model_is_a_legal_problem() {
    let document = parse_document("model: {}\n", ConfigFormat::Yaml).unwrap();
    assert_eq!(document.model, ConfigurationNode::empty_group());
    let problem = assemble(&document, &ProgressReporter::new()).unwrap();
    assert_eq!(problem.model.node_count(), 1);
    assert!(problem.optimization.is_none());
}
