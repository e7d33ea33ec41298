use oadkit::core::config::{ConfigFormat, load_document, parse_document, sample_document};
use oadkit::engine::progress::{Progress, ProgressReporter};
use oadkit::workflows::assemble::assemble;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

#[test]
fn bundled_samples_are_equivalent_in_both_encodings() {
    let toml = parse_document(sample_document(ConfigFormat::Toml), ConfigFormat::Toml).unwrap();
    let yaml = parse_document(sample_document(ConfigFormat::Yaml), ConfigFormat::Yaml).unwrap();
    assert_eq!(toml, yaml);
}

#[test]
fn bundled_sample_assembles_with_builtins_only() {
    let ticks = AtomicUsize::new(0);
    let reporter = ProgressReporter::with_callback(Box::new(|event| {
        if event == Progress::TaskIncrement {
            ticks.fetch_add(1, Ordering::Relaxed);
        }
    }));

    let document = parse_document(sample_document(ConfigFormat::Toml), ConfigFormat::Toml).unwrap();
    let problem = assemble(&document, &reporter).unwrap();
    drop(reporter);

    assert_eq!(problem.model.node_count(), ticks.into_inner());
    assert_eq!(problem.model.components().len(), 10);
    let optimization = problem.optimization.unwrap();
    assert_eq!(optimization.design_variables.len(), 1);
    assert_eq!(optimization.objective.name, "data:mission:sizing:needed_block_fuel");
    assert_eq!(problem.driver.unwrap().kind(), "ScipyOptimizeDriver");
}

#[test]
fn samples_written_to_disk_load_back_identically() {
    let dir = tempdir().unwrap();
    let mut loaded = Vec::new();
    for format in [ConfigFormat::Toml, ConfigFormat::Yaml] {
        let path = dir.path().join(format!("process.{}", format.extension()));
        fs::write(&path, sample_document(format)).unwrap();
        loaded.push(load_document(&path).unwrap());
    }
    assert_eq!(loaded[0], loaded[1]);
    assert_eq!(loaded[0].base_dir.as_deref(), Some(dir.path()));
}
