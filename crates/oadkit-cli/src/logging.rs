use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
};

/// Targets whose events follow the requested verbosity. Everything else is capped at warnings.
const ASSEMBLY_TARGETS: [&str; 2] = ["oadkit", "oadkit_cli"];

/// Console level: `-q` silences it, each `-v` adds one level above warnings.
pub fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Log file level: at least debug, so a failed assembly can be traced after a quiet run.
pub fn file_level(verbosity: u8) -> LevelFilter {
    if verbosity >= 3 {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    }
}

fn assembly_targets(level: LevelFilter) -> Targets {
    ASSEMBLY_TARGETS
        .iter()
        .fold(Targets::new().with_default(level.min(LevelFilter::WARN)), |targets, target| {
            targets.with_target(*target, level)
        })
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(assembly_targets(console_level(verbosity, quiet)));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(assembly_targets(file_level(verbosity))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{Level, debug, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn console_level_follows_flags() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
        assert_eq!(console_level(3, true), LevelFilter::OFF);
    }

    #[test]
    fn file_level_never_drops_below_debug() {
        assert_eq!(file_level(0), LevelFilter::DEBUG);
        assert_eq!(file_level(2), LevelFilter::DEBUG);
        assert_eq!(file_level(3), LevelFilter::TRACE);
    }

    #[test]
    fn verbosity_applies_to_assembly_targets_only() {
        let targets = assembly_targets(LevelFilter::DEBUG);
        assert!(targets.would_enable("oadkit::workflows::assemble", &Level::DEBUG));
        assert!(targets.would_enable("oadkit_cli::commands::check", &Level::DEBUG));
        assert!(!targets.would_enable("walkdir", &Level::INFO));
        assert!(targets.would_enable("walkdir", &Level::WARN));

        let silent = assembly_targets(LevelFilter::OFF);
        assert!(!silent.would_enable("oadkit", &Level::ERROR));
        assert!(!silent.would_enable("walkdir", &Level::ERROR));
    }

    #[test]
    #[serial]
    fn global_logger_accepts_events() {
        ensure_global_logger_is_set();

        warn!("Optimization section present without a driver");
        info!("Scanning module folder");
        debug!("Registering component 'acme.x'");
        trace!("Building component at model.x");
    }

    #[test]
    #[serial]
    fn file_layer_records_debug_events() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("assembly.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_filter(assembly_targets(file_level(0)));
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!("Registering component 'acme.polar'");
            trace!("Not recorded at the default file level");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Registering component 'acme.polar'"));
        assert!(content.contains("DEBUG"));
        assert!(!content.contains("Not recorded"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_propagates_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(temp_dir.path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
