use oadkit::core::error::AssemblyError;
use oadkit::core::variables::DescriptionLoadError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Descriptions(#[from] DescriptionLoadError),

    #[error("Refusing to overwrite '{path}' (use --force to replace it)", path = path.display())]
    FileExists { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// The one-line form printed before exiting.
    ///
    /// Assembly failures are prefixed with their kind and location so scripts can match on
    /// them: `error[UnknownVariable] at y3: ...`.
    pub fn render(&self) -> String {
        match self {
            CliError::Assembly(e) => {
                let mut line = format!("error[{}] at {}: {}", e.kind(), e.location(), e);
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    line.push_str(&format!("\n  caused by: {cause}"));
                    source = cause.source();
                }
                line
            }
            other => format!("error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oadkit::core::components::ManifestError;
    use oadkit::core::error::VariableRole;

    #[test]
    fn assembly_errors_render_kind_and_location() {
        let err = CliError::from(AssemblyError::UnknownVariable {
            name: "y3".to_string(),
            role: VariableRole::Objective,
        });
        let rendered = err.render();
        assert!(rendered.starts_with("error[UnknownVariable] at y3: "));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn other_errors_render_plainly() {
        let err = CliError::FileExists {
            path: PathBuf::from("process.toml"),
        };
        assert_eq!(
            err.render(),
            "error: Refusing to overwrite 'process.toml' (use --force to replace it)"
        );
    }

    #[test]
    fn discovery_failures_render_their_causes() {
        let err = CliError::from(AssemblyError::Discovery {
            folder: PathBuf::from("./plugins"),
            source: ManifestError::NotADirectory {
                path: "/work/plugins".to_string(),
            },
        });
        let rendered = err.render();
        assert!(rendered.starts_with("error[DiscoveryError] at ./plugins: "));
        assert!(rendered.contains("\n  caused by: '/work/plugins' is not a directory"));
    }
}
