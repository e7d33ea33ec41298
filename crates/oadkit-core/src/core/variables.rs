use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// File name looked up in module folders.
pub const DESCRIPTION_FILE_NAME: &str = "variable_descriptions.txt";

const SEPARATOR: &str = "||";

#[derive(Debug, Error)]
pub enum DescriptionLoadError {
    #[error("Failed to read variable descriptions from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Syntax error in '{path}' at line {line}: {message}")]
    Syntax {
        path: String,
        line: usize,
        message: String,
    },
}

/// Human-readable descriptions of variables, keyed by variable name.
///
/// The side file format is one `name || description` pair per line. Blank lines and lines
/// starting with `#` are ignored. Descriptions are used for reporting only and never take
/// part in validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableDescriptions {
    entries: BTreeMap<String, String>,
}

impl VariableDescriptions {
    pub fn parse(text: &str) -> Result<Self, DescriptionLoadError> {
        Self::parse_named(text, "<string>")
    }

    pub fn load(path: &Path) -> Result<Self, DescriptionLoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| DescriptionLoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_named(&text, &path.display().to_string())
    }

    /// Merges every description file found below the given module folders, in order.
    ///
    /// Later files override earlier ones. Folders that do not exist are skipped.
    pub fn from_folders(folders: &[PathBuf], base_dir: Option<&Path>) -> Result<Self, DescriptionLoadError> {
        let mut merged = Self::default();
        for folder in folders {
            let resolved = match base_dir {
                Some(base) if folder.is_relative() => base.join(folder),
                _ => folder.clone(),
            };
            if !resolved.is_dir() {
                continue;
            }
            let mut files: Vec<PathBuf> = WalkDir::new(&resolved)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file() && e.file_name() == DESCRIPTION_FILE_NAME)
                .map(|e| e.into_path())
                .collect();
            files.sort();
            for file in files {
                debug!("Loading variable descriptions from {:?}", file);
                merged.extend(Self::load(&file)?);
            }
        }
        Ok(merged)
    }

    fn parse_named(text: &str, source_name: &str) -> Result<Self, DescriptionLoadError> {
        let mut entries = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, description) =
                line.split_once(SEPARATOR)
                    .ok_or_else(|| DescriptionLoadError::Syntax {
                        path: source_name.to_string(),
                        line: index + 1,
                        message: format!("expected 'name {SEPARATOR} description'"),
                    })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(DescriptionLoadError::Syntax {
                    path: source_name.to_string(),
                    line: index + 1,
                    message: "missing variable name".to_string(),
                });
            }
            entries.insert(name.to_string(), description.trim().to_string());
        }
        Ok(Self { entries })
    }

    /// Adds the entries of `other`, replacing descriptions for names already present.
    pub fn extend(&mut self, other: VariableDescriptions) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
