use super::builtins;
use super::component::{Component, ComponentSchema, ConstructionError};
use super::discovery;
use crate::core::config::path::KeyPath;
use crate::core::error::AssemblyError;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const MAX_SUGGESTIONS: usize = 5;

/// Where a registration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    BuiltIn,
    Discovered { manifest: PathBuf },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::BuiltIn => f.write_str("built-in"),
            Origin::Discovered { manifest } => write!(f, "discovered in '{}'", manifest.display()),
        }
    }
}

/// Produces fresh component instances.
pub trait ComponentFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Component>, ConstructionError>;

    /// One-line summary shown when listing the registry.
    fn description(&self) -> &str {
        ""
    }
}

impl<F> ComponentFactory for F
where
    F: Fn() -> Result<Box<dyn Component>, ConstructionError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Component>, ConstructionError> {
        self()
    }
}

impl ComponentFactory for ComponentSchema {
    fn create(&self) -> Result<Box<dyn Component>, ConstructionError> {
        Ok(Box::new(self.instantiate()?))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Clone)]
pub struct Registration {
    pub identifier: String,
    pub factory: Arc<dyn ComponentFactory>,
    pub origin: Origin,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("identifier", &self.identifier)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Maps component identifiers to factories.
///
/// A registry is an ordinary value: each assembly builds or clones its own, so discovery
/// performed for one problem never leaks into another.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    registry: HashMap<String, Registration>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in disciplines.
    pub fn with_builtins() -> Result<Self, AssemblyError> {
        let mut registry = Self::new();
        registry.register_builtins(builtins::catalog())?;
        Ok(registry)
    }

    fn register_builtins(
        &mut self,
        catalog: impl IntoIterator<Item = ComponentSchema>,
    ) -> Result<(), AssemblyError> {
        for schema in catalog {
            let identifier = schema.identifier.clone();
            self.register(&identifier, Arc::new(schema), Origin::BuiltIn)?;
        }
        Ok(())
    }

    /// Adds a registration, refusing identifiers that are already present.
    pub fn register(
        &mut self,
        identifier: &str,
        factory: Arc<dyn ComponentFactory>,
        origin: Origin,
    ) -> Result<(), AssemblyError> {
        if let Some(existing) = self.registry.get(identifier) {
            return Err(AssemblyError::DuplicateIdentifier {
                identifier: identifier.to_string(),
                existing: existing.origin.clone(),
                incoming: origin,
            });
        }
        debug!("Registering component '{}' ({})", identifier, origin);
        self.registry.insert(
            identifier.to_string(),
            Registration {
                identifier: identifier.to_string(),
                factory,
                origin,
            },
        );
        Ok(())
    }

    /// Registers every component declared in manifests under `folders`, in order.
    ///
    /// Relative folders are resolved against `base_dir`. The pass is all-or-nothing: on
    /// any failure the registry is left exactly as it was.
    pub fn discover(&mut self, folders: &[PathBuf], base_dir: Option<&Path>) -> Result<usize, AssemblyError> {
        let mut staged = self.clone();
        let mut count = 0;
        for folder in folders {
            let resolved = match base_dir {
                Some(base) if folder.is_relative() => base.join(folder),
                _ => folder.clone(),
            };
            info!("Scanning module folder {:?}", resolved);
            for (manifest, schema) in discovery::scan_folder(folder, &resolved)? {
                let identifier = schema.identifier.clone();
                staged.register(&identifier, Arc::new(schema), Origin::Discovered { manifest })?;
                count += 1;
            }
        }
        *self = staged;
        Ok(count)
    }

    /// Looks up the factory for `identifier`.
    ///
    /// `path` locates the reference in the configuration and is only used for the error.
    pub fn resolve(&self, identifier: &str, path: &KeyPath) -> Result<Arc<dyn ComponentFactory>, AssemblyError> {
        self.registry
            .get(identifier)
            .map(|r| r.factory.clone())
            .ok_or_else(|| AssemblyError::UnknownComponent {
                identifier: identifier.to_string(),
                path: path.clone(),
                suggestions: self.suggestions_for(identifier),
            })
    }

    pub fn get(&self, identifier: &str) -> Option<&Registration> {
        self.registry.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registry.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.registry.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registrations sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        let mut entries: Vec<_> = self.registry.values().collect();
        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Near-matches for identifiers that are empty or clearly malformed.
    fn suggestions_for(&self, identifier: &str) -> Vec<String> {
        if !is_malformed(identifier) {
            return Vec::new();
        }
        let fragments = literal_fragments(identifier);
        self.identifiers()
            .into_iter()
            .filter(|id| fragments.iter().all(|fragment| id.contains(fragment.as_str())))
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect()
    }
}

fn is_malformed(identifier: &str) -> bool {
    identifier.trim().is_empty()
        || identifier.chars().any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '$' | '%'))
        || identifier.starts_with('.')
        || identifier.ends_with('.')
        || identifier.contains("..")
}

/// Dot-separated pieces of an identifier with templating placeholders removed.
fn literal_fragments(identifier: &str) -> Vec<String> {
    let mut literal = String::with_capacity(identifier.len());
    let mut depth = 0usize;
    for c in identifier.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '$' | '%' => {}
            _ if depth == 0 => literal.push(c),
            _ => {}
        }
    }
    literal
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
