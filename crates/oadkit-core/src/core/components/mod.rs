//! Components and the registry that maps identifiers to their factories.
//!
//! A registry starts from the built-in catalog and can be extended by scanning module
//! folders for component manifests.

pub mod builtins;
pub mod component;
pub(crate) mod discovery;
pub mod registry;

pub use component::{
    Component, ComponentSchema, ConstructionError, DeclaredComponent, Direction, OptionError,
    OptionKind, OptionSchema, OptionValueError, VariableDeclaration,
};
pub use discovery::ManifestError;
pub use registry::{ComponentFactory, ComponentRegistry, Origin, Registration};
