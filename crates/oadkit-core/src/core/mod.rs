//! # Core Module
//!
//! Stateless building blocks of the assembly layer.
//!
//! - **Configuration documents** ([`config`]) - The canonical in-memory schema and the
//!   TOML/YAML front ends that produce it
//! - **Call specifications** ([`callspec`]) - Declarative `kind(name=value, ...)` strings
//!   naming solvers and drivers
//! - **Components** ([`components`]) - The component contract, the built-in aircraft
//!   disciplines, manifest discovery and the registry tying identifiers to factories
//! - **Errors** ([`error`]) - The single error taxonomy shared by every assembly stage
//! - **Variable descriptions** ([`variables`]) - The human-readable side file used for
//!   reporting only

pub mod callspec;
pub mod components;
pub mod config;
pub mod error;
pub mod variables;
