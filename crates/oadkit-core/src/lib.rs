//! # OADKit Core Library
//!
//! Turns a declarative description of an aircraft design process into an assembled
//! multidisciplinary analysis and optimization (MDAO) problem, ready to be handed to an
//! external execution engine.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable configuration documents, the two
//!   structured-text front ends (TOML and YAML), the restricted call-spec grammar used for
//!   solver and driver specifications, and the component registry with its on-disk
//!   manifest discovery.
//!
//! - **[`engine`]: The Logic Core.** Builds the model tree from a configuration tree and a
//!   registry, binds the optimization setup onto the tree, and reports progress.
//!
//! - **[`workflows`]: The Public API.** Orchestrates discovery, tree building and binding
//!   into an [`workflows::assemble::AssembledProblem`].
//!
//! ```ignore
//! use oadkit::core::config::load_document;
//! use oadkit::engine::progress::ProgressReporter;
//! use oadkit::workflows::assemble;
//!
//! let document = load_document("oad_process.yml".as_ref())?;
//! let problem = assemble::assemble(&document, &ProgressReporter::new())?;
//! println!("{} variables", problem.model.variables().len());
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
