//! # Workflows Module
//!
//! High-level entry points that take a parsed process description all the way to an
//! assembled problem.
//!
//! - **Assembly Workflow** ([`assemble`]) - Component discovery from the document's module
//!   folders, model tree construction, driver parsing and optimization binding, with
//!   progress reported per phase.
//!
//! A workflow either returns a complete [`assemble::AssembledProblem`] or the first error
//! any stage produced, untouched.

pub mod assemble;
