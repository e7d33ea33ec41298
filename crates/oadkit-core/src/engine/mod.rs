//! # Engine Module
//!
//! Turns configuration documents into model trees and validates optimization setups
//! against them.
//!
//! - **Model tree** ([`model`]) - Live component instances arranged in groups with their
//!   solver bindings, plus the solver catalog
//! - **Builder** ([`builder`]) - Depth-first construction of the model tree from the
//!   configuration tree and a component registry
//! - **Binder** ([`binder`]) - Resolution of design variables, constraints and the
//!   objective against the tree's variable namespace
//! - **Progress** ([`progress`]) - Callback-based progress reporting for long stages

pub mod binder;
pub mod builder;
pub mod model;
pub mod progress;
