//! depcheck - Helm chart dependency compatibility checker library
//!
//! This library provides the core functionality for checking that the
//! dependencies a chart declares in `dependencies.yaml` are deployed:
//! - Declaration loading and validation
//! - Semantic version constraint evaluation
//! - Namespace filtering and release resolution
//! - Report aggregation and output formatting

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod constraint;
pub mod declaration;
pub mod directory;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod namespace;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod resolve;
