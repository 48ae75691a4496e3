//! Core domain models for depcheck
//!
//! This module contains the fundamental types used throughout the application:
//! - Declared dependencies and validated declarations
//! - Deployed release records
//! - Per-dependency outcomes and results
//! - Structured error taxonomy
//! - Check reports and summaries

mod dependency;
mod release;
mod report;
mod result;
mod structured_error;

pub use dependency::{Declaration, Dependency};
pub use release::{ChartInfo, Release, ReleaseStatus};
pub use report::{ChartReport, CheckReport, ResultSummary, RunReport};
pub use result::{Ambiguity, DependencyResult, Outcome};
pub use structured_error::{ErrorDetails, ErrorKind, StructuredError};
