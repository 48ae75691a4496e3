//! Dependency declaration loading and validation
//!
//! This module provides functionality to:
//! - Read `dependencies.yaml` from a chart directory
//! - Parse and structurally validate the declared dependencies
//! - Read chart metadata from `Chart.yaml`

mod chart;

pub use chart::{read_chart_info, validate_chart_path, CHART_FILE};

use crate::constraint::VersionConstraint;
use crate::domain::{Declaration, Dependency};
use crate::error::DeclarationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the declaration file inside a chart directory
pub const DECLARATION_FILE: &str = "dependencies.yaml";

#[derive(Debug, Deserialize)]
struct RawDeclaration {
    #[serde(default)]
    dependencies: Option<Vec<RawDependency>>,
}

/// Plain scalars are read as their source text, so `version: 6.10` stays
/// `"6.10"` instead of becoming the float `6.1`
#[derive(Debug, Deserialize)]
struct RawDependency {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "constraint")]
    version: Option<String>,
}

fn has_content(content: &str) -> bool {
    content.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#') && line != "---"
    })
}

/// 1-based line numbers of the items of the `dependencies` list
fn item_lines(content: &str) -> Vec<usize> {
    let mut lines = Vec::new();
    let mut in_list = false;
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("dependencies:") && !line.starts_with(char::is_whitespace) {
            in_list = true;
            continue;
        }
        if !in_list || trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with('-') {
            lines.push(index + 1);
        } else if !line.starts_with(char::is_whitespace) {
            in_list = false;
        }
    }
    lines
}

/// Parse and validate a dependency declaration
///
/// `None` means no declaration file exists. Blank, comment-only or
/// `dependencies`-less documents are valid empty declarations. Validation
/// stops at the first problem.
pub fn parse_declaration(
    content: Option<&str>,
    file: &Path,
) -> Result<Declaration, DeclarationError> {
    let content = match content {
        Some(content) if has_content(content) => content,
        _ => return Ok(Declaration::empty()),
    };

    let raw: RawDeclaration = serde_yaml::from_str(content).map_err(|e| {
        let line = e.location().map(|loc| loc.line());
        DeclarationError::malformed(file, line, e.to_string())
    })?;

    let entries = raw.dependencies.unwrap_or_default();
    let lines = item_lines(content);
    let line_of = |index: usize| lines.get(index).copied().unwrap_or(index + 2);

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut dependencies = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let line = line_of(index);
        let name = entry.name.clone().unwrap_or_default();
        if name.trim().is_empty() {
            return Err(DeclarationError::EmptyName {
                file: file.to_path_buf(),
                line,
            });
        }

        let raw_constraint = entry.version.as_deref().unwrap_or_default().trim().to_string();
        if raw_constraint.is_empty() {
            return Err(DeclarationError::EmptyConstraint {
                file: file.to_path_buf(),
                line,
                name,
            });
        }

        if let Some(&first_line) = seen.get(&name) {
            return Err(DeclarationError::DuplicateName {
                file: file.to_path_buf(),
                line,
                first_line,
                name,
            });
        }

        let constraint = VersionConstraint::parse(&raw_constraint).map_err(|source| {
            DeclarationError::InvalidConstraint {
                file: file.to_path_buf(),
                line,
                name: name.clone(),
                constraint: raw_constraint.clone(),
                source,
            }
        })?;

        seen.insert(name.clone(), line);
        dependencies.push(Dependency::new(name, constraint));
    }

    Ok(Declaration::from_validated(dependencies))
}

/// Path of the declaration file for a chart directory
pub fn declaration_path(chart_dir: &Path) -> PathBuf {
    chart_dir.join(DECLARATION_FILE)
}

/// Read and validate the declaration of a chart directory
///
/// A missing `dependencies.yaml` yields an empty declaration.
pub fn load_declaration(chart_dir: &Path) -> Result<Declaration, DeclarationError> {
    let file = declaration_path(chart_dir);
    match std::fs::read_to_string(&file) {
        Ok(content) => parse_declaration(Some(&content), &file),
        Err(e) if e.kind() == ErrorKind::NotFound => parse_declaration(None, &file),
        Err(source) => Err(DeclarationError::Unreadable { file, source }),
    }
}
