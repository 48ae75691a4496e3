//! Chart directory discovery
//!
//! Each argument is either a literal chart directory or a glob pattern such as
//! `charts/*`. Glob matches are limited to directories.

use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::PathBuf;

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand chart arguments into directories, keeping argument order
///
/// Literal paths are passed through unchecked so an invalid chart is reported
/// on that chart. Duplicates are dropped.
pub fn expand_chart_paths(patterns: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut seen = HashSet::new();
    let mut charts = Vec::new();

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        let matches = if is_glob(pattern) {
            let entries = glob::glob(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            let mut dirs: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .filter(|path| path.is_dir())
                .collect();
            if dirs.is_empty() {
                return Err(ConfigError::no_charts_matched(pattern));
            }
            dirs.sort();
            dirs
        } else {
            vec![PathBuf::from(pattern)]
        };

        for path in matches {
            if seen.insert(path.clone()) {
                charts.push(path);
            }
        }
    }

    if charts.is_empty() {
        return Err(ConfigError::NoChartPaths);
    }
    Ok(charts)
}
