//! YAML output formatter

use crate::domain::{ChartReport, ResultSummary, RunReport};
use crate::output::OutputFormatter;
use std::io::Write;

/// YAML formatter sharing the JSON document shape
#[derive(Debug, Default)]
pub struct YamlFormatter;

impl YamlFormatter {
    /// Create a new YAML formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for YamlFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let yaml = serde_yaml::to_string(report).map_err(std::io::Error::other)?;
        write!(writer, "{}", yaml)
    }

    fn format_summary(
        &self,
        summary: &ResultSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let yaml = serde_yaml::to_string(summary).map_err(std::io::Error::other)?;
        write!(writer, "{}", yaml)
    }

    fn format_chart(&self, chart: &ChartReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let yaml = serde_yaml::to_string(chart).map_err(std::io::Error::other)?;
        write!(writer, "{}", yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckReport, StructuredError};

    #[test]
    fn test_yaml_output() {
        let report = RunReport::new(vec![ChartReport::new(
            "charts/web",
            "web",
            CheckReport::aborted(StructuredError::directory(
                "",
                "failed to get matching namespaces: boom",
            )),
        )]);
        let mut output = Vec::new();
        YamlFormatter::new().format(&report, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed["success"], serde_yaml::Value::Bool(false));
        assert_eq!(
            parsed["chart_results"][0]["chart_name"].as_str(),
            Some("web")
        );
        assert_eq!(parsed["errors"][0]["type"].as_str(), Some("directory_error"));
    }

    #[test]
    fn test_yaml_summary() {
        let mut output = Vec::new();
        YamlFormatter::new()
            .format_summary(&ResultSummary::default(), &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("total: 0"));
    }
}
