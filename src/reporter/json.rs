//! JSON reporter for machine-readable output

use crate::analyzer::engine::AggregateStats;
use crate::GradeResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report a single grade result as JSON
    pub fn report(&self, result: &GradeResult) -> String {
        self.render(result, "{}")
    }

    /// Report multiple results as JSON array
    pub fn report_many(&self, results: &[GradeResult]) -> String {
        self.render(&results, "[]")
    }

    /// Results plus batch summary, stamped with the generation time
    pub fn report_with_summary(&self, results: &[GradeResult], stats: &AggregateStats) -> String {
        self.report_at(results, stats, Utc::now())
    }

    fn report_at(
        &self,
        results: &[GradeResult],
        stats: &AggregateStats,
        generated_at: DateTime<Utc>,
    ) -> String {
        let output = JsonOutput {
            generated_at: generated_at.to_rfc3339(),
            results,
            summary: stats,
        };
        self.render(&output, "{}")
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| {
            log::warn!("failed to serialize report: {}", e);
            fallback.to_string()
        })
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    generated_at: String,
    results: &'a [GradeResult],
    summary: &'a AggregateStats,
}
