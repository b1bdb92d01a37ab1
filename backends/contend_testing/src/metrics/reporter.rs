//! Side-by-side report of several strategy runs.

use std::fmt;

use super::RunMetrics;
use crate::counter::Strategy;
use crate::harness::CounterReport;

/// One line of a [`ComparisonReport`].
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub strategy: Strategy,
    pub final_value: u64,
    pub expected: u64,
    pub lost_updates: u64,
    pub failures: usize,
    pub metrics: RunMetrics,
}

impl ComparisonRow {
    #[must_use]
    pub fn from_report(report: &CounterReport) -> Self {
        Self {
            strategy: report.strategy,
            final_value: report.final_value,
            expected: report.expected(),
            lost_updates: report.lost_updates(),
            failures: report.failures.len(),
            metrics: RunMetrics::from_report(report),
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.failures == 0 && self.final_value == self.expected
    }
}

/// Renders a set of runs as a table, one strategy per line.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    title: String,
    rows: Vec<ComparisonRow>,
}

impl ComparisonReport {
    #[must_use]
    pub fn new(title: impl Into<String>, reports: &[CounterReport]) -> Self {
        Self {
            title: title.into(),
            rows: reports.iter().map(ComparisonRow::from_report).collect(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Strategies whose final value came out wrong.
    pub fn incorrect(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.rows
            .iter()
            .filter(|row| !row.is_correct())
            .map(|row| row.strategy)
    }

    #[must_use]
    pub fn to_string_pretty(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!("=== {} ===\n", self.title));
        report.push_str(&format!(
            "{:<16} {:>12} {:>12} {:>8} {:>9} {:>14}\n",
            "strategy", "final", "expected", "lost", "failures", "ops/sec"
        ));
        for row in &self.rows {
            report.push_str(&format!(
                "{:<16} {:>12} {:>12} {:>8} {:>9} {:>14.0}\n",
                row.strategy.name(),
                row.final_value,
                row.expected,
                row.lost_updates,
                row.failures,
                row.metrics.throughput
            ));
        }

        report
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_pretty())
    }
}
