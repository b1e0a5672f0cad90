use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::cli::driver::{QueryOutcome, RunSummary};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// One line for an ad-hoc `check`.
    pub fn format_check(&self, outcome: &QueryOutcome) -> String {
        let verdict = if outcome.related {
            self.paint_ok("related")
        } else {
            self.paint_err("unrelated")
        };
        let mut line = format!("{} -> {}: {}", outcome.source, outcome.target, verdict);
        if let Some(substitution) = &outcome.substitution {
            line.push_str(" as ");
            line.push_str(&self.paint_type(substitution));
        }
        line.push_str(&self.format_flags(outcome));
        line
    }

    /// One line per query followed by a totals line.
    pub fn format_run(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        for outcome in &summary.outcomes {
            out.push_str(&self.format_outcome(outcome));
            out.push('\n');
        }

        let total = summary.outcomes.len();
        let failures = summary.failures();
        let totals = format!(
            "{} passed, {} failed ({} cached verdicts)",
            total - failures,
            failures,
            summary.cache_entries
        );
        if failures == 0 {
            out.push_str(&self.paint_ok(&totals));
        } else {
            out.push_str(&self.paint_err(&totals));
        }
        out
    }

    pub fn format_outcome(&self, outcome: &QueryOutcome) -> String {
        let status = if outcome.passed {
            self.paint_ok("PASS")
        } else {
            self.paint_err("FAIL")
        };
        let result = match &outcome.substitution {
            Some(substitution) => self.paint_type(substitution),
            None => "no substitution".to_string(),
        };
        let mut line = format!(
            "{status} {} -> {}: {result}",
            outcome.source, outcome.target
        );
        if !outcome.passed {
            line.push_str(&format!(" (expected {})", describe_expectation(outcome)));
        }
        line.push_str(&self.format_flags(outcome));
        line
    }

    fn format_flags(&self, outcome: &QueryOutcome) -> String {
        if outcome.depth_exceeded {
            format!(" [{}]", self.paint_warn("depth limit reached"))
        } else {
            String::new()
        }
    }

    fn paint_ok(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_err(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_type(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }
}

fn describe_expectation(outcome: &QueryOutcome) -> String {
    match (&outcome.expected_substitution, outcome.expected) {
        (Some(substitution), _) => substitution.clone(),
        (None, Some(false)) => "no substitution".to_string(),
        (None, _) => "a substitution".to_string(),
    }
}

/// Pretty JSON for `--json`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize report")
}
