//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying plans,
//! execution reports, and outcomes to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::planner::{ActionKind, Outcome, SyncPlan, SyncReport, TargetKind};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Outcome row for table display.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a sync plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &SyncPlan, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &SyncPlan, detailed: bool) -> String {
        if plan.is_empty() {
            return format!("{} No changes required - backup is up to date.\n", "✓".green());
        }

        let mut output = String::new();

        let _ = write!(
            output,
            "\nSync plan: {} -> {}\n\n",
            plan.source_root.display(),
            plan.backup_root.display()
        );

        if detailed {
            let rows: Vec<PlanActionRow> = plan
                .actions
                .iter()
                .enumerate()
                .map(|(i, a)| PlanActionRow {
                    index: i + 1,
                    action: Self::format_action_kind(a.kind),
                    target: a.target.to_string(),
                    path: a
                        .affected_path()
                        .map_or_else(String::new, |p| p.display().to_string()),
                })
                .collect();

            let table = Table::new(rows).to_string();
            output.push_str(&table);
            output.push('\n');
        }

        let _ = write!(
            output,
            "\nPlan: {} dirs to delete, {} dirs to create, {} files to delete, {} to update, {} to copy\n",
            plan.count(ActionKind::Delete, TargetKind::Directory)
                .to_string()
                .red(),
            plan.count(ActionKind::Create, TargetKind::Directory)
                .to_string()
                .green(),
            plan.count(ActionKind::Delete, TargetKind::File)
                .to_string()
                .red(),
            plan.count(ActionKind::Update, TargetKind::File)
                .to_string()
                .yellow(),
            plan.count(ActionKind::Copy, TargetKind::File)
                .to_string()
                .green(),
        );

        output
    }

    /// Formats an execution report for display.
    #[must_use]
    pub fn format_report(&self, report: &SyncReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &SyncReport) -> String {
        let mut output = String::new();

        let status = if report.failed > 0 {
            "failed".red().to_string()
        } else if report.deadline_reached || report.pending > 0 {
            "partial".yellow().to_string()
        } else {
            "complete".green().to_string()
        };

        let _ = write!(
            output,
            "\nSync {status}: {} succeeded, {} failed, {} pending of {} actions\n",
            report.succeeded, report.failed, report.pending, report.total
        );

        if report.deadline_reached {
            let _ = writeln!(
                output,
                "{} Deadline reached - rerun `treemirror apply` to continue.",
                "⚠".yellow()
            );
        }

        output
    }

    /// Formats per-action outcomes of a persisted plan for display.
    #[must_use]
    pub fn format_outcomes(&self, plan: &SyncPlan) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_outcomes_text(plan),
        }
    }

    /// Formats outcomes as a table.
    fn format_outcomes_text(plan: &SyncPlan) -> String {
        if plan.is_empty() {
            return String::from("Plan is empty.\n");
        }

        let mut output = String::new();

        let rows: Vec<OutcomeRow> = plan
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| OutcomeRow {
                index: i + 1,
                action: a.description(),
                outcome: Self::format_outcome(a.outcome),
                detail: Self::truncate(&a.message, 40),
            })
            .collect();

        let table = Table::new(rows).to_string();
        output.push_str(&table);
        output.push('\n');

        let _ = write!(
            output,
            "\n{} of {} actions still pending, {} failed\n",
            plan.pending_count(),
            plan.action_count(),
            plan.failure_count()
        );

        output
    }

    /// Formats an action kind with color.
    fn format_action_kind(kind: ActionKind) -> String {
        match kind {
            ActionKind::Create | ActionKind::Copy => kind.to_string().green().to_string(),
            ActionKind::Update => kind.to_string().yellow().to_string(),
            ActionKind::Delete => kind.to_string().red().to_string(),
        }
    }

    /// Formats an outcome with color.
    fn format_outcome(outcome: Outcome) -> String {
        match outcome {
            Outcome::Success => outcome.to_string().green().to_string(),
            Outcome::Failure => outcome.to_string().red().to_string(),
            Outcome::Unknown => outcome.to_string().yellow().to_string(),
        }
    }

    /// Truncates a string for table display.
    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() <= max {
            s.to_string()
        } else {
            let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
            format!("{truncated}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::planner::PlanAction;

    use super::*;

    fn sample_plan() -> SyncPlan {
        let mut plan = SyncPlan::new("/src", "/bak");
        plan.actions.push(PlanAction::create_directory("/bak/a"));
        plan.actions
            .push(PlanAction::copy_file("/src/a/f", "/bak/a/f"));
        plan
    }

    #[test]
    fn empty_plan_text_mentions_up_to_date() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let text = formatter.format_plan(&SyncPlan::new("/s", "/b"), false);
        assert!(text.contains("No changes required"));
    }

    #[test]
    fn detailed_plan_text_lists_actions() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let text = formatter.format_plan(&sample_plan(), true);
        assert!(text.contains("/bak/a/f"));
    }

    #[test]
    fn json_plan_is_parseable() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let json = formatter.format_plan(&sample_plan(), false);
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["actions"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert!(OutputFormatter::truncate(&"x".repeat(50), 10).ends_with("..."));
    }
}
