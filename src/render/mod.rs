//! Comment rendering.
//!
//! This module contains:
//! - Format: duration/number formatting helpers
//! - Templates: the canonical comment template strings
//! - The `{{placeholder}}` renderer and the per-lifecycle comment builders

pub mod format;
pub mod templates;

use std::collections::HashMap;

use crate::domain::{ModelCounts, RunStatus};

pub use format::{format_duration, format_number, DurationFormat};

/// Substitute every `{{key}}` in `template` with its mapped value.
/// Placeholders without a mapping are left verbatim, which keeps a missing
/// variable visible in the output instead of silently dropping text.
pub fn render(template: &str, variables: &HashMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in variables {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

/// Subdomain for deep links into the Montara app.
fn montara_prefix(is_staging: bool) -> String {
    if is_staging { "staging" } else { "app" }.to_string()
}

/// Values common to every comment that links back to the run page.
#[derive(Debug, Clone)]
pub struct RunLink {
    pub is_staging: bool,
    pub run_id: String,
    pub pipeline_id: String,
}

impl RunLink {
    fn variables(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("montara_prefix", montara_prefix(self.is_staging)),
            ("run_id", self.run_id.clone()),
            ("pipeline_id", self.pipeline_id.clone()),
        ])
    }
}

/// Build the one-time Pending comment.
pub fn build_pending_comment() -> String {
    templates::PIPELINE_RUN_PENDING.to_string()
}

/// Build the one-time Started comment.
pub fn build_started_comment(link: &RunLink) -> String {
    render(templates::PIPELINE_RUN_STARTED, &link.variables())
}

/// Everything the Result comment needs.
#[derive(Debug, Clone)]
pub struct ResultComment {
    pub link: RunLink,
    pub status: RunStatus,
    pub counts: ModelCounts,
    pub run_duration: String,
    /// First general error message, rendered only for cancellations.
    pub error_message: Option<String>,
}

/// Build the terminal Result comment. The details link is appended for
/// Completed and Failed runs; a cancelled run has no run page to show.
pub fn build_result_comment(params: &ResultComment) -> String {
    let (icon, status_text) = status_presentation(params.status, params.error_message.as_deref());

    let mut variables = params.link.variables();
    variables.insert("status_icon", icon.to_string());
    variables.insert("status_text", status_text);
    variables.insert("run_duration", params.run_duration.clone());
    variables.insert("num_models", format_number(params.counts.total));
    variables.insert("num_passed", format_number(params.counts.passed));
    variables.insert("num_failed", format_number(params.counts.failed));
    variables.insert("num_skipped", format_number(params.counts.skipped));

    let mut body = render(templates::PIPELINE_RUN_RESULT, &variables);
    if matches!(params.status, RunStatus::Completed | RunStatus::Failed) {
        body.push('\n');
        body.push_str(&render(templates::VIEW_FULL_RUN_DETAILS, &variables));
        body.push('\n');
    }
    body
}

fn status_presentation(status: RunStatus, error_message: Option<&str>) -> (&'static str, String) {
    match status {
        RunStatus::Completed => ("white_check_mark", "completed successfully".to_string()),
        RunStatus::Failed => ("x", "failed".to_string()),
        RunStatus::Cancelled => {
            let text = match error_message {
                Some(message) => format!("canceled - {}", message),
                None => "canceled".to_string(),
            };
            ("warning", text)
        }
        _ => ("x", "unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> RunLink {
        RunLink {
            is_staging: false,
            run_id: "run-42".to_string(),
            pipeline_id: "pipe-7".to_string(),
        }
    }

    fn result(status: RunStatus) -> ResultComment {
        ResultComment {
            link: link(),
            status,
            counts: ModelCounts {
                total: 3,
                passed: 1,
                failed: 1,
                skipped: 1,
            },
            run_duration: "1 Min.".to_string(),
            error_message: None,
        }
    }

    #[test]
    fn test_render_substitutes_and_keeps_unmatched() {
        let vars = HashMap::from([("name", "world".to_string())]);
        assert_eq!(render("hello {{name}}", &vars), "hello world");
        assert_eq!(render("hello {{other}}", &vars), "hello {{other}}");
    }

    #[test]
    fn test_result_comment_has_no_leftover_placeholders() {
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Unknown,
        ] {
            let body = build_result_comment(&result(status));
            assert!(
                !body.contains("{{"),
                "unfilled placeholder for {:?}: {}",
                status,
                body
            );
        }
    }

    #[test]
    fn test_result_comment_is_deterministic() {
        let params = result(RunStatus::Completed);
        assert_eq!(build_result_comment(&params), build_result_comment(&params));
    }

    #[test]
    fn test_details_link_only_for_completed_and_failed() {
        assert!(build_result_comment(&result(RunStatus::Completed))
            .contains("View full run details"));
        assert!(build_result_comment(&result(RunStatus::Failed))
            .contains("View full run details"));
        assert!(!build_result_comment(&result(RunStatus::Cancelled))
            .contains("View full run details"));
    }

    #[test]
    fn test_status_text_mapping() {
        let completed = build_result_comment(&result(RunStatus::Completed));
        assert!(completed.contains(":white_check_mark: test run completed successfully"));

        let failed = build_result_comment(&result(RunStatus::Failed));
        assert!(failed.contains(":x: test run failed"));

        let mut cancelled = result(RunStatus::Cancelled);
        cancelled.error_message = Some("no models to run".to_string());
        let body = build_result_comment(&cancelled);
        assert!(body.contains(":warning: test run canceled - no models to run"));

        let unknown = build_result_comment(&result(RunStatus::Unknown));
        assert!(unknown.contains(":x: test run unknown"));
    }

    #[test]
    fn test_counts_are_grouped() {
        let mut params = result(RunStatus::Completed);
        params.counts.total = 1234;
        params.counts.passed = 1200;
        let body = build_result_comment(&params);
        assert!(body.contains("Models (1,234)"));
        assert!(body.contains("Passed - 1,200"));
    }

    #[test]
    fn test_started_comment_links_to_run() {
        let body = build_started_comment(&link());
        assert!(!body.contains("{{"));
        assert!(body.contains("https://app.montara.io/app/pipelines/pipe-7?openModalRunId=run-42"));

        let staging = RunLink {
            is_staging: true,
            ..link()
        };
        assert!(build_started_comment(&staging).contains("https://staging.montara.io"));
    }

    #[test]
    fn test_pending_comment_is_static() {
        let body = build_pending_comment();
        assert!(!body.contains("{{"));
        assert!(body.contains("pending"));
    }
}
