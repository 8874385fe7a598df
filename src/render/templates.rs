//! Canonical comment templates.
//!
//! Placeholder names are snake_case everywhere; the renderer and these
//! strings are tested together so a renamed placeholder fails the suite
//! instead of leaking `{{...}}` into a pull request.

/// Appended to the Started comment and to Completed/Failed results.
pub const VIEW_FULL_RUN_DETAILS: &str = "[View full run details in Montara](https://{{montara_prefix}}.montara.io/app/pipelines/{{pipeline_id}}?openModalRunId={{run_id}})";

/// Posted once, when the run is first seen queued behind other work.
pub const PIPELINE_RUN_PENDING: &str = "\
# Montara CI
☑️ Set up a test environment for pipeline run
⏳ Test run is pending
";

/// Posted once, when the run is first seen executing.
pub const PIPELINE_RUN_STARTED: &str = "\
# Montara CI
☑️ Set up a test environment for pipeline run
☑️ Test run started

[View full run details in Montara](https://{{montara_prefix}}.montara.io/app/pipelines/{{pipeline_id}}?openModalRunId={{run_id}})
";

/// Posted at every terminal status. The details link is appended
/// separately, only for statuses where the run page has something to show.
pub const PIPELINE_RUN_RESULT: &str = "\
# Montara CI report
☑️ Set up a test environment for pipeline run
☑️ Test run executed

:{{status_icon}}: test run {{status_text}}

## Run details

### Run duration
{{run_duration}}

### Models ({{num_models}})
- ✅  Passed - {{num_passed}}
- ❌  Failed - {{num_failed}}
- ⏸️  Skipped - {{num_skipped}}
";
