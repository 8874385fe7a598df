//! Run configuration resolved from action inputs.
//!
//! Inputs arrive as strings through the workflow environment, so parsing
//! mirrors the action contract: booleans are the literal string `true`,
//! a missing or unparsable retry count falls back to the default, and the
//! optional dbt variables must be a flat string-to-string JSON object.

use std::collections::BTreeMap;

use crate::error::RunError;

pub const DEFAULT_NUM_RETRIES: u32 = 60;

/// Raw input strings, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub webhook_url: Option<String>,
    pub fallback_schema: Option<String>,
    pub is_staging: Option<String>,
    pub is_smart_run: Option<String>,
    pub allow_concurrent_pipeline_runs: Option<String>,
    pub full_refresh: Option<String>,
    pub num_retries: Option<String>,
    pub variables: Option<String>,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub webhook_url: String,
    pub fallback_schema: String,
    pub is_staging: bool,
    pub is_smart_run: bool,
    pub allow_concurrent_pipeline_runs: bool,
    pub full_refresh: Option<bool>,
    pub num_retries: u32,
    pub variables: Option<BTreeMap<String, String>>,
}

impl RunConfig {
    /// Validate raw inputs. Fails before any network call is made.
    pub fn resolve(inputs: RawInputs) -> Result<Self, RunError> {
        let webhook_url = inputs
            .webhook_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| RunError::Configuration("webhookUrl input is required".to_string()))?;

        let variables = match inputs.variables.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_variables(raw)?),
        };

        Ok(Self {
            webhook_url,
            fallback_schema: inputs.fallback_schema.unwrap_or_default(),
            is_staging: flag(inputs.is_staging.as_deref(), false),
            is_smart_run: flag(inputs.is_smart_run.as_deref(), true),
            allow_concurrent_pipeline_runs: flag(
                inputs.allow_concurrent_pipeline_runs.as_deref(),
                true,
            ),
            full_refresh: inputs
                .full_refresh
                .as_deref()
                .map(|v| v.trim() == "true"),
            num_retries: retries(inputs.num_retries.as_deref()),
            variables,
        })
    }
}

fn flag(input: Option<&str>, default: bool) -> bool {
    match input.map(str::trim) {
        None | Some("") => default,
        Some(value) => value == "true",
    }
}

fn retries(input: Option<&str>) -> u32 {
    input
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_NUM_RETRIES)
}

/// Parse the `variables` input: must be a flat JSON object with string
/// values. Anything else is a hard configuration failure.
pub fn parse_variables(raw: &str) -> Result<BTreeMap<String, String>, RunError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| RunError::Configuration(format!("variables input is not valid JSON: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        RunError::Configuration("variables input must be a JSON object".to_string())
    })?;

    let mut variables = BTreeMap::new();
    for (key, value) in object {
        let value = value.as_str().ok_or_else(|| {
            RunError::Configuration(format!(
                "variables input must map strings to strings, but '{}' is not a string",
                key
            ))
        })?;
        variables.insert(key.clone(), value.to_string());
    }
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> RawInputs {
        RawInputs {
            webhook_url: Some("https://hooks.montara.io/webhook/abc".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::resolve(minimal()).unwrap();
        assert!(!config.is_staging);
        assert!(config.is_smart_run);
        assert!(config.allow_concurrent_pipeline_runs);
        assert_eq!(config.full_refresh, None);
        assert_eq!(config.num_retries, 60);
        assert_eq!(config.fallback_schema, "");
        assert!(config.variables.is_none());
    }

    #[test]
    fn test_webhook_url_is_required() {
        let err = RunConfig::resolve(RawInputs::default()).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));

        let err = RunConfig::resolve(RawInputs {
            webhook_url: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
    }

    #[test]
    fn test_boolean_inputs_are_literal_true() {
        let config = RunConfig::resolve(RawInputs {
            is_staging: Some("true".to_string()),
            is_smart_run: Some("false".to_string()),
            allow_concurrent_pipeline_runs: Some("no".to_string()),
            full_refresh: Some("true".to_string()),
            ..minimal()
        })
        .unwrap();
        assert!(config.is_staging);
        assert!(!config.is_smart_run);
        assert!(!config.allow_concurrent_pipeline_runs);
        assert_eq!(config.full_refresh, Some(true));
    }

    #[test]
    fn test_num_retries_fallback() {
        for raw in [None, Some("0"), Some("not-a-number"), Some("")] {
            assert_eq!(retries(raw), DEFAULT_NUM_RETRIES, "input: {:?}", raw);
        }
        assert_eq!(retries(Some("5")), 5);
    }

    #[test]
    fn test_variables_flat_map() {
        let vars = parse_variables(r#"{"env": "ci", "schema": "pr_17"}"#).unwrap();
        assert_eq!(vars.get("env").map(String::as_str), Some("ci"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_variables_rejects_malformed_json() {
        let err = parse_variables("{not json").unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
    }

    #[test]
    fn test_variables_rejects_non_flat_values() {
        let err = parse_variables(r#"{"nested": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));

        let err = parse_variables(r#"{"count": 3}"#).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));

        let err = parse_variables(r#"["a", "b"]"#).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
    }
}
