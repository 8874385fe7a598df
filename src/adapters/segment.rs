//! Segment telemetry sink.
//!
//! Each process generates one anonymous id at startup and tags every
//! event with it. Delivery is best-effort: a failed track call is logged
//! at debug level and never affects the run.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::{CiEvent, EventSink};

const SEGMENT_API_BASE: &str = "https://api.segment.io";
const SEGMENT_WRITE_KEY: &str = "R2YDLufDCtD99o9cAYwwxXeOKgu1wEkh";

/// Sink that delivers events to the Segment HTTP tracking API.
pub struct SegmentSink {
    http: reqwest::Client,
    api_base: String,
    write_key: String,
    anonymous_id: Uuid,
}

impl Default for SegmentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSink {
    pub fn new() -> Self {
        Self::with_api_base(SEGMENT_API_BASE.to_string(), SEGMENT_WRITE_KEY.to_string())
    }

    /// Point the sink at a different host (tests).
    pub fn with_api_base(api_base: String, write_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            write_key,
            anonymous_id: Uuid::new_v4(),
        }
    }

    pub fn anonymous_id(&self) -> Uuid {
        self.anonymous_id
    }
}

#[async_trait]
impl EventSink for SegmentSink {
    async fn track(&self, event: CiEvent, properties: HashMap<String, String>) {
        let body = serde_json::json!({
            "event": event.name(),
            "anonymousId": self.anonymous_id,
            "properties": properties,
            "timestamp": Utc::now(),
        });

        let result = self
            .http
            .post(format!("{}/v1/track", self.api_base))
            .basic_auth(&self.write_key, Some(""))
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(event = event.name(), "Telemetry event delivered");
            }
            Ok(response) => {
                debug!(event = event.name(), status = %response.status(), "Telemetry event rejected");
            }
            Err(e) => {
                debug!(event = event.name(), error = %e, "Telemetry delivery failed");
            }
        }
    }
}

/// Sink that drops everything. Used in tests and when telemetry is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl EventSink for NoopSink {
    async fn track(&self, _event: CiEvent, _properties: HashMap<String, String>) {}
}
