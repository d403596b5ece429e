//! Current-time lookup tool.
//!
//! Queries the time-lookup service (worldtimeapi.org) by IANA timezone
//! identifier. Every failure mode — HTTP error, network failure, unknown
//! timezone — is translated into a structured `{"error": ...}` payload
//! string; the orchestrator always receives a result, never an exception,
//! from a running call.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use ragline_core::error::ToolError;
use ragline_core::tool::{Tool, ToolResult};

/// Timezones offered to the model via the schema enum.
const KNOWN_TIMEZONES: &[&str] = &[
    "Asia/Seoul",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Asia/Dubai",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Europe/Moscow",
    "America/New_York",
    "America/Chicago",
    "America/Vancouver",
    "America/Sao_Paulo",
    "Australia/Sydney",
    "Pacific/Auckland",
    "Asia/Kolkata",
    "Asia/Bangkok",
    "Africa/Johannesburg",
    "Pacific/Honolulu",
];

/// Arguments decoded from the model's tool call.
#[derive(Debug, Deserialize)]
struct TimeArgs {
    timezone: String,
}

/// Fields we keep from the time service response.
#[derive(Debug, Deserialize)]
struct TimeApiResponse {
    timezone: String,
    datetime: String,
    utc_offset: String,
}

pub struct CurrentTimeTool {
    http: reqwest::Client,
    base_url: String,
}

impl CurrentTimeTool {
    /// Create the tool with its own bounded-timeout HTTP client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "current_time".into(),
                reason: format!("HTTP client build failed: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current real-time for a specific timezone. Use this when the user asks for \
         'now', 'current time', office hours, or whether someone can be contacted right now."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "The IANA timezone identifier to get the current time for, e.g., 'Asia/Seoul'.",
                    "enum": KNOWN_TIMEZONES,
                }
            },
            "required": ["timezone"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TimeArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("current_time: {e}")))?;

        let url = format!("{}/{}", self.base_url, args.timezone);
        debug!(timezone = %args.timezone, "Fetching current time");

        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(ToolResult::error("", format!("Failed to fetch time: {e}")));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolResult::error(
                "",
                format!("Timezone '{}' not found.", args.timezone),
            ));
        }

        let parsed: TimeApiResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return Ok(ToolResult::error("", format!("Failed to fetch time: {e}")));
            }
        };

        let payload = serde_json::json!({
            "timezone": parsed.timezone,
            "datetime": parsed.datetime,
            "utc_offset": parsed.utc_offset,
        });

        Ok(ToolResult::ok("", payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> CurrentTimeTool {
        CurrentTimeTool::new("https://worldtimeapi.org/api/timezone", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn tool_definition() {
        let tool = tool();
        let def = tool.to_definition();
        assert_eq!(def.name, "current_time");
        assert_eq!(def.parameters["required"], serde_json::json!(["timezone"]));
        let enum_values = def.parameters["properties"]["timezone"]["enum"]
            .as_array()
            .unwrap();
        assert!(enum_values.contains(&serde_json::json!("Asia/Seoul")));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let tool =
            CurrentTimeTool::new("http://localhost:1234/tz/", Duration::from_secs(1)).unwrap();
        assert_eq!(tool.base_url, "http://localhost:1234/tz");
    }

    #[tokio::test]
    async fn missing_timezone_is_invalid_arguments() {
        let tool = tool();
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn wrong_argument_type_is_invalid_arguments() {
        let tool = tool();
        let err = tool
            .execute(serde_json::json!({"timezone": 42}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_error_payload() {
        // Nothing listens on this port; the call must come back as an
        // error-shaped result, not an Err.
        let tool = CurrentTimeTool::new("http://127.0.0.1:1/api/timezone", Duration::from_secs(1))
            .unwrap();
        let result = tool
            .execute(serde_json::json!({"timezone": "Asia/Seoul"}))
            .await
            .unwrap();

        assert!(!result.success);
        let parsed: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert!(
            parsed["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to fetch time:")
        );
    }

    #[test]
    fn time_api_response_parsing() {
        let data = r#"{
            "timezone": "Asia/Seoul",
            "datetime": "2024-05-02T21:03:12.345678+09:00",
            "utc_offset": "+09:00",
            "day_of_week": 4,
            "unixtime": 1714651392
        }"#;
        let parsed: TimeApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.timezone, "Asia/Seoul");
        assert_eq!(parsed.utc_offset, "+09:00");
    }
}
