//! Weather lookup tool — mock data for known cities.
//!
//! Returns fixed temperatures for Seoul, San Francisco, and Paris, and
//! "unknown" for everywhere else, so the tool-calling loop can be exercised
//! end-to-end without a weather API.

use async_trait::async_trait;
use serde::Deserialize;

use ragline_core::error::ToolError;
use ragline_core::tool::{Tool, ToolResult};

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
    #[serde(default)]
    unit: Option<String>,
}

pub struct WeatherLookupTool;

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "weather_lookup"
    }

    fn description(&self) -> &str {
        "Get the current weather in a given location. Returns the temperature in the requested unit."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city name to look up weather for, e.g., 'Seoul'."
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "Temperature unit (default: fahrenheit)."
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: WeatherArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("weather_lookup: {e}")))?;

        let unit = args.unit.unwrap_or_else(|| "fahrenheit".into());
        let location = args.location.to_lowercase();

        let payload = if location.contains("seoul") {
            serde_json::json!({"location": "Seoul", "temperature": "10", "unit": unit})
        } else if location.contains("san francisco") {
            serde_json::json!({"location": "San Francisco", "temperature": "72", "unit": unit})
        } else if location.contains("paris") {
            serde_json::json!({"location": "Paris", "temperature": "22", "unit": unit})
        } else {
            serde_json::json!({"location": args.location, "temperature": "unknown"})
        };

        Ok(ToolResult::ok("", payload.to_string()))
    }
}
