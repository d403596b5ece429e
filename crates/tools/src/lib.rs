//! Built-in tool implementations for ragline.
//!
//! Tools are what the model can invoke mid-turn: the current-time lookup
//! (real HTTP, bounded timeout) and a mock weather lookup. Each handler
//! encodes its failures into the result string — the orchestrator never
//! sees a raised error from a running tool.

pub mod current_time;
pub mod weather_lookup;

use std::time::Duration;

use ragline_core::error::ToolError;
use ragline_core::tool::ToolRegistry;

pub use current_time::CurrentTimeTool;
pub use weather_lookup::WeatherLookupTool;

/// Create the default tool registry: current_time + weather_lookup.
///
/// `time_api_base_url` points at the time-lookup service;
/// `http_timeout` bounds every external tool call.
pub fn default_registry(
    time_api_base_url: &str,
    http_timeout: Duration,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CurrentTimeTool::new(
        time_api_base_url,
        http_timeout,
    )?));
    registry.register(Box::new(WeatherLookupTool));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_both_tools() {
        let registry = default_registry(
            "https://worldtimeapi.org/api/timezone",
            Duration::from_secs(5),
        )
        .unwrap();
        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["current_time", "weather_lookup"]);
    }
}
