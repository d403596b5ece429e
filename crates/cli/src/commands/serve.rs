//! `ragline serve` — start the HTTP gateway.

use ragline_config::AppConfig;

pub async fn run(config: AppConfig, port_override: Option<u16>) -> anyhow::Result<()> {
    let state = super::build_state(&config)?;
    let port = port_override.unwrap_or(config.gateway.port);

    ragline_gateway::serve(state, &config.gateway.host, port).await?;
    Ok(())
}
