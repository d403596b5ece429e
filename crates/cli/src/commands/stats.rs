//! `ragline stats` — show knowledge collection statistics.

use ragline_config::AppConfig;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = super::build_state(&config)?;
    let stats = state.agent.knowledge_stats().await?;

    println!("Collection: {}", stats.name);
    println!("Documents:  {}", stats.count);
    Ok(())
}
