//! `ragline query` — answer one question through the RAG pipeline.

use ragline_config::AppConfig;

pub async fn run(
    config: AppConfig,
    text: &str,
    context_limit: Option<usize>,
) -> anyhow::Result<()> {
    let state = super::build_state(&config)?;
    let limit = context_limit.unwrap_or(config.retrieval.context_limit);

    let outcome = state.agent.process_query(text, limit).await?;

    println!("{}", outcome.answer);

    if !outcome.retrieved_documents.is_empty() {
        println!();
        println!("Sources:");
        for (i, (doc, distance)) in outcome
            .retrieved_documents
            .iter()
            .zip(outcome.document_distances.iter())
            .enumerate()
        {
            let preview: String = doc.chars().take(80).collect();
            println!("  {}. [distance {distance:.4}] {preview}", i + 1);
        }
    }

    Ok(())
}
