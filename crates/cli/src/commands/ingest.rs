//! `ragline ingest` — load knowledge documents from a JSON file.
//!
//! The file is a JSON array; each entry is either a plain string or an
//! object with a `document` field and optional `metadata` mapping:
//!
//! ```json
//! [
//!   "plain rule text",
//!   {
//!     "document": "Seoul office is open 9am-6pm KST",
//!     "metadata": {"office_name": "Seoul HQ", "timezone": "Asia/Seoul"}
//!   }
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;

use ragline_config::AppConfig;
use ragline_core::vector::Metadata;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngestEntry {
    Text(String),
    Document {
        document: String,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
}

pub async fn run(config: AppConfig, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    let entries: Vec<IngestEntry> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", file.display()))?;

    if entries.is_empty() {
        println!("Nothing to ingest: {} is empty", file.display());
        return Ok(());
    }

    let mut documents = Vec::with_capacity(entries.len());
    let mut metadatas = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            IngestEntry::Text(text) => {
                documents.push(text);
                metadatas.push(Metadata::new());
            }
            IngestEntry::Document { document, metadata } => {
                documents.push(document);
                metadatas.push(metadata.unwrap_or_default());
            }
        }
    }

    let state = super::build_state(&config)?;
    let report = state.agent.add_knowledge(documents, Some(metadatas)).await?;

    println!("Added {} documents to the knowledge collection", report.added);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_parse_both_shapes() {
        let json = r#"[
            "plain text rule",
            {"document": "Seoul rule", "metadata": {"office_name": "Seoul HQ"}},
            {"document": "bare rule"}
        ]"#;
        let entries: Vec<IngestEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], IngestEntry::Text(_)));
        match &entries[1] {
            IngestEntry::Document { document, metadata } => {
                assert_eq!(document, "Seoul rule");
                assert_eq!(metadata.as_ref().unwrap()["office_name"], "Seoul HQ");
            }
            _ => panic!("expected document entry"),
        }
        assert!(matches!(
            entries[2],
            IngestEntry::Document { metadata: None, .. }
        ));
    }
}
