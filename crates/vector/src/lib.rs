//! Embedding and vector-store adapters for ragline.
//!
//! The [`VectorService`] is the facade the rest of the system talks to:
//! embed-then-store on the way in, embed-then-query on the way out. Two
//! store backends implement `ragline_core::VectorStore` — the Chroma HTTP
//! collection for production and an in-memory cosine store for tests and
//! offline runs.

pub mod chroma;
pub mod embedding;
pub mod in_memory;
pub mod service;

pub use chroma::ChromaStore;
pub use embedding::EmbeddingService;
pub use in_memory::InMemoryStore;
pub use service::VectorService;
