// Embedding providers: turn the labeled corpus into one vector per label.

pub mod download;
pub mod onnx;
pub mod store;
pub mod tfidf;
pub mod traits;

pub use store::VectorStore;
pub use traits::EmbeddingProvider;
