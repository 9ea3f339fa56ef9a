//! estate-rag - 부동산 뉴스 RAG 어시스턴트
//!
//! URL에서 기사를 스크랩하여 LanceDB 벡터 인덱스에 저장하고,
//! Gemini 모델로 출처가 표기된 답변을 생성합니다.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod index;
pub mod llm;
pub mod loader;
pub mod rag;

// Re-exports
pub use config::{get_api_key, get_data_dir, has_api_key};
pub use embedding::{EmbeddingProvider, GeminiEmbedding};
pub use index::{
    Chunk, LanceVectorIndex, RecursiveSplitter, ScoredChunk, SplitConfig, TextSplitter,
    VectorEntry, VectorIndex, EMBEDDING_DIMENSION,
};
pub use llm::{ChatModel, GeminiChat};
pub use loader::{Document, DocumentLoader, WebLoader};
pub use rag::{AnswerError, QaResult, RagEngine, DEFAULT_TOP_K};
