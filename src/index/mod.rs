//! 인덱스 모듈 - 청킹 + 벡터 인덱스
//!
//! - Chunker: 구분자 우선순위 재귀 분할
//! - LanceDB: 단일 컬렉션 벡터 인덱스 (reset 후 재구축)

mod chunker;
mod lance;
mod vector;

// Re-exports
pub use chunker::{
    Chunk, RecursiveSplitter, SplitConfig, TextSplitter, DEFAULT_MAX_CHARACTERS,
};
pub use lance::LanceVectorIndex;
pub use vector::{ScoredChunk, VectorEntry, VectorIndex, EMBEDDING_DIMENSION};
