//! 벡터 인덱스 트레이트 및 타입
//!
//! 인덱스는 한 번의 process 호출에서 나온 청크만 담습니다
//! (재구축 전 reset 필수, 누적 없음).

use anyhow::Result;
use async_trait::async_trait;

/// 벡터 임베딩 차원 (gemini-embedding-001 기본값)
/// source: https://ai.google.dev/gemini-api/docs/embeddings
pub const EMBEDDING_DIMENSION: i32 = 768;

// ============================================================================
// Types
// ============================================================================

/// 벡터 엔트리 (저장용)
#[derive(Debug, Clone)]
pub struct VectorEntry {
    /// 청크 고유 ID (uuid v4, 호출 간 재사용 없음)
    pub id: String,
    /// 출처 URL
    pub source: String,
    /// 청크 텍스트
    pub chunk_text: String,
    /// 임베딩 벡터
    pub embedding: Vec<f32>,
}

/// 검색 결과
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// 청크 고유 ID
    pub id: String,
    /// 출처 URL
    pub source: String,
    /// 청크 텍스트
    pub chunk_text: String,
    /// 유사도 스코어 (0.0 ~ 1.0)
    pub similarity: f32,
}

// ============================================================================
// VectorIndex Trait
// ============================================================================

/// 벡터 인덱스의 공통 인터페이스
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// 기존 엔트리 전체 삭제 (되돌릴 수 없음)
    async fn reset(&self) -> Result<()>;

    /// 벡터 배치 삽입
    async fn insert_batch(&self, entries: &[VectorEntry]) -> Result<usize>;

    /// 유사도 검색
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    /// 벡터 개수 조회
    async fn count(&self) -> Result<usize>;

    /// process가 한 번이라도 완료되었는지 (컬렉션 존재 여부)
    async fn has_content(&self) -> Result<bool>;
}
