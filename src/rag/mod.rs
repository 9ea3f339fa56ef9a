//! RAG 엔진 - 인덱싱과 질의응답 파이프라인
//!
//! 클라이언트 핸들(로더/분할기/임베더/생성모델/인덱스)은 시작 시 한 번
//! 구성되어 엔진이 소유하며, 이후 모든 작업이 이를 재사용합니다.

mod prompt;

use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::embedding::{EmbeddingProvider, GeminiEmbedding};
use crate::index::{
    LanceVectorIndex, RecursiveSplitter, TextSplitter, VectorEntry, VectorIndex,
};
use crate::llm::{ChatModel, GeminiChat};
use crate::loader::{DocumentLoader, WebLoader};

/// 기본 검색 결과 수 (top-K)
pub const DEFAULT_TOP_K: usize = 4;

/// 벡터 인덱스 디렉토리 이름 (데이터 디렉토리 하위)
const VECTORSTORE_DIR: &str = "vectorstore.lance";

/// 데이터 디렉토리 기준 벡터 인덱스 경로
pub fn vectorstore_path(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join(VECTORSTORE_DIR)
}

// ============================================================================
// Types
// ============================================================================

/// 질의 결과 - 답변과 기여한 출처 URL 목록
#[derive(Debug, Clone, PartialEq)]
pub struct QaResult {
    /// 답변 텍스트
    pub answer: String,
    /// 출처 URL (순서 유지, 중복 제거)
    pub sources: Vec<String>,
}

/// 질의 에러
///
/// `NotReady`는 이 시스템이 직접 발생시키고 처리하는 유일한 에러입니다.
/// 나머지(스크랩/임베딩/모델 실패)는 그대로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    /// 인덱스가 비어 있음 - process를 먼저 실행해야 함
    #[error("vector index is not initialized. Run `process` with at least one URL first")]
    NotReady,

    /// 외부 협력자 실패 (그대로 전파)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ============================================================================
// RagEngine
// ============================================================================

/// RAG 엔진
///
/// `process_urls`로 인덱스를 재구축하고 `answer`로 질의합니다.
/// 두 작업은 단일 제어 흐름에서 순차적으로만 호출됩니다.
pub struct RagEngine {
    loader: Box<dyn DocumentLoader>,
    splitter: Box<dyn TextSplitter>,
    embedder: Box<dyn EmbeddingProvider>,
    chat: Box<dyn ChatModel>,
    index: Box<dyn VectorIndex>,
    top_k: usize,
}

impl RagEngine {
    /// 구성 요소를 직접 주입하여 생성
    pub fn new(
        loader: Box<dyn DocumentLoader>,
        splitter: Box<dyn TextSplitter>,
        embedder: Box<dyn EmbeddingProvider>,
        chat: Box<dyn ChatModel>,
        index: Box<dyn VectorIndex>,
    ) -> Self {
        Self {
            loader,
            splitter,
            embedder,
            chat,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// 기본 구성으로 생성 (환경변수 API 키 + 지정 데이터 디렉토리)
    pub async fn from_env(data_dir: &Path) -> Result<Self> {
        let loader = WebLoader::new().context("Failed to create web loader")?;
        let splitter = RecursiveSplitter::with_defaults();
        let embedder = GeminiEmbedding::from_env().context("Failed to create embedder")?;
        let chat = GeminiChat::from_env().context("Failed to create chat model")?;

        let index = LanceVectorIndex::open(&data_dir.join(VECTORSTORE_DIR))
            .await
            .context("Failed to open vector index")?;

        Ok(Self::new(
            Box::new(loader),
            Box::new(splitter),
            Box::new(embedder),
            Box::new(chat),
            Box::new(index),
        ))
    }

    /// 검색 결과 수 변경
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// URL 처리: 인덱스 초기화 후 스크랩 → 청킹 → 임베딩 → 저장
    ///
    /// 각 단계 시작 전에 progress 콜백이 순서대로 한 번씩 호출됩니다
    /// (동기 호출, 병렬 실행 없음). 호출자는 비어있지 않은 URL 목록을
    /// 전달해야 합니다 (검증은 CLI 경계에서 수행).
    pub async fn process_urls<F>(&self, urls: &[String], mut progress: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        progress("Starting processing of URLs...");

        // 이전 내용 전체 삭제 - 인덱스는 항상 마지막 process 호출의
        // URL 집합에서 나온 청크만 담는다
        self.index.reset().await.context("Failed to reset index")?;

        progress("Loading data from URLs...");
        let documents = self
            .loader
            .load(urls)
            .await
            .context("Failed to load URLs")?;

        progress(&format!(
            "Loaded {} documents from the URLs",
            documents.len()
        ));

        let chunks = self.splitter.split(&documents);
        tracing::info!("Split {} documents into {} chunks", documents.len(), chunks.len());

        progress("Adding to vector store...");
        let mut entries = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let embedding = self
                .embedder
                .embed(&chunk.text)
                .await
                .context("Failed to embed chunk")?;

            entries.push(VectorEntry {
                id: Uuid::new_v4().to_string(),
                source: chunk.source,
                chunk_text: chunk.text,
                embedding,
            });
        }

        let inserted = self
            .index
            .insert_batch(&entries)
            .await
            .context("Failed to insert vectors")?;

        tracing::info!("Indexed {} chunks from {} URLs", inserted, urls.len());

        Ok(())
    }

    /// 질의응답: top-K 검색 후 출처 표기 프롬프트로 모델을 한 번 호출
    ///
    /// process가 성공적으로 완료된 적이 없으면 `AnswerError::NotReady`.
    pub async fn answer(&self, question: &str) -> Result<QaResult, AnswerError> {
        if !self
            .index
            .has_content()
            .await
            .context("Failed to inspect index")?
        {
            return Err(AnswerError::NotReady);
        }

        // 매 호출마다 새로 검색하고 새로 생성 (캐싱 없음)
        let query_embedding = self
            .embedder
            .embed(question)
            .await
            .context("Failed to embed question")?;

        let hits = self
            .index
            .search(&query_embedding, self.top_k)
            .await
            .context("Failed to search index")?;

        tracing::debug!("Retrieved {} chunks for question", hits.len());

        let prompt = prompt::build_prompt(question, &hits);
        let completion = self
            .chat
            .complete(&prompt)
            .await
            .context("Failed to generate answer")?;

        let (answer, sources) = prompt::parse_completion(&completion);

        Ok(QaResult { answer, sources })
    }

    /// 인덱스된 청크 수 (status 용)
    pub async fn chunk_count(&self) -> Result<usize> {
        self.index.count().await
    }
}
