//! RAG 엔진 통합 테스트
//!
//! 로더/임베더/생성모델은 결정적 목 구현으로 대체하고,
//! 벡터 인덱스는 임시 디렉토리의 실제 LanceDB를 사용합니다.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use estate_rag::{
    AnswerError, ChatModel, Document, DocumentLoader, EmbeddingProvider, LanceVectorIndex,
    RagEngine, RecursiveSplitter, VectorIndex, EMBEDDING_DIMENSION,
};

// ============================================================================
// Mocks
// ============================================================================

/// 고정된 페이지 내용을 돌려주는 로더 (네트워크 없음)
struct StaticLoader {
    pages: HashMap<String, String>,
}

impl StaticLoader {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(urls.len());

        for url in urls {
            let text = self
                .pages
                .get(url)
                .ok_or_else(|| anyhow::anyhow!("Failed to fetch URL: {}", url))?;

            documents.push(Document {
                url: url.clone(),
                title: None,
                text: text.clone(),
            });
        }

        Ok(documents)
    }
}

/// 바이트 합산 기반 결정적 임베더
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let dim = EMBEDDING_DIMENSION as usize;
        let mut values = vec![0.0f32; dim];
        for (i, byte) in text.bytes().enumerate() {
            values[i % dim] += byte as f32 / 255.0;
        }
        Ok(values)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION as usize
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// 고정된 완성 텍스트를 돌려주는 생성모델
struct ScriptedChat {
    completion: String,
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.completion.clone())
    }

    fn name(&self) -> &str {
        "scripted-chat"
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn build_engine(
    data_dir: &Path,
    pages: &[(&str, &str)],
    completion: &str,
) -> RagEngine {
    let index = LanceVectorIndex::open(&data_dir.join("vectorstore.lance"))
        .await
        .expect("failed to open index");

    RagEngine::new(
        Box::new(StaticLoader::new(pages)),
        Box::new(RecursiveSplitter::with_defaults()),
        Box::new(HashEmbedder),
        Box::new(ScriptedChat {
            completion: completion.to_string(),
        }),
        Box::new(index),
    )
}

/// 직접 인덱스를 들여다보기 위한 별도 핸들
async fn open_raw_index(data_dir: &Path) -> LanceVectorIndex {
    LanceVectorIndex::open(&data_dir.join("vectorstore.lance"))
        .await
        .expect("failed to open index")
}

async fn all_entries(index: &LanceVectorIndex) -> Vec<estate_rag::ScoredChunk> {
    let query = vec![0.5f32; EMBEDDING_DIMENSION as usize];
    index.search(&query, 1000).await.expect("search failed")
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn answer_before_process_fails_with_not_ready() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(dir.path(), &[], "irrelevant").await;

    let result = engine.answer("What happened to mortgage rates?").await;
    assert!(matches!(result, Err(AnswerError::NotReady)));

    // 질문 내용과 무관하게 NotReady
    let result = engine.answer("").await;
    assert!(matches!(result, Err(AnswerError::NotReady)));
}

#[tokio::test]
async fn process_reports_progress_in_order() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(
        dir.path(),
        &[("https://example.com/a", "Mortgage rates rose in March 2024.")],
        "irrelevant",
    )
    .await;

    let mut messages: Vec<String> = Vec::new();
    engine
        .process_urls(&urls(&["https://example.com/a"]), |msg| {
            messages.push(msg.to_string())
        })
        .await
        .expect("process failed");

    assert_eq!(messages[0], "Starting processing of URLs...");
    assert_eq!(messages[1], "Loading data from URLs...");
    assert_eq!(messages[2], "Loaded 1 documents from the URLs");
    assert_eq!(messages[3], "Adding to vector store...");

    // 최대 크기보다 짧은 문서는 정확히 하나의 청크
    assert_eq!(engine.chunk_count().await.unwrap(), 1);
}

#[tokio::test]
async fn reprocess_replaces_prior_content() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(
        dir.path(),
        &[
            ("https://example.com/a", "Text about rising mortgage rates."),
            ("https://example.com/b", "Text about cooling housing demand."),
        ],
        "irrelevant",
    )
    .await;

    engine
        .process_urls(&urls(&["https://example.com/a"]), |_| {})
        .await
        .unwrap();

    engine
        .process_urls(&urls(&["https://example.com/b"]), |_| {})
        .await
        .unwrap();

    // 직접 인덱스 조회: 이전 process의 청크는 완전히 사라져야 함
    let raw = open_raw_index(dir.path()).await;
    let entries = all_entries(&raw).await;

    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.source == "https://example.com/b"));
}

#[tokio::test]
async fn repeated_process_never_reuses_ids() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(
        dir.path(),
        &[("https://example.com/a", "Same page processed twice.")],
        "irrelevant",
    )
    .await;

    let target = urls(&["https://example.com/a"]);
    let raw = open_raw_index(dir.path()).await;

    engine.process_urls(&target, |_| {}).await.unwrap();
    let first_ids: Vec<String> = all_entries(&raw).await.into_iter().map(|e| e.id).collect();

    engine.process_urls(&target, |_| {}).await.unwrap();
    let second_ids: Vec<String> = all_entries(&raw).await.into_iter().map(|e| e.id).collect();

    assert!(!first_ids.is_empty());
    assert!(!second_ids.is_empty());
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
}

#[tokio::test]
async fn fetch_failure_aborts_whole_batch() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(
        dir.path(),
        &[("https://example.com/a", "Reachable page.")],
        "irrelevant",
    )
    .await;

    // 두 번째 URL은 로더가 모름 - 배치 전체 실패, 부분 성공 없음
    let result = engine
        .process_urls(
            &urls(&["https://example.com/a", "https://example.com/missing"]),
            |_| {},
        )
        .await;

    assert!(result.is_err());
    assert_eq!(engine.chunk_count().await.unwrap(), 0);
}

#[tokio::test]
async fn answer_returns_answer_and_sources() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(
        dir.path(),
        &[("https://example.com/a", "Mortgage rates rose in March 2024.")],
        "Mortgage rates rose in March 2024.\nSOURCES: https://example.com/a",
    )
    .await;

    engine
        .process_urls(&urls(&["https://example.com/a"]), |_| {})
        .await
        .unwrap();

    let result = engine
        .answer("What happened to mortgage rates?")
        .await
        .expect("answer failed");

    assert!(result.answer.contains("March 2024"));
    assert_eq!(result.sources, vec!["https://example.com/a"]);
}
