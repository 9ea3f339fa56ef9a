//! LanceDB 벡터 인덱스
//!
//! 고정된 컬렉션 이름의 테이블 하나를 디스크에 유지합니다.
//! ref: https://lancedb.github.io/lancedb/

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};

use super::vector::{ScoredChunk, VectorEntry, VectorIndex, EMBEDDING_DIMENSION};

/// 컬렉션(테이블) 이름 - 프로세스 재시작 간 단일 컬렉션만 유지
const COLLECTION_NAME: &str = "real_estate_docs";

// ============================================================================
// LanceVectorIndex
// ============================================================================

/// LanceDB 벡터 인덱스 구현
pub struct LanceVectorIndex {
    db: Connection,
}

impl LanceVectorIndex {
    /// LanceDB 인덱스 열기
    ///
    /// # Arguments
    /// * `path` - .lance 디렉토리 경로
    pub async fn open(path: &Path) -> Result<Self> {
        // 부모 디렉토리 생성
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create LanceDB directory")?;
            }
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;

        let db = lancedb::connect(path_str)
            .execute()
            .await
            .context("Failed to connect to LanceDB")?;

        Ok(Self { db })
    }

    /// 벡터 테이블 스키마 생성
    fn create_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("chunk_text", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    EMBEDDING_DIMENSION,
                ),
                false,
            ),
        ])
    }

    /// 엔트리들을 Arrow RecordBatch로 변환
    fn entries_to_batch(entries: &[VectorEntry]) -> Result<RecordBatch> {
        if entries.is_empty() {
            anyhow::bail!("Cannot create batch from empty entries");
        }

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        let sources: Vec<&str> = entries.iter().map(|e| e.source.as_str()).collect();
        let chunk_texts: Vec<&str> = entries.iter().map(|e| e.chunk_text.as_str()).collect();

        // 임베딩을 FixedSizeList로 변환
        let embeddings_flat: Vec<f32> = entries
            .iter()
            .flat_map(|e| e.embedding.iter().copied())
            .collect();

        let values = Float32Array::from(embeddings_flat);
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let embeddings_list = FixedSizeListArray::try_new(
            field,
            EMBEDDING_DIMENSION,
            Arc::new(values) as Arc<dyn Array>,
            None,
        )
        .context("Failed to create embedding array")?;

        let batch = RecordBatch::try_new(
            Arc::new(Self::create_schema()),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(sources)),
                Arc::new(StringArray::from(chunk_texts)),
                Arc::new(embeddings_list),
            ],
        )
        .context("Failed to create RecordBatch")?;

        Ok(batch)
    }

    /// 테이블 존재 여부 확인
    async fn table_exists(&self) -> bool {
        self.db
            .table_names()
            .execute()
            .await
            .map(|names| names.contains(&COLLECTION_NAME.to_string()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    async fn reset(&self) -> Result<()> {
        if self.table_exists().await {
            self.db
                .drop_table(COLLECTION_NAME)
                .await
                .context("Failed to drop collection")?;
            tracing::info!("Collection '{}' cleared", COLLECTION_NAME);
        }

        Ok(())
    }

    async fn insert_batch(&self, entries: &[VectorEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let batch = Self::entries_to_batch(entries)?;
        let schema = batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);

        if self.table_exists().await {
            // 기존 테이블에 추가
            let table = self
                .db
                .open_table(COLLECTION_NAME)
                .execute()
                .await
                .context("Failed to open table")?;

            table
                .add(batches)
                .execute()
                .await
                .context("Failed to add vectors to table")?;
        } else {
            // 새 테이블 생성
            self.db
                .create_table(COLLECTION_NAME, batches)
                .execute()
                .await
                .context("Failed to create table")?;
        }

        Ok(entries.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        if !self.table_exists().await {
            return Ok(vec![]);
        }

        let table = self
            .db
            .open_table(COLLECTION_NAME)
            .execute()
            .await
            .context("Failed to open table for search")?;

        let results = table
            .vector_search(query_embedding.to_vec())
            .context("Failed to create vector search")?
            .limit(limit)
            .execute()
            .await
            .context("Failed to execute vector search")?;

        let mut scored = Vec::new();

        // RecordBatch 스트림에서 결과 추출
        use futures::TryStreamExt;
        let batches: Vec<RecordBatch> = results.try_collect().await?;

        for batch in batches {
            let ids = batch
                .column_by_name("id")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Missing id column"))?;

            let sources = batch
                .column_by_name("source")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Missing source column"))?;

            let chunk_texts = batch
                .column_by_name("chunk_text")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Missing chunk_text column"))?;

            // _distance 컬럼 (LanceDB가 자동 추가)
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow::anyhow!("Missing _distance column"))?;

            for i in 0..batch.num_rows() {
                let distance = distances.value(i);
                // 거리를 유사도로 변환 (L2 거리 -> 코사인 유사도 근사)
                let similarity = 1.0 / (1.0 + distance);

                scored.push(ScoredChunk {
                    id: ids.value(i).to_string(),
                    source: sources.value(i).to_string(),
                    chunk_text: chunk_texts.value(i).to_string(),
                    similarity,
                });
            }
        }

        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        if !self.table_exists().await {
            return Ok(0);
        }

        let table = self
            .db
            .open_table(COLLECTION_NAME)
            .execute()
            .await
            .context("Failed to open table for count")?;

        let count = table.count_rows(None).await.context("Failed to count rows")?;
        Ok(count)
    }

    async fn has_content(&self) -> Result<bool> {
        Ok(self.table_exists().await)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str, source: &str) -> VectorEntry {
        VectorEntry {
            id: id.to_string(),
            source: source.to_string(),
            chunk_text: format!("chunk {} from {}", id, source),
            embedding: vec![0.1; EMBEDDING_DIMENSION as usize],
        }
    }

    #[tokio::test]
    async fn test_index_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let index = LanceVectorIndex::open(&temp_dir.path().join("test.lance"))
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 0);
        assert!(!index.has_content().await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let temp_dir = TempDir::new().unwrap();
        let index = LanceVectorIndex::open(&temp_dir.path().join("test.lance"))
            .await
            .unwrap();

        let entries = vec![entry("a1", "https://a.example"), entry("a2", "https://a.example")];
        assert_eq!(index.insert_batch(&entries).await.unwrap(), 2);

        assert_eq!(index.count().await.unwrap(), 2);
        assert!(index.has_content().await.unwrap());
    }

    #[tokio::test]
    async fn test_search_returns_sources() {
        let temp_dir = TempDir::new().unwrap();
        let index = LanceVectorIndex::open(&temp_dir.path().join("search.lance"))
            .await
            .unwrap();

        let entries = vec![
            entry("a1", "https://a.example"),
            entry("b1", "https://b.example"),
            entry("c1", "https://c.example"),
        ];
        index.insert_batch(&entries).await.unwrap();

        let query = vec![0.1; EMBEDDING_DIMENSION as usize];
        let results = index.search(&query, 2).await.unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= 2);
        assert!(results.iter().all(|r| r.source.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let temp_dir = TempDir::new().unwrap();
        let index = LanceVectorIndex::open(&temp_dir.path().join("reset.lance"))
            .await
            .unwrap();

        index
            .insert_batch(&[entry("a1", "https://a.example")])
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 1);

        index.reset().await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
        assert!(!index.has_content().await.unwrap());

        // reset 후에도 비어있는 인덱스에 대한 검색은 빈 결과
        let query = vec![0.1; EMBEDDING_DIMENSION as usize];
        assert!(index.search(&query, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_on_empty_index_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let index = LanceVectorIndex::open(&temp_dir.path().join("noop.lance"))
            .await
            .unwrap();

        assert!(index.reset().await.is_ok());
    }
}
