//! 텍스트 청킹 모듈 - 구분자 우선순위 기반 재귀 분할
//!
//! 문단 → 줄 → 문장 → 문자 경계 순으로 구분자를 시도하면서
//! 최대 크기 이하의 청크를 만듭니다. 청크 간 오버랩은 없습니다.

use crate::loader::Document;

/// 기본 최대 청크 크기 (문자 수)
pub const DEFAULT_MAX_CHARACTERS: usize = 1000;

/// 구분자 우선순위 (문단 → 줄 → 문장)
const SEPARATORS: [&str; 3] = ["\n\n", "\n", "."];

// ============================================================================
// Chunk / Config
// ============================================================================

/// 출처가 표기된 텍스트 청크 (임베딩/검색의 단위)
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 청크 텍스트 (비어있지 않음)
    pub text: String,
    /// 출처 URL
    pub source: String,
}

/// 청킹 설정
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// 최대 청크 크기 (문자 수)
    pub max_characters: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_characters: DEFAULT_MAX_CHARACTERS,
        }
    }
}

// ============================================================================
// TextSplitter Trait
// ============================================================================

/// 텍스트 분할 전략 트레이트
pub trait TextSplitter: Send + Sync {
    /// 문서들을 청크로 분할 (입력 순서 유지)
    fn split(&self, documents: &[Document]) -> Vec<Chunk>;

    /// 분할기 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// RecursiveSplitter
// ============================================================================

/// 구분자 우선순위 재귀 분할기
///
/// 각 조각은 `max_characters` 이하이며, 최대 크기보다 짧은 문서는
/// 정확히 하나의 청크가 됩니다.
pub struct RecursiveSplitter {
    config: SplitConfig,
}

impl RecursiveSplitter {
    /// 설정으로 생성
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 생성
    pub fn with_defaults() -> Self {
        Self::new(SplitConfig::default())
    }

    /// 텍스트를 최대 크기 이하 조각으로 분할
    fn split_text(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let max = self.config.max_characters;

        if char_len(text) <= max {
            if text.trim().is_empty() {
                return vec![];
            }
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            // 구분자 소진 - 문자 경계에서 강제 분할
            return split_by_chars(text, max);
        };

        // 현재 구분자로 쪼갠 뒤, 여전히 큰 조각은 다음 구분자로 재귀
        let mut atoms: Vec<String> = Vec::new();
        for part in text.split_inclusive(*sep) {
            if char_len(part) > max {
                atoms.extend(self.split_text(part, rest));
            } else if !part.trim().is_empty() {
                atoms.push(part.to_string());
            }
        }

        // 인접 조각을 최대 크기까지 병합 (오버랩 없음)
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for atom in atoms {
            if !current.is_empty() && char_len(&current) + char_len(&atom) > max {
                chunks.push(current);
                current = String::new();
            }
            current.push_str(&atom);
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            for piece in self.split_text(&doc.text, &SEPARATORS) {
                chunks.push(Chunk {
                    text: piece,
                    source: doc.url.clone(),
                });
            }
        }

        chunks
    }

    fn name(&self) -> &'static str {
        "RecursiveSplitter"
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 문자 수 (바이트 수 아님)
#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 문자 경계에서 고정 크기 분할
fn split_by_chars(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max {
            pieces.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

// ============================================================================
// Tests
// ============================================================================
