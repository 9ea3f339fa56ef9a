//! 프롬프트 구성 및 완성 파싱
//!
//! 모델에게 검색된 컨텍스트만 사용해 답하고, 사용한 출처를
//! `SOURCES:` 줄로 나열하도록 지시합니다.

use crate::index::ScoredChunk;

/// 완성에서 출처 목록을 구분하는 마커
const SOURCES_MARKER: &str = "SOURCES:";

/// 출처 표기 프롬프트 생성
pub fn build_prompt(question: &str, chunks: &[ScoredChunk]) -> String {
    let mut context = String::new();

    for chunk in chunks {
        context.push_str("Content: ");
        context.push_str(&chunk.chunk_text);
        context.push_str("\nSource: ");
        context.push_str(&chunk.source);
        context.push_str("\n---\n");
    }

    format!(
        "Given the following extracted parts of web pages and a question, \
         create a final answer using only the provided content. \
         If you don't know the answer, just say that you don't know. \
         Don't try to make up an answer. \
         ALWAYS end your reply with a final line of the form \
         \"{marker} <comma-separated list of the Source URLs you used>\". \
         If no source was useful, end with \"{marker}\" followed by nothing.\n\n\
         {context}\n\
         Question: {question}\n\
         Answer:",
        marker = SOURCES_MARKER,
        context = context,
        question = question,
    )
}

/// 완성 텍스트를 (답변, 출처 목록)으로 분리
///
/// 마지막 `SOURCES:` 마커를 기준으로 나누고, 출처는 순서를 유지하며
/// 중복을 제거합니다. 마커가 없으면 출처는 빈 목록입니다.
pub fn parse_completion(completion: &str) -> (String, Vec<String>) {
    let Some(pos) = completion.rfind(SOURCES_MARKER) else {
        return (completion.trim().to_string(), vec![]);
    };

    let answer = completion[..pos].trim().to_string();
    let tail = &completion[pos + SOURCES_MARKER.len()..];

    let sources = dedup_ordered(
        tail.split([',', '\n'])
            .map(|s| s.trim().trim_end_matches(['.', ';']))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
    );

    (answer, sources)
}

/// 순서 유지 중복 제거
fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();

    for item in items {
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, source: &str) -> ScoredChunk {
        ScoredChunk {
            id: "test-id".to_string(),
            source: source.to_string(),
            chunk_text: text.to_string(),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_build_prompt_contains_context_and_question() {
        let chunks = vec![
            chunk("Rates rose in March 2024.", "https://example.com/a"),
            chunk("Demand cooled in April.", "https://example.com/b"),
        ];
        let prompt = build_prompt("What happened to mortgage rates?", &chunks);

        assert!(prompt.contains("Rates rose in March 2024."));
        assert!(prompt.contains("Source: https://example.com/a"));
        assert!(prompt.contains("Question: What happened to mortgage rates?"));
        assert!(prompt.contains("SOURCES:"));
    }

    #[test]
    fn test_parse_completion_with_sources() {
        let completion = "Mortgage rates rose in March 2024.\n\nSOURCES: https://example.com/a";
        let (answer, sources) = parse_completion(completion);

        assert_eq!(answer, "Mortgage rates rose in March 2024.");
        assert_eq!(sources, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_parse_completion_multiple_sources_deduped_in_order() {
        let completion =
            "Answer text.\nSOURCES: https://b.example, https://a.example, https://b.example";
        let (_, sources) = parse_completion(completion);

        assert_eq!(sources, vec!["https://b.example", "https://a.example"]);
    }

    #[test]
    fn test_parse_completion_without_marker() {
        let (answer, sources) = parse_completion("Just an answer with no attribution.");

        assert_eq!(answer, "Just an answer with no attribution.");
        assert!(sources.is_empty());
    }

    #[test]
    fn test_parse_completion_empty_sources() {
        let (answer, sources) = parse_completion("I don't know.\nSOURCES:");

        assert_eq!(answer, "I don't know.");
        assert!(sources.is_empty());
    }

    #[test]
    fn test_parse_strips_trailing_punctuation() {
        let (_, sources) = parse_completion("Answer.\nSOURCES: https://example.com/a.");
        assert_eq!(sources, vec!["https://example.com/a"]);
    }
}
