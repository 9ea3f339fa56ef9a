//! 문서 로더 모듈 - URL 콘텐츠 추출
//!
//! 입력 URL 목록을 순서대로 가져와 HTML 태그를 제거한 본문 텍스트를 만듭니다.
//! 실패한 URL은 로컬에서 처리하지 않고 그대로 전파합니다 (배치 전체 중단).

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

/// 한 URL에서 추출된 문서 (휘발성, 인덱싱 입력)
#[derive(Debug, Clone)]
pub struct Document {
    /// 원본 URL (출처 식별자)
    pub url: String,
    /// 페이지 제목
    pub title: Option<String>,
    /// 본문 텍스트 (HTML 태그 제거됨)
    pub text: String,
}

/// 문서 로더 트레이트
///
/// URL 목록을 받아 입력 순서를 유지한 문서 목록을 돌려줍니다.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// URL별 텍스트 추출
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>>;
}

/// 웹 문서 로더
pub struct WebLoader {
    client: reqwest::Client,
}

impl WebLoader {
    /// 새 로더 생성
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("estate-rag/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// 단일 URL에서 문서 추출
    async fn fetch(&self, url: &str) -> Result<Document> {
        tracing::info!("Loading: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {}", url))?;

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {}", url))?;

        // Html은 Send가 아니므로 await 이후에만 사용
        let document = Html::parse_document(&html);

        let title = extract_title(&document);
        let text = extract_content(&document);

        Ok(Document {
            url: url.to_string(),
            title,
            text,
        })
    }
}

#[async_trait]
impl DocumentLoader for WebLoader {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(urls.len());

        for url in urls {
            documents.push(self.fetch(url).await?);
        }

        Ok(documents)
    }
}

/// 제목 추출 (<title> 우선, 없으면 <h1>)
fn extract_title(document: &Html) -> Option<String> {
    for selector_str in ["title", "h1"] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let title = element.text().collect::<String>().trim().to_string();
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }

    None
}

/// 본문 추출 (HTML 태그 제거)
fn extract_content(document: &Html) -> String {
    // 우선순위: article > main > body
    let selectors = [
        "article",
        "main",
        "[role=main]",
        ".content",
        "#content",
        "body",
    ];

    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = element_text(&element);
                if text.len() > 100 {
                    return text;
                }
            }
        }
    }

    // 폴백: 전체 body 텍스트
    if let Ok(selector) = Selector::parse("body") {
        if let Some(element) = document.select(&selector).next() {
            return element_text(&element);
        }
    }

    String::new()
}

/// 요소에서 텍스트 추출 + 연속 공백 정리
fn element_text(element: &scraper::ElementRef) -> String {
    let mut text = String::new();

    for node in element.text() {
        let trimmed = node.trim();
        if !trimmed.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(trimmed);
        }
    }

    if let Ok(re) = regex::Regex::new(r"\s+") {
        re.replace_all(&text, " ").trim().to_string()
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
