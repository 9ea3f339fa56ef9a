//! 생성 모델 모듈 - Gemini generateContent 클라이언트
//!
//! 프롬프트 하나를 받아 완성 텍스트 하나를 돌려줍니다.
//! 스트리밍 없음, 캐싱 없음, 호출당 한 번의 API 요청.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::get_api_key;

/// 기본 생성 모델
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";

/// 생성 온도 (0이 아니므로 동일 질문도 결과가 달라질 수 있음)
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// 출력 토큰 상한
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

// ============================================================================
// ChatModel Trait
// ============================================================================

/// 생성 모델 트레이트
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 프롬프트에 대한 완성 텍스트 생성 (동기식 단일 호출)
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// 모델 이름
    fn name(&self) -> &str;
}

// ============================================================================
// GeminiChat
// ============================================================================

/// Gemini 생성 모델 클라이언트
///
/// 고정 모델 식별자, 온도, 출력 길이 상한으로 구성됩니다.
pub struct GeminiChat {
    api_key: String,
    client: reqwest::Client,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiChat {
    /// 새 클라이언트 생성 (기본 모델/온도/토큰 상한)
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            client,
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        })
    }

    /// 환경변수에서 API 키를 읽어 생성
    pub fn from_env() -> Result<Self> {
        let api_key = get_api_key()?;
        Self::new(api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

/// generateContent 요청 본문
/// source: https://ai.google.dev/api/generate-content
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send generation request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read generation response body")?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<crate::embedding::GeminiError>(&body) {
                anyhow::bail!(
                    "Gemini API error ({}): {}",
                    error.error.status,
                    error.error.message
                );
            }
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse generation response")?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow::anyhow!("No completion generated"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================
