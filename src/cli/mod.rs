//! CLI 모듈 - 세션 컨트롤러
//!
//! 사용자 입력 검증, 엔진 호출, 진행 상황/결과 렌더링을 담당합니다.
//! 질의 전 인덱싱이 필요하다는 `NotReady` 에러를 사용자 메시지로 변환합니다.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{get_data_dir, has_api_key};
use crate::index::{LanceVectorIndex, VectorIndex};
use crate::rag::{vectorstore_path, AnswerError, QaResult, RagEngine, DEFAULT_TOP_K};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "estate-rag")]
#[command(version, about = "부동산 뉴스 RAG 어시스턴트", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// URL 처리: 스크랩 후 벡터 인덱스를 재구축 (이전 내용은 삭제됨)
    Process {
        /// 처리할 URL (최대 3개)
        #[arg(num_args = 1..=3, required = true)]
        urls: Vec<String>,
    },

    /// 인덱스된 문서에 대해 질문
    Ask {
        /// 질문
        question: String,

        /// 검색 결과 수
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// 대화형 질의 루프 ('exit' 입력 시 종료)
    Chat,

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process { urls } => cmd_process(urls).await,
        Commands::Ask { question, top_k } => cmd_ask(&question, top_k).await,
        Commands::Chat => cmd_chat().await,
        Commands::Status => cmd_status().await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// URL 처리 명령어 (process)
async fn cmd_process(urls: Vec<String>) -> Result<()> {
    // 빈 항목 제거 및 형식 검증 - 엔진/클라이언트 초기화 전에 수행
    let urls = sanitize_urls(urls)?;

    ensure_api_key()?;

    let engine = RagEngine::from_env(&get_data_dir())
        .await
        .context("엔진 초기화 실패")?;

    engine
        .process_urls(&urls, |msg| println!("[*] {}", msg))
        .await
        .context("URL 처리 실패")?;

    println!("[OK] 처리 완료. 이제 질문할 수 있습니다.");

    Ok(())
}

/// 질문 명령어 (ask)
async fn cmd_ask(question: &str, top_k: usize) -> Result<()> {
    ensure_api_key()?;

    let engine = RagEngine::from_env(&get_data_dir())
        .await
        .context("엔진 초기화 실패")?
        .with_top_k(top_k);

    match engine.answer(question).await {
        Ok(result) => {
            render_result(&result);
            Ok(())
        }
        Err(AnswerError::NotReady) => {
            println!("[!] 먼저 `process`로 URL을 처리해야 합니다.");
            Ok(())
        }
        Err(AnswerError::Other(e)) => Err(e.context("답변 생성 실패")),
    }
}

/// 대화형 질의 루프 (chat)
async fn cmd_chat() -> Result<()> {
    ensure_api_key()?;

    let engine = RagEngine::from_env(&get_data_dir())
        .await
        .context("엔진 초기화 실패")?;

    println!("[*] 질문을 입력하세요. 종료하려면 'exit'를 입력하세요.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        print!("\n질문: ");
        stdout.flush()?;

        buffer.clear();
        if stdin.read_line(&mut buffer)? == 0 {
            break;
        }

        let question = buffer.trim();

        if question.is_empty() {
            continue;
        }

        if question.eq_ignore_ascii_case("exit") {
            println!("[*] 종료합니다.");
            break;
        }

        match engine.answer(question).await {
            Ok(result) => render_result(&result),
            Err(AnswerError::NotReady) => {
                println!("[!] 먼저 `process`로 URL을 처리해야 합니다.");
            }
            Err(AnswerError::Other(e)) => return Err(e.context("답변 생성 실패")),
        }
    }

    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status() -> Result<()> {
    println!("estate-rag v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let data_dir = get_data_dir();
    println!("[*] 데이터 디렉토리: {}", data_dir.display());

    if has_api_key() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    // 인덱스 상태 (API 키 없이도 조회 가능)
    match LanceVectorIndex::open(&vectorstore_path(&data_dir)).await {
        Ok(index) => match index.count().await {
            Ok(count) => {
                println!("[OK] 벡터 인덱스: {} 청크", count);
            }
            Err(e) => {
                println!("[!] 인덱스 조회 실패: {}", e);
            }
        },
        Err(e) => {
            println!("[!] 인덱스 열기 실패: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// URL 입력 정리: 공백 항목 제거, 형식 검증, 빈 목록 거부
fn sanitize_urls(urls: Vec<String>) -> Result<Vec<String>> {
    let urls: Vec<String> = urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        bail!("최소 1개의 URL을 입력해야 합니다");
    }

    for u in &urls {
        url::Url::parse(u).with_context(|| format!("잘못된 URL 형식: {}", u))?;
    }

    Ok(urls)
}

/// API 키 확인 (없으면 안내 메시지와 함께 실패)
fn ensure_api_key() -> Result<()> {
    if !has_api_key() {
        bail!(
            "API 키가 설정되지 않았습니다.\n\n\
             설정 방법:\n  \
             export GEMINI_API_KEY=your-api-key\n  \
             (.env 파일도 지원)\n\n\
             API 키 발급: https://aistudio.google.com/app/apikey"
        );
    }

    Ok(())
}

/// 질의 결과 출력
fn render_result(result: &QaResult) {
    println!("\n답변:");
    println!("{}", result.answer);

    println!("\n출처:");
    if result.sources.is_empty() {
        println!("  (없음)");
    } else {
        for source in &result.sources {
            println!("  - {}", source);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
