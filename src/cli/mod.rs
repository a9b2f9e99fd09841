//! CLI 모듈
//!
//! lexcite-rag CLI 명령어 정의 및 구현

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::collector::{absolute, is_document, store_upload};
use crate::knowledge::{
    format_citations, EngineConfig, HybridRetriever, IndexDiagnostics, SearchMethod,
    DEFAULT_TOP_K,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "lexcite-rag")]
#[command(version, about = "로컬 PDF 근거 검색 엔진", long_about = None)]
pub struct Cli {
    /// 문서 디렉토리 (기본: LTA_DOCS_DIR 또는 law_pdfs)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// 임베딩 검색 사용 (기본: LTA_USE_EMBEDDINGS=1)
    #[arg(long, global = true)]
    pub embeddings: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 문서 디렉토리 인덱싱 (증분)
    Index {
        /// 통계를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// PDF 파일을 문서 디렉토리에 추가하고 재인덱싱
    Add {
        /// 추가할 PDF 파일 경로
        file: PathBuf,
    },

    /// 근거 구절 검색
    Search {
        /// 검색 쿼리
        query: String,

        /// 결과 개수 제한
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// 마크다운 인용 형식으로 출력
        #[arg(long)]
        markdown: bool,
    },

    /// 상태 확인
    Status,

    /// 인덱스 초기화
    Clear,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.dir, cli.embeddings);
    let mut engine = HybridRetriever::new(config);

    match cli.command {
        Commands::Index { json } => cmd_index(&mut engine, json),
        Commands::Add { file } => cmd_add(&mut engine, &file),
        Commands::Search {
            query,
            top_k,
            markdown,
        } => cmd_search(&mut engine, &query, top_k, markdown),
        Commands::Status => cmd_status(&mut engine),
        Commands::Clear => cmd_clear(&mut engine),
    }
}

/// 환경변수 설정에 CLI 인자를 덮어씀
fn resolve_config(dir: Option<PathBuf>, embeddings: bool) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(dir) = dir {
        config.docs_dir = dir;
    }
    if embeddings {
        config.embeddings_enabled = true;
    }
    config
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 인덱싱 명령어 (index)
fn cmd_index(engine: &mut HybridRetriever, json: bool) -> Result<()> {
    let dir = engine.config().docs_dir.clone();

    if !engine.index(&dir) {
        bail!("PDF 추출 백엔드를 사용할 수 없습니다 (`pdf` 피처로 빌드하세요)");
    }

    let diagnostics = engine.diagnostics();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&diagnostics).context("통계 직렬화 실패")?
        );
    } else {
        println!("[OK] 인덱싱 완료: {}", dir.display());
        print_diagnostics(&diagnostics);
    }

    Ok(())
}

/// 문서 추가 명령어 (add)
///
/// 파일이 문서 디렉토리 밖에 있으면 안전한 이름으로 복사한 뒤 재인덱싱합니다.
fn cmd_add(engine: &mut HybridRetriever, file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("파일을 찾을 수 없습니다: {}", file.display());
    }
    if !is_document(file) {
        bail!("PDF 파일만 추가할 수 있습니다: {}", file.display());
    }

    let docs_dir = engine.config().docs_dir.clone();
    let target = if is_inside(file, &docs_dir) {
        file.to_path_buf()
    } else {
        let bytes =
            std::fs::read(file).with_context(|| format!("파일 읽기 실패: {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        store_upload(&docs_dir, &name, &bytes)?
    };

    if !engine.add_document(&target) {
        bail!("PDF 추출 백엔드를 사용할 수 없습니다 (`pdf` 피처로 빌드하세요)");
    }

    println!("[OK] 문서가 추가되었습니다: {}", target.display());
    print_diagnostics(&engine.diagnostics());
    Ok(())
}

/// 검색 명령어 (search)
fn cmd_search(engine: &mut HybridRetriever, query: &str, top_k: usize, markdown: bool) -> Result<()> {
    println!("[*] 검색 중: \"{}\"", query);

    let Some(results) = engine.search(query, top_k) else {
        println!("\n[!] No citations found.");
        return Ok(());
    };

    if markdown {
        println!();
        print!("{}", format_citations(&results));
        return Ok(());
    }

    println!("\n[OK] 검색 결과 ({} 건):\n", results.len());

    for (i, result) in results.iter().enumerate() {
        let method_str = match result.method {
            SearchMethod::Vector => "VEC",
            SearchMethod::Keyword => "KW",
            SearchMethod::Hybrid => "HYB",
        };

        println!(
            "{}. [{}] [점수: {:.4}] {} p.{}",
            i + 1,
            method_str,
            result.score,
            result.file,
            result.page
        );
        println!("   내용: {}", truncate_text(&result.text, 200));
        println!();
    }

    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status(engine: &mut HybridRetriever) -> Result<()> {
    println!("lexcite-rag v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let dir = engine.config().docs_dir.clone();
    println!("[*] 문서 디렉토리: {}", absolute(&dir).display());

    if !engine.index(&dir) {
        println!("[!] PDF 추출 백엔드: 없음");
        return Ok(());
    }

    print_diagnostics(&engine.diagnostics());

    if engine.config().embeddings_enabled && !engine.diagnostics().embeddings_active {
        match engine.embeddings_disabled_reason() {
            Some(reason) => println!("    임베딩 비활성화 사유: {}", reason),
            None => println!("    임베딩 모델을 불러올 수 없어 키워드 검색만 사용합니다"),
        }
    }

    Ok(())
}

/// 초기화 명령어 (clear)
fn cmd_clear(engine: &mut HybridRetriever) -> Result<()> {
    engine.clear_index();
    println!("[OK] 인덱스가 초기화되었습니다");
    print_diagnostics(&engine.diagnostics());
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn print_diagnostics(d: &IndexDiagnostics) {
    println!(
        "     새로 추출: {}, 재사용: {}, 제거: {}, 총 페이지: {}",
        d.processed, d.reused, d.deleted, d.total
    );
    println!(
        "     임베딩: {}",
        if d.embeddings_active { "사용" } else { "미사용" }
    );
}

/// 파일이 디렉토리 바로 아래에 있는지 확인
fn is_inside(file: &Path, dir: &Path) -> bool {
    match (std::fs::canonicalize(file), std::fs::canonicalize(dir)) {
        (Ok(file), Ok(dir)) => file.parent() == Some(dir.as_path()),
        _ => false,
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("bail\nbond", 20), "bail bond");
        assert_eq!(truncate_text("धारा ४२०", 4), "धारा...");
    }

    #[test]
    fn test_resolve_config_overrides() {
        let config = resolve_config(Some(PathBuf::from("/tmp/acts")), true);
        assert_eq!(config.docs_dir, PathBuf::from("/tmp/acts"));
        assert!(config.embeddings_enabled);
    }

    #[test]
    fn test_is_inside() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("a.pdf");
        std::fs::write(&inner, b"x").unwrap();

        let other = TempDir::new().unwrap();
        let outer = other.path().join("b.pdf");
        std::fs::write(&outer, b"x").unwrap();

        assert!(is_inside(&inner, dir.path()));
        assert!(!is_inside(&outer, dir.path()));
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from(["lexcite-rag", "--dir", "acts", "search", "bail", "-k", "5"])
            .unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("acts")));
        match cli.command {
            Commands::Search { query, top_k, markdown } => {
                assert_eq!(query, "bail");
                assert_eq!(top_k, 5);
                assert!(!markdown);
            }
            _ => panic!("expected search command"),
        }
    }
}
