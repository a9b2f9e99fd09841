//! 문서 수집 모듈
//!
//! 감시 디렉토리에서 PDF 문서를 수집하고, 변경 감지용 지문(SHA-256)을 계산합니다.
//! 업로드된 파일을 안전한 이름으로 디렉토리에 저장하는 기능도 제공합니다.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// 지원 문서 확장자
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// 해시 계산 시 읽기 블록 크기 (1MB)
const HASH_BLOCK_SIZE: usize = 1024 * 1024;

// ============================================================================
// Scanner
// ============================================================================

/// 디렉토리의 문서 목록 수집
///
/// 디렉토리가 없으면 생성합니다. 하위 디렉토리는 탐색하지 않으며,
/// 결과는 파일 이름 순으로 정렬된 절대 경로입니다.
/// 디렉토리를 읽을 수 없으면 빈 목록을 반환합니다.
pub fn scan_documents(dir: &Path) -> Vec<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Failed to create document directory {:?}: {}", dir, e);
        return vec![];
    }

    let root = absolute(dir);

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }

        files.push(entry.into_path());
    }

    tracing::debug!("Scanned {} documents in {:?}", files.len(), root);
    files
}

/// 문서 확장자 확인 (대소문자 무시)
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        .unwrap_or(false)
}

/// 정규화된 절대 경로로 변환
///
/// `..`와 심볼릭 링크를 풀어 같은 디렉토리는 항상 같은 경로가 됩니다.
/// 경로가 존재하지 않으면 현재 디렉토리 기준으로 결합만 합니다.
pub fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

// ============================================================================
// Fingerprint
// ============================================================================

/// 파일 내용 전체의 SHA-256 지문 (hex)
pub fn fingerprint(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Upload
// ============================================================================

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid regex"))
}

/// 업로드 파일 이름 정리
///
/// 경로 구성요소와 NUL 문자를 제거하고, 허용되지 않는 문자열은 `_`로 치환합니다.
/// 남는 것이 없으면 `default`를 반환합니다.
pub fn safe_file_name(name: &str, default: &str) -> String {
    let base = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .replace('\0', "");
    let base = base.trim();

    if base.is_empty() {
        return default.to_string();
    }

    let safe = unsafe_chars().replace_all(base, "_");
    let safe = safe.trim_matches(|c: char| c == '.' || c == '_');

    if safe.is_empty() {
        default.to_string()
    } else {
        safe.to_string()
    }
}

/// 업로드된 바이트를 안전한 이름으로 디렉토리에 저장
pub fn store_upload(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create document directory: {:?}", dir))?;

    let path = dir.join(safe_file_name(name, "doc.pdf"));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write upload: {:?}", path))?;

    tracing::info!("Stored upload {} as {:?}", name, path);
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================
