//! 페이지 추출 모듈
//!
//! 문서 하나를 (페이지 번호, 페이지 텍스트) 레코드 목록으로 변환합니다.
//! - PDF 파일: pdf-extract로 텍스트 추출 (`pdf` 피처)
//!
//! 문서 하나의 추출 실패는 해당 문서만 0페이지로 처리하며,
//! 전체 인덱싱을 중단시키지 않습니다.

#[cfg(feature = "pdf")]
pub mod pdf;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Types
// ============================================================================

/// 페이지 레코드 - 인덱스의 최소 단위
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 원본 파일 이름 (경로 제외)
    pub file: String,
    /// 페이지 번호 (1부터 시작)
    pub page: usize,
    /// 추출된 텍스트 (비어있지 않음)
    pub text: String,
}

/// 추출 에러
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {path}: {message}")]
    Pdf { path: String, message: String },

    #[error("no page extraction backend available")]
    Unavailable,
}

// ============================================================================
// PageExtractor Trait
// ============================================================================

/// 페이지 추출기 트레이트
///
/// 문서 경로를 받아 페이지별 원문 텍스트를 반환합니다.
/// 페이지 번호는 문서 내 위치 기준이므로 빈 페이지도 번호를 차지합니다.
pub trait PageExtractor {
    /// 추출 백엔드 사용 가능 여부
    fn is_available(&self) -> bool {
        true
    }

    /// 페이지별 텍스트 추출
    fn extract_pages(&self, path: &Path) -> Result<Vec<(usize, String)>, ExtractError>;
}

/// 백엔드가 없는 추출기 (`pdf` 피처 비활성화 시)
#[derive(Debug, Default)]
pub struct UnavailableExtractor;

impl PageExtractor for UnavailableExtractor {
    fn is_available(&self) -> bool {
        false
    }

    fn extract_pages(&self, _path: &Path) -> Result<Vec<(usize, String)>, ExtractError> {
        Err(ExtractError::Unavailable)
    }
}

/// 기본 추출기
#[cfg(feature = "pdf")]
pub fn default_extractor() -> Box<dyn PageExtractor> {
    Box::new(pdf::PdfExtractor)
}

/// 기본 추출기
#[cfg(not(feature = "pdf"))]
pub fn default_extractor() -> Box<dyn PageExtractor> {
    tracing::warn!("Built without the `pdf` feature; indexing is unavailable");
    Box::new(UnavailableExtractor)
}

// ============================================================================
// Page Records
// ============================================================================

/// 문서에서 페이지 레코드 생성
///
/// 공백뿐인 페이지는 제외합니다. 추출에 실패하면 경고를 남기고 `None`을 반환합니다.
pub fn extract_page_records(extractor: &dyn PageExtractor, path: &Path) -> Option<Vec<PageRecord>> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let pages = match extractor.extract_pages(path) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!("Skipping {:?}: {}", path, e);
            return None;
        }
    };

    let records: Vec<PageRecord> = pages
        .into_iter()
        .filter_map(|(page, text)| {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(PageRecord {
                file: file.clone(),
                page,
                text: text.to_string(),
            })
        })
        .collect();

    if records.is_empty() {
        tracing::warn!(
            "No text extracted from {:?}. It might be a scanned document.",
            path
        );
    }

    Some(records)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Vec<(usize, String)>);

    impl PageExtractor for FixedExtractor {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<(usize, String)>, ExtractError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_extract_page_records_drops_blank_pages() {
        let extractor = FixedExtractor(vec![
            (1, "  Section 420  ".to_string()),
            (2, " \n\t".to_string()),
            (3, "Cheating".to_string()),
        ]);

        let records = extract_page_records(&extractor, Path::new("/docs/ipc.pdf")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file, "ipc.pdf");
        assert_eq!(records[0].page, 1);
        assert_eq!(records[0].text, "Section 420");
        assert_eq!(records[1].page, 3);
    }

    #[test]
    fn test_extract_page_records_swallows_failure() {
        let records = extract_page_records(&UnavailableExtractor, Path::new("/docs/bad.pdf"));
        assert!(records.is_none());
        assert!(!UnavailableExtractor.is_available());
    }
}
