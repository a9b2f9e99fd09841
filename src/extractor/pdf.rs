//! PDF 텍스트 추출 모듈
//!
//! pdf-extract 크레이트를 사용하여 PDF에서 페이지별 텍스트를 추출합니다.

use std::path::Path;

use super::{ExtractError, PageExtractor};

/// pdf-extract 기반 추출기
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PageExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<(usize, String)>, ExtractError> {
        extract_text_from_pdf(path)
    }
}

/// PDF에서 텍스트 추출
///
/// 페이지별로 텍스트를 추출하여 (페이지 번호, 텍스트) 튜플 벡터로 반환합니다.
/// 페이지 번호는 문서 내 위치 기준(1부터)이라 빈 페이지도 번호를 차지합니다.
pub fn extract_text_from_pdf(path: &Path) -> Result<Vec<(usize, String)>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    // pdf-extract는 손상된 입력에서 panic할 수 있으므로 격리
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| ExtractError::Pdf {
            path: path.display().to_string(),
            message: "extractor panicked".to_string(),
        })?
        .map_err(|e| ExtractError::Pdf {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// 페이지마다 한 줄씩 텍스트를 쓴 PDF 생성 (빈 문자열은 빈 페이지)
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                vec![]
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_extract_pages_are_numbered_by_position() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("act.pdf");
        std::fs::write(&path, build_pdf(&["alphaword", "", "betaword"])).unwrap();

        let pages = extract_text_from_pdf(&path).unwrap();
        let numbers: Vec<_> = pages.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        assert!(pages[0].1.contains("alphaword"));
        assert!(!pages[0].1.contains("betaword"));
        assert!(pages[1].1.trim().is_empty());
        assert!(pages[2].1.contains("betaword"));
    }

    #[test]
    fn test_extract_corrupt_pdf_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        assert!(extract_text_from_pdf(&path).is_err());
    }

    #[test]
    fn test_extract_missing_file_is_io_error() {
        let err = extract_text_from_pdf(Path::new("/nonexistent/missing.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}
