//! 검색 결과 타입

use serde::Serialize;

use crate::extractor::PageRecord;

/// 검색 방법
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchMethod {
    /// 임베딩 유사도만 사용
    Vector,
    /// 키워드 스코어만 사용
    Keyword,
    /// 두 스코어를 가중 합산
    Hybrid,
}

/// 검색 결과 (출처 파일 + 페이지)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 원본 파일 이름
    pub file: String,
    /// 페이지 번호 (1부터 시작)
    pub page: usize,
    /// 페이지 텍스트
    pub text: String,
    /// 스코어 (정규화 후 0.0 ~ 1.0)
    pub score: f32,
    /// 스코어를 만든 검색 방법
    pub method: SearchMethod,
}

impl SearchResult {
    pub(crate) fn from_record(record: &PageRecord, score: f32, method: SearchMethod) -> Self {
        Self {
            file: record.file.clone(),
            page: record.page,
            text: record.text.clone(),
            score,
            method,
        }
    }

    /// 병합 기준 식별자 (파일, 페이지)
    pub fn key(&self) -> (&str, usize) {
        (&self.file, self.page)
    }
}
