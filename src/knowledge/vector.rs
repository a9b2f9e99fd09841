//! Embedding Index - 페이지 임베딩 캐시 및 코사인 유사도 검색
//!
//! 인덱스가 리빌드될 때마다 페이지별 벡터를 다시 계산하여 메모리에만 보관합니다.
//! 프로바이더 오류가 한 번이라도 나면 세션이 끝날 때까지 비활성화됩니다.

use std::cmp::Ordering;

use crate::embedding::EmbeddingProvider;
use crate::extractor::PageRecord;

use super::types::{SearchMethod, SearchResult};

/// 0으로 나누기 방지용 상수
pub const SIMILARITY_EPSILON: f32 = 1e-9;

// ============================================================================
// Types
// ============================================================================

/// 임베딩 레코드 (메모리 전용)
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub page: PageRecord,
    pub vector: Vec<f32>,
}

// ============================================================================
// EmbeddingIndex
// ============================================================================

/// 임베딩 인덱스
///
/// 프로바이더가 없으면 아무 일도 하지 않으며 검색 결과는 항상 비어있습니다.
pub struct EmbeddingIndex {
    provider: Option<Box<dyn EmbeddingProvider>>,
    records: Vec<EmbeddingRecord>,
    disabled_reason: Option<String>,
}

impl EmbeddingIndex {
    /// 새 임베딩 인덱스 생성
    pub fn new(provider: Option<Box<dyn EmbeddingProvider>>) -> Self {
        Self {
            provider,
            records: Vec::new(),
            disabled_reason: None,
        }
    }

    /// 활성 여부
    pub fn is_active(&self) -> bool {
        self.provider.is_some()
    }

    /// 비활성화 사유 (오류로 꺼진 경우)
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    /// 보관 중인 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 레코드 비우기
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// 전체 페이지 임베딩 재계산
    pub fn rebuild(&mut self, pages: &[PageRecord]) {
        self.records.clear();

        let Some(provider) = self.provider.as_ref() else {
            return;
        };

        let texts: Vec<String> = pages.iter().map(|p| p.text.clone()).collect();

        match provider.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == pages.len() => {
                self.records = pages
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(page, vector)| EmbeddingRecord { page, vector })
                    .collect();
                tracing::info!("Embedded {} pages with {}", self.records.len(), provider.name());
            }
            Ok(vectors) => {
                let reason = format!(
                    "provider returned {} vectors for {} pages",
                    vectors.len(),
                    pages.len()
                );
                self.disable(reason);
            }
            Err(e) => self.disable(format!("embedding generation failed: {}", e)),
        }
    }

    /// 코사인 유사도 검색
    ///
    /// 쿼리는 한 번만 임베딩하며, 유사도 내림차순 상위 `top_k`를 반환합니다.
    pub fn search(&mut self, query: &str, top_k: usize) -> Vec<SearchResult> {
        if self.records.is_empty() || top_k == 0 {
            return vec![];
        }

        let Some(provider) = self.provider.as_ref() else {
            return vec![];
        };

        let query_vector = match provider.embed(query) {
            Ok(v) => v,
            Err(e) => {
                self.disable(format!("query embedding failed: {}", e));
                return vec![];
            }
        };

        let mut scored: Vec<SearchResult> = self
            .records
            .iter()
            .map(|r| {
                let sim = cosine_similarity(&query_vector, &r.vector);
                SearchResult::from_record(&r.page, sim, SearchMethod::Vector)
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    fn disable(&mut self, reason: String) {
        tracing::warn!("Disabling embeddings for this session: {}", reason);
        self.provider = None;
        self.records.clear();
        self.disabled_reason = Some(reason);
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// 코사인 유사도 계산
///
/// `dot(a, b) / (|a| * |b| + ε)`. 길이가 다르거나 비어있으면 0.0입니다.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot_product / (norm_a * norm_b + SIMILARITY_EPSILON)
}

// ============================================================================
// Tests
// ============================================================================
