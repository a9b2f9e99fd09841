//! 하이브리드 검색 - 키워드 + 임베딩 스코어 통합
//!
//! 두 검색 결과의 스코어 스케일이 다르므로 각각 min-max 정규화한 뒤
//! (파일, 페이지) 기준으로 병합합니다.
//!
//! - 양쪽 모두 있는 페이지: `0.6 * 임베딩 + 0.4 * 키워드`
//! - 한쪽에만 있는 페이지: 정규화 스코어 그대로 유지

use std::cmp::Ordering;
use std::collections::HashMap;

use super::types::{SearchMethod, SearchResult};

/// 임베딩 스코어 가중치
pub const EMBEDDING_WEIGHT: f32 = 0.6;

/// 키워드 스코어 가중치
pub const KEYWORD_WEIGHT: f32 = 0.4;

// ============================================================================
// Normalization
// ============================================================================

/// Min-max 정규화
///
/// `(score - min) / (max - min)`. 모든 스코어가 같으면 전부 1.0이 됩니다.
pub fn normalize_scores(results: &mut [SearchResult]) {
    let Some(first) = results.first() else {
        return;
    };

    let (min, max) = results
        .iter()
        .fold((first.score, first.score), |(lo, hi), r| (lo.min(r.score), hi.max(r.score)));

    for r in results.iter_mut() {
        r.score = if max > min {
            (r.score - min) / (max - min)
        } else {
            1.0
        };
    }
}

// ============================================================================
// Fusion
// ============================================================================

/// 두 검색 결과 병합
///
/// 입력은 각각 정규화된 상태여야 합니다. 병합 순서는 임베딩 결과 다음 키워드 결과이며,
/// 최종 정렬은 안정 정렬이라 동점은 병합 순서를 따릅니다.
pub fn fuse_results(
    vector_results: Vec<SearchResult>,
    keyword_results: Vec<SearchResult>,
    top_k: usize,
) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = Vec::with_capacity(vector_results.len() + keyword_results.len());
    let mut positions: HashMap<(String, usize), usize> = HashMap::new();

    for result in vector_results {
        positions
            .entry((result.file.clone(), result.page))
            .or_insert(merged.len());
        merged.push(result);
    }

    for result in keyword_results {
        match positions.get(&(result.file.clone(), result.page)) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.score = EMBEDDING_WEIGHT * existing.score + KEYWORD_WEIGHT * result.score;
                existing.method = SearchMethod::Hybrid;
            }
            None => {
                positions.insert((result.file.clone(), result.page), merged.len());
                merged.push(result);
            }
        }
    }

    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    merged.truncate(top_k);
    merged
}

/// 정규화 + 병합
pub fn hybrid_rank(
    mut vector_results: Vec<SearchResult>,
    mut keyword_results: Vec<SearchResult>,
    top_k: usize,
) -> Vec<SearchResult> {
    normalize_scores(&mut vector_results);
    normalize_scores(&mut keyword_results);
    fuse_results(vector_results, keyword_results, top_k)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn result(file: &str, page: usize, score: f32, method: SearchMethod) -> SearchResult {
        SearchResult {
            file: file.to_string(),
            page,
            text: format!("{} p{}", file, page),
            score,
            method,
        }
    }

    fn scores(results: &[SearchResult]) -> Vec<f32> {
        results.iter().map(|r| r.score).collect()
    }

    #[test]
    fn test_normalize_min_max() {
        let mut results = vec![
            result("a.pdf", 1, 5.0, SearchMethod::Keyword),
            result("b.pdf", 1, 3.0, SearchMethod::Keyword),
            result("c.pdf", 1, 1.0, SearchMethod::Keyword),
        ];
        normalize_scores(&mut results);
        assert_eq!(scores(&results), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_normalize_degenerate_all_equal() {
        let mut results = vec![
            result("a.pdf", 1, 0.42, SearchMethod::Vector),
            result("b.pdf", 1, 0.42, SearchMethod::Vector),
        ];
        normalize_scores(&mut results);
        assert_eq!(scores(&results), vec![1.0, 1.0]);

        let mut single = vec![result("a.pdf", 1, 7.0, SearchMethod::Keyword)];
        normalize_scores(&mut single);
        assert_eq!(single[0].score, 1.0);

        let mut empty: Vec<SearchResult> = vec![];
        normalize_scores(&mut empty);
    }

    #[test]
    fn test_fuse_single_signal_keeps_score() {
        let vector = vec![
            result("a.pdf", 1, 1.0, SearchMethod::Vector),
            result("b.pdf", 2, 0.25, SearchMethod::Vector),
        ];
        let keyword = vec![result("c.pdf", 1, 1.0, SearchMethod::Keyword)];

        let fused = fuse_results(vector, keyword, 5);
        let b = fused.iter().find(|r| r.file == "b.pdf").unwrap();
        assert_eq!(b.score, 0.25);
        assert_eq!(b.method, SearchMethod::Vector);
    }

    #[test]
    fn test_fuse_both_signals_between_inputs() {
        let vector = vec![result("a.pdf", 1, 0.2, SearchMethod::Vector)];
        let keyword = vec![result("a.pdf", 1, 0.9, SearchMethod::Keyword)];

        let fused = fuse_results(vector, keyword, 3);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].method, SearchMethod::Hybrid);
        assert!((fused[0].score - (0.6 * 0.2 + 0.4 * 0.9)).abs() < 1e-6);
        assert!(fused[0].score > 0.2 && fused[0].score < 0.9);
    }

    #[test]
    fn test_fuse_same_file_different_page_not_merged() {
        let vector = vec![result("a.pdf", 1, 1.0, SearchMethod::Vector)];
        let keyword = vec![result("a.pdf", 2, 1.0, SearchMethod::Keyword)];

        let fused = fuse_results(vector, keyword, 3);
        assert_eq!(fused.len(), 2);
        // 동점은 병합 순서 (임베딩 먼저)
        assert_eq!(fused[0].page, 1);
        assert_eq!(fused[1].page, 2);
    }

    #[test]
    fn test_hybrid_rank_truncates_and_orders() {
        let vector = vec![
            result("a.pdf", 1, 0.9, SearchMethod::Vector),
            result("b.pdf", 1, 0.5, SearchMethod::Vector),
            result("c.pdf", 1, 0.1, SearchMethod::Vector),
        ];
        let keyword = vec![
            result("c.pdf", 1, 4.0, SearchMethod::Keyword),
            result("d.pdf", 1, 2.0, SearchMethod::Keyword),
        ];

        // 정규화: a=1.0 b=0.5 c=0.0 / c=1.0 d=0.0 -> c = 0.4
        let ranked = hybrid_rank(vector, keyword, 3);
        let files: Vec<_> = ranked.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert!((ranked[2].score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_hybrid_rank_empty() {
        assert!(hybrid_rank(vec![], vec![], 3).is_empty());
    }
}
