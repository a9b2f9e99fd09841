//! Keyword Scorer - 토큰 빈도 기반 키워드 검색
//!
//! 외부 의존성 없이 항상 사용 가능한 결정적 검색입니다.
//! 쿼리 토큰이 페이지 텍스트에 등장한 횟수의 합을 스코어로 사용합니다.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use super::types::{SearchResult, SearchMethod};
use crate::extractor::PageRecord;

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("Invalid regex"))
}

/// 쿼리 토큰화
///
/// 소문자로 변환한 뒤 영숫자 연속 구간만 토큰으로 취합니다.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 키워드 검색
///
/// 스코어가 0인 페이지는 제외하며, 동점은 인덱스 순서를 유지합니다 (안정 정렬).
pub fn keyword_search(pages: &[PageRecord], query: &str, top_k: usize) -> Vec<SearchResult> {
    let tokens = tokenize(query);
    if tokens.is_empty() || top_k == 0 {
        return vec![];
    }

    let mut scored: Vec<SearchResult> = pages
        .iter()
        .filter_map(|page| {
            let text = page.text.to_lowercase();
            let score: usize = tokens.iter().map(|t| text.matches(t.as_str()).count()).sum();

            (score > 0).then(|| SearchResult::from_record(page, score as f32, SearchMethod::Keyword))
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn page(file: &str, page: usize, text: &str) -> PageRecord {
        PageRecord {
            file: file.to_string(),
            page,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Penalty for cheating?"), vec!["penalty", "for", "cheating"]);
        assert_eq!(tokenize("IPC-420/BNS_318"), vec!["ipc", "420", "bns", "318"]);
        assert!(tokenize(" ?! ").is_empty());
    }

    #[test]
    fn test_keyword_scores_sum_occurrences() {
        let pages = vec![
            page("a.pdf", 1, "Bail bail BAIL and more bail. Bail!"),
            page("a.pdf", 2, "no match here"),
            page("b.pdf", 1, "anticipatory bail"),
        ];

        let results = keyword_search(&pages, "bail", 10);
        assert_eq!(results.len(), 2);
        assert_eq!((results[0].file.as_str(), results[0].score), ("a.pdf", 5.0));
        assert_eq!((results[1].file.as_str(), results[1].score), ("b.pdf", 1.0));
    }

    #[test]
    fn test_keyword_ties_keep_index_order() {
        let pages = vec![
            page("c.pdf", 1, "theft"),
            page("a.pdf", 1, "theft"),
            page("b.pdf", 1, "theft"),
        ];

        let first = keyword_search(&pages, "theft", 3);
        let files: Vec<_> = first.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["c.pdf", "a.pdf", "b.pdf"]);

        let second = keyword_search(&pages, "theft", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyword_empty_tokens_and_top_k() {
        let pages = vec![page("a.pdf", 1, "murder"), page("b.pdf", 1, "murder murder")];

        assert!(keyword_search(&pages, "...", 3).is_empty());
        assert!(keyword_search(&pages, "murder", 0).is_empty());

        let top = keyword_search(&pages, "murder", 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].file, "b.pdf");
    }
}
