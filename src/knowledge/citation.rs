//! 검색 결과를 마크다운 인용문으로 변환

use std::fmt::Write;

use super::types::SearchResult;

/// 인용 본문 최대 문자 수
pub const MAX_EXCERPT_CHARS: usize = 600;

/// 마크다운 인용 목록 생성
///
/// 결과마다 `**파일** (page N, score S)` 제목과 본문 인용 블록을 출력합니다.
pub fn format_citations(results: &[SearchResult]) -> String {
    let mut out = String::new();

    for (i, r) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let _ = writeln!(out, "**{}** (page {}, score {:.2})", r.file, r.page, r.score);
        out.push('\n');

        for line in excerpt(&r.text, MAX_EXCERPT_CHARS).lines() {
            let _ = writeln!(out, "> {}", line);
        }
    }

    out
}

/// 문자 경계 기준으로 자르고 잘린 경우 `…`를 붙입니다
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
