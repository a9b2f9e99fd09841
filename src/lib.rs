//! lexcite-rag - 로컬 PDF 근거 검색 엔진
//!
//! PDF 디렉토리를 페이지 단위로 인덱싱하고, 키워드 검색과 (선택) 임베딩 검색을
//! 결합하여 출처(파일 + 페이지)가 있는 구절을 순위대로 반환합니다.

pub mod cli;
pub mod collector;
pub mod embedding;
pub mod extractor;
pub mod knowledge;

// Re-exports
pub use collector::{fingerprint, safe_file_name, scan_documents, store_upload};
pub use embedding::{load_provider, EmbeddingProvider};
pub use extractor::{default_extractor, ExtractError, PageExtractor, PageRecord};
pub use knowledge::{
    format_citations, EngineConfig, HybridRetriever, IndexDiagnostics, SearchMethod,
    SearchResult, DEFAULT_TOP_K,
};
