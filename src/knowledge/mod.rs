//! Knowledge 모듈 - 페이지 단위 하이브리드 검색 인덱스
//!
//! - Cache: 파일 지문 기반 증분 인덱스 캐시 (JSON)
//! - Keyword: 토큰 빈도 키워드 검색
//! - Vector: 임베딩 코사인 유사도 검색 (선택)
//! - Hybrid: min-max 정규화 후 가중 합산으로 두 검색 결과 통합
//! - Retriever: 위 구성요소를 소유하는 엔진

mod cache;
mod citation;
mod hybrid;
mod keyword;
mod retriever;
mod types;
mod vector;

// Re-exports
pub use cache::{BuildStats, CacheEntry, CacheError, IndexCache, Rebuild, CACHE_FILE_NAME};
pub use citation::{format_citations, MAX_EXCERPT_CHARS};
pub use hybrid::{fuse_results, hybrid_rank, normalize_scores, EMBEDDING_WEIGHT, KEYWORD_WEIGHT};
pub use keyword::{keyword_search, tokenize};
pub use retriever::{
    EngineConfig, HybridRetriever, IndexDiagnostics, DEFAULT_DOCS_DIR, DEFAULT_TOP_K,
    ENV_DOCS_DIR, ENV_USE_EMBEDDINGS,
};
pub use types::{SearchMethod, SearchResult};
pub use vector::{cosine_similarity, EmbeddingIndex, EmbeddingRecord, SIMILARITY_EPSILON};
