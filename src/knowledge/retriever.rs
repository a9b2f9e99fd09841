//! 하이브리드 검색기 - 인덱싱과 검색을 소유하는 엔진
//!
//! 프로세스 단위 상태(페이지 인덱스, 임베딩, 마지막 빌드 통계)를 한 객체가 소유합니다.
//! 리빌드는 새 인덱스와 캐시 파일을 모두 만든 뒤 한 번에 교체하므로,
//! 읽는 쪽은 리빌드 전 또는 후 상태만 보게 됩니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::collector::{absolute, scan_documents};
use crate::embedding::{load_provider, EmbeddingProvider};
use crate::extractor::{default_extractor, PageExtractor, PageRecord};

use super::cache::{BuildStats, IndexCache};
use super::hybrid::hybrid_rank;
use super::keyword::keyword_search;
use super::types::SearchResult;
use super::vector::EmbeddingIndex;

/// 기본 결과 개수
pub const DEFAULT_TOP_K: usize = 3;

/// 기본 문서 디렉토리
pub const DEFAULT_DOCS_DIR: &str = "law_pdfs";

/// 임베딩 사용 환경변수 ("1"이면 사용)
pub const ENV_USE_EMBEDDINGS: &str = "LTA_USE_EMBEDDINGS";

/// 문서 디렉토리 환경변수
pub const ENV_DOCS_DIR: &str = "LTA_DOCS_DIR";

// ============================================================================
// Config
// ============================================================================

/// 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// 임베딩 검색 사용 여부
    pub embeddings_enabled: bool,
    /// 첫 검색 시 자동 인덱싱할 디렉토리
    pub docs_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embeddings_enabled: false,
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
        }
    }
}

impl EngineConfig {
    /// 환경변수에서 설정 로드
    ///
    /// `LTA_USE_EMBEDDINGS=1`이면 임베딩 사용, `LTA_DOCS_DIR`로 디렉토리 지정.
    pub fn from_env() -> Self {
        let embeddings_enabled = std::env::var(ENV_USE_EMBEDDINGS)
            .map(|v| v == "1")
            .unwrap_or(false);

        let docs_dir = std::env::var(ENV_DOCS_DIR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR));

        Self {
            embeddings_enabled,
            docs_dir,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// 마지막 인덱싱 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexDiagnostics {
    /// 새로 추출한 파일 수
    pub processed: usize,
    /// 캐시에서 재사용한 파일 수
    pub reused: usize,
    /// 제거된 파일 수
    pub deleted: usize,
    /// 인덱스 총 페이지 수
    pub total: usize,
    /// 임베딩 검색 활성 여부
    pub embeddings_active: bool,
}

impl IndexDiagnostics {
    fn from_build(stats: BuildStats, embeddings_active: bool) -> Self {
        Self {
            processed: stats.processed,
            reused: stats.reused,
            deleted: stats.deleted,
            total: stats.total,
            embeddings_active,
        }
    }
}

// ============================================================================
// HybridRetriever
// ============================================================================

/// 하이브리드 검색기
///
/// 키워드 검색은 항상, 임베딩 검색은 설정과 모델이 모두 준비된 경우에만 사용합니다.
pub struct HybridRetriever {
    config: EngineConfig,
    extractor: Box<dyn PageExtractor>,
    index: Arc<[PageRecord]>,
    embeddings: EmbeddingIndex,
    diagnostics: IndexDiagnostics,
    loaded: bool,
}

impl HybridRetriever {
    /// 설정으로 생성 (기본 추출기, 설정에 따른 임베딩 모델)
    pub fn new(config: EngineConfig) -> Self {
        let provider = load_provider(&config);
        Self::with_components(config, default_extractor(), provider)
    }

    /// 환경변수 설정으로 생성
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    /// 추출기와 임베딩 프로바이더를 지정하여 생성
    ///
    /// 설정에서 임베딩이 꺼져 있으면 `provider`는 무시됩니다.
    pub fn with_components(
        config: EngineConfig,
        extractor: Box<dyn PageExtractor>,
        provider: Option<Box<dyn EmbeddingProvider>>,
    ) -> Self {
        let provider = provider.filter(|_| config.embeddings_enabled);
        let embeddings = EmbeddingIndex::new(provider);
        let diagnostics = IndexDiagnostics {
            embeddings_active: embeddings.is_active(),
            ..Default::default()
        };

        Self {
            config,
            extractor,
            index: Arc::from(Vec::new()),
            embeddings,
            diagnostics,
            loaded: false,
        }
    }

    /// 디렉토리 인덱싱 (증분)
    ///
    /// 추출 백엔드가 없을 때만 `false`를 반환합니다.
    pub fn index(&mut self, dir: &Path) -> bool {
        let files = scan_documents(dir);

        if !self.extractor.is_available() {
            tracing::warn!("Page extraction backend unavailable; index not built");
            return false;
        }

        let dir = absolute(dir);
        let rebuild = IndexCache::load(&dir).rebuild(&files, self.extractor.as_ref());

        if let Err(e) = rebuild.cache.save(&dir) {
            tracing::warn!("Failed to persist index cache: {}", e);
        }

        let pages: Arc<[PageRecord]> = Arc::from(rebuild.pages);
        self.embeddings.rebuild(&pages);

        self.index = pages;
        self.loaded = true;
        self.diagnostics = IndexDiagnostics::from_build(rebuild.stats, self.embeddings.is_active());

        tracing::info!(
            "Indexed {:?}: processed={}, reused={}, deleted={}, pages={}",
            dir,
            self.diagnostics.processed,
            self.diagnostics.reused,
            self.diagnostics.deleted,
            self.diagnostics.total
        );

        true
    }

    /// 문서 추가 후 해당 디렉토리 재인덱싱
    pub fn add_document(&mut self, path: &Path) -> bool {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.config.docs_dir.clone(),
        };

        self.index(&dir)
    }

    /// 하이브리드 검색
    ///
    /// 빈 쿼리, `top_k == 0`, 결과 없음은 모두 `None`입니다.
    /// 아직 인덱싱한 적이 없으면 설정된 문서 디렉토리를 먼저 인덱싱합니다.
    pub fn search(&mut self, query: &str, top_k: usize) -> Option<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() || top_k == 0 {
            return None;
        }

        if !self.loaded {
            let dir = self.config.docs_dir.clone();
            self.index(&dir);
        }

        if self.index.is_empty() {
            return None;
        }

        let vector_results = self.embeddings.search(query, top_k);
        let keyword_results = keyword_search(&self.index, query, top_k);

        let results = hybrid_rank(vector_results, keyword_results, top_k);
        (!results.is_empty()).then_some(results)
    }

    /// 마지막 인덱싱 통계
    pub fn diagnostics(&self) -> IndexDiagnostics {
        IndexDiagnostics {
            embeddings_active: self.embeddings.is_active(),
            ..self.diagnostics
        }
    }

    /// 임베딩이 꺼진 사유 (세션 중 오류로 비활성화된 경우)
    pub fn embeddings_disabled_reason(&self) -> Option<&str> {
        self.embeddings.disabled_reason()
    }

    /// 인덱스 초기화
    ///
    /// 초기화 후에는 자동 인덱싱을 하지 않습니다.
    pub fn clear_index(&mut self) {
        self.index = Arc::from(Vec::new());
        self.embeddings.clear();
        self.diagnostics = IndexDiagnostics {
            embeddings_active: self.embeddings.is_active(),
            ..Default::default()
        };
        self.loaded = true;
    }

    /// 현재 페이지 인덱스
    pub fn pages(&self) -> Arc<[PageRecord]> {
        Arc::clone(&self.index)
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ============================================================================
// Tests
// ============================================================================
