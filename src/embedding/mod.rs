//! 임베딩 모듈 - 로컬 모델을 통한 텍스트 벡터화
//!
//! 페이지 텍스트와 쿼리를 고정 길이 벡터로 변환합니다.
//! 시맨틱 검색은 선택 기능이며, 모델을 불러올 수 없으면 키워드 검색만 사용합니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let config = EngineConfig { embeddings_enabled: true, ..Default::default() };
//! if let Some(embedder) = load_provider(&config) {
//!     let vector = embedder.embed("punishment for cheating")?;
//! }
//! ```

use anyhow::Result;

use crate::knowledge::EngineConfig;

/// 기본 로컬 모델 이름
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// 기본 임베딩 차원 (all-MiniLM-L6-v2)
pub const DEFAULT_DIMENSION: usize = 384;

/// 배치 임베딩 크기
#[cfg_attr(not(feature = "local-embeddings"), allow(dead_code))]
const EMBED_BATCH_SIZE: usize = 32;

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// 임베딩 프로바이더 트레이트
///
/// 텍스트를 벡터로 변환하는 인터페이스입니다. 한 번 생성된 뒤에는 읽기 전용으로 재사용됩니다.
pub trait EmbeddingProvider {
    /// 배치 임베딩
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// 단일 텍스트 임베딩 (기본 구현: 배치 호출)
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding provider returned no vector"))
    }

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Local Embedding (fastembed)
// ============================================================================

/// fastembed 기반 로컬 임베딩 구현체
///
/// fastembed의 `embed`가 `&mut self`를 요구하므로 Mutex로 감쌉니다.
#[cfg(feature = "local-embeddings")]
pub struct LocalEmbedding {
    model: std::sync::Mutex<fastembed::TextEmbedding>,
}

#[cfg(feature = "local-embeddings")]
impl LocalEmbedding {
    /// 기본 모델(all-MiniLM-L6-v2) 로드
    pub fn new() -> Result<Self> {
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize local embedding model: {}", e))?;

        Ok(Self {
            model: std::sync::Mutex::new(model),
        })
    }
}

#[cfg(feature = "local-embeddings")]
impl EmbeddingProvider for LocalEmbedding {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let vectors = model
            .embed(texts.to_vec(), Some(EMBED_BATCH_SIZE))
            .map_err(|e| anyhow::anyhow!("Local embedding failed: {}", e))?;

        check_dimension(&vectors, DEFAULT_DIMENSION)?;
        Ok(vectors)
    }

    fn name(&self) -> &str {
        DEFAULT_MODEL
    }
}

/// 모든 벡터가 모델 차원과 같은지 확인
#[cfg_attr(not(feature = "local-embeddings"), allow(dead_code))]
fn check_dimension(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    if let Some(v) = vectors.iter().find(|v| v.len() != expected) {
        anyhow::bail!(
            "Embedding dimension mismatch: expected {}, got {}",
            expected,
            v.len()
        );
    }
    Ok(())
}

// ============================================================================
// Provider Loading
// ============================================================================

/// 설정에 따라 임베딩 프로바이더 로드
///
/// 설정이 꺼져 있거나 모델을 불러올 수 없으면 `None`을 반환합니다.
pub fn load_provider(config: &EngineConfig) -> Option<Box<dyn EmbeddingProvider>> {
    if !config.embeddings_enabled {
        tracing::debug!("Embeddings disabled by configuration");
        return None;
    }

    load_local_provider()
}

#[cfg(feature = "local-embeddings")]
fn load_local_provider() -> Option<Box<dyn EmbeddingProvider>> {
    match LocalEmbedding::new() {
        Ok(provider) => {
            tracing::info!("Loaded embedding model: {}", DEFAULT_MODEL);
            Some(Box::new(provider))
        }
        Err(e) => {
            tracing::warn!("Embedding model unavailable, using keyword search only: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "local-embeddings"))]
fn load_local_provider() -> Option<Box<dyn EmbeddingProvider>> {
    tracing::warn!(
        "Embeddings requested but built without `local-embeddings`; using keyword search only"
    );
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingProvider;

    impl EmbeddingProvider for CountingProvider {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_embed_uses_batch() {
        let v = CountingProvider.embed("bail").unwrap();
        assert_eq!(v, vec![4.0, 1.0]);
    }

    #[test]
    fn test_check_dimension() {
        let good = vec![vec![0.0; DEFAULT_DIMENSION]; 2];
        assert!(check_dimension(&good, DEFAULT_DIMENSION).is_ok());
        assert!(check_dimension(&[], DEFAULT_DIMENSION).is_ok());

        let bad = vec![vec![0.0; DEFAULT_DIMENSION], vec![0.0; 768]];
        let err = check_dimension(&bad, DEFAULT_DIMENSION).unwrap_err();
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_load_provider_disabled() {
        let config = EngineConfig {
            embeddings_enabled: false,
            ..Default::default()
        };
        assert!(load_provider(&config).is_none());
    }
}
