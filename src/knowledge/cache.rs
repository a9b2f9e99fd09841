//! Index Cache - 지문 기반 증분 인덱스 캐시
//!
//! 파일별 SHA-256 지문과 추출된 페이지를 JSON으로 저장합니다.
//! 지문이 같은 파일은 재추출 없이 재사용하고, 사라진 파일은 제거합니다.
//! 저장 위치: <문서 디렉토리>/.rag_index_cache.json

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::fingerprint;
use crate::extractor::{extract_page_records, PageExtractor, PageRecord};

/// 캐시 파일 이름
pub const CACHE_FILE_NAME: &str = ".rag_index_cache.json";

// ============================================================================
// Types
// ============================================================================

/// 캐시 엔트리 - 파일 하나의 지문과 페이지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 파일 내용 SHA-256 (hex)
    pub hash: String,
    /// 추출된 페이지 (페이지 순)
    pub docs: Vec<PageRecord>,
}

/// 캐시 에러
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode index cache: {0}")]
    Json(#[from] serde_json::Error),
}

/// 인덱싱 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// 새로 추출한 파일 수 (캐시 미스)
    pub processed: usize,
    /// 재사용한 파일 수 (캐시 히트)
    pub reused: usize,
    /// 제거된 파일 수
    pub deleted: usize,
    /// 결과 인덱스의 총 페이지 수
    pub total: usize,
}

/// 리빌드 결과
#[derive(Debug)]
pub struct Rebuild {
    pub cache: IndexCache,
    pub pages: Vec<PageRecord>,
    pub stats: BuildStats,
}

// ============================================================================
// IndexCache
// ============================================================================

/// 증분 인덱스 캐시 (절대 경로 -> 엔트리)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCache {
    pub files: BTreeMap<String, CacheEntry>,
}

impl IndexCache {
    /// 캐시 파일 경로
    pub fn path_for(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// 캐시 로드
    ///
    /// 파일이 없거나 손상된 경우 빈 캐시를 반환합니다 (전체 재추출).
    pub fn load(dir: &Path) -> Self {
        let path = Self::path_for(dir);

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read index cache {:?}: {}", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&raw) {
            Ok(cache) => {
                tracing::debug!("Loaded index cache with {} files", cache.files.len());
                cache
            }
            Err(e) => {
                tracing::warn!("Ignoring corrupted index cache {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// 캐시 저장
    ///
    /// 임시 파일에 쓴 뒤 rename으로 교체합니다.
    pub fn save(&self, dir: &Path) -> Result<(), CacheError> {
        let path = Self::path_for(dir);
        let tmp = dir.join(format!("{}.tmp", CACHE_FILE_NAME));

        let json = serde_json::to_string(self)?;

        std::fs::write(&tmp, json).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 증분 리빌드
    ///
    /// `files`는 스캔 순서의 절대 경로입니다. 이전 캐시는 소비되며,
    /// 결과 페이지 목록은 스캔 순서 + 페이지 순서를 따릅니다.
    pub fn rebuild(self, files: &[PathBuf], extractor: &dyn PageExtractor) -> Rebuild {
        let mut previous = self.files;
        let mut next = BTreeMap::new();
        let mut pages = Vec::new();
        let mut stats = BuildStats::default();

        let scanned: HashSet<String> = files.iter().map(|p| path_key(p)).collect();
        stats.deleted = previous.keys().filter(|k| !scanned.contains(*k)).count();

        for path in files {
            let key = path_key(path);

            let hash = match fingerprint(path) {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::warn!("Failed to fingerprint {:?}: {}", path, e);
                    stats.processed += 1;
                    continue;
                }
            };

            if let Some(entry) = previous.remove(&key) {
                if entry.hash == hash {
                    tracing::debug!("Cache hit: {:?}", path);
                    stats.reused += 1;
                    pages.extend(entry.docs.iter().cloned());
                    next.insert(key, entry);
                    continue;
                }
            }

            tracing::debug!("Cache miss: {:?}", path);
            stats.processed += 1;

            // 추출 실패 파일은 엔트리를 남기지 않아 다음 빌드에서 재시도됩니다
            if let Some(docs) = extract_page_records(extractor, path) {
                pages.extend(docs.iter().cloned());
                next.insert(key, CacheEntry { hash, docs });
            }
        }

        stats.total = pages.len();

        Rebuild {
            cache: IndexCache { files: next },
            pages,
            stats,
        }
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// ============================================================================
// Tests
// ============================================================================
