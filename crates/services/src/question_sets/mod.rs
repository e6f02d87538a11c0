//! Keyed resolution of shared passage/puzzle content, with a
//! process-lifetime cache.
//!
//! Question sets are immutable content, so cache writes are idempotent and
//! a late write from an abandoned fetch is harmless.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Client;

use exam_core::model::{QuestionSet, QuestionSetId};

use crate::error::QuestionSetError;

//
// ─── RESOLUTION ────────────────────────────────────────────────────────────────
//

/// Outcome of one resolve call, mirroring the lifecycle a caller renders.
#[derive(Debug)]
pub enum QuestionSetResolution {
    /// Nothing to resolve: the question references no set.
    Idle,
    /// A fetch for this id is already in flight; resolve again once it
    /// lands.
    Loading,
    Success(QuestionSet),
    Failed(QuestionSetError),
}

impl QuestionSetResolution {
    /// The resolved set, when resolution succeeded.
    #[must_use]
    pub fn question_set(&self) -> Option<&QuestionSet> {
        match self {
            Self::Success(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

//
// ─── CACHE ─────────────────────────────────────────────────────────────────────
//

enum FetchTicket {
    Cached(QuestionSet),
    InFlight,
    Begun,
}

#[derive(Default)]
struct CacheInner {
    ready: HashMap<QuestionSetId, QuestionSet>,
    in_flight: HashSet<QuestionSetId>,
}

/// Shared cache of question sets.
///
/// Constructed explicitly and injected into each resolver, so its lifetime
/// is visible (typically process-wide, surviving remounts) and tests can
/// substitute a fresh instance per case. Never evicts: the set universe of
/// one exam is small and bounded.
#[derive(Default)]
pub struct QuestionSetCache {
    inner: Mutex<CacheInner>,
}

impl QuestionSetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached set for an id, if present.
    #[must_use]
    pub fn get(&self, id: &QuestionSetId) -> Option<QuestionSet> {
        self.lock().ready.get(id).cloned()
    }

    /// Store a set under its own id.
    pub fn insert(&self, set: QuestionSet) {
        self.lock().ready.insert(set.id.clone(), set);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().ready.is_empty()
    }

    /// Atomically decide whether a fetch for `id` should start.
    fn ticket(&self, id: &QuestionSetId) -> FetchTicket {
        let mut inner = self.lock();
        if let Some(set) = inner.ready.get(id) {
            return FetchTicket::Cached(set.clone());
        }
        if !inner.in_flight.insert(id.clone()) {
            return FetchTicket::InFlight;
        }
        FetchTicket::Begun
    }

    fn complete(&self, set: QuestionSet) {
        let mut inner = self.lock();
        inner.in_flight.remove(&set.id);
        inner.ready.insert(set.id.clone(), set);
    }

    fn abort(&self, id: &QuestionSetId) {
        self.lock().in_flight.remove(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//
// ─── CONTENT SOURCE ────────────────────────────────────────────────────────────
//

/// Fetch-by-identifier source of question-set content.
#[async_trait]
pub trait QuestionSetSource: Send + Sync {
    /// Fetch one question set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError` when the request fails or the response
    /// is not a success.
    async fn fetch(&self, id: &QuestionSetId) -> Result<QuestionSet, QuestionSetError>;
}

/// HTTP content source: `GET {base_url}/question-sets/{id}`.
#[derive(Clone)]
pub struct HttpQuestionSetSource {
    client: Client,
    base_url: String,
}

impl HttpQuestionSetSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QuestionSetSource for HttpQuestionSetSource {
    async fn fetch(&self, id: &QuestionSetId) -> Result<QuestionSet, QuestionSetError> {
        let url = format!(
            "{}/question-sets/{id}",
            self.base_url.trim_end_matches('/')
        );
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSetError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

//
// ─── RESOLVER ──────────────────────────────────────────────────────────────────
//

/// Read-through resolver over the shared cache.
#[derive(Clone)]
pub struct QuestionSetResolver {
    cache: Arc<QuestionSetCache>,
    source: Arc<dyn QuestionSetSource>,
}

impl QuestionSetResolver {
    #[must_use]
    pub fn new(cache: Arc<QuestionSetCache>, source: Arc<dyn QuestionSetSource>) -> Self {
        Self { cache, source }
    }

    /// Resolve a question's set reference.
    ///
    /// An inline payload wins outright and still populates the cache, so a
    /// later reference to the same id without inline content reuses it. A
    /// cached id resolves without any fetch. Otherwise at most one fetch
    /// per id is in flight at a time; a duplicate concurrent request
    /// observes `Loading` instead of issuing a second fetch. A failed
    /// fetch leaves the cache empty for that id; retry only happens
    /// through a fresh resolve call.
    pub async fn resolve(
        &self,
        id: Option<&QuestionSetId>,
        inline: Option<QuestionSet>,
    ) -> QuestionSetResolution {
        if let Some(set) = inline {
            self.cache.insert(set.clone());
            return QuestionSetResolution::Success(set);
        }

        let Some(id) = id else {
            return QuestionSetResolution::Idle;
        };

        match self.cache.ticket(id) {
            FetchTicket::Cached(set) => QuestionSetResolution::Success(set),
            FetchTicket::InFlight => QuestionSetResolution::Loading,
            FetchTicket::Begun => match self.source.fetch(id).await {
                Ok(set) => {
                    self.cache.complete(set.clone());
                    QuestionSetResolution::Success(set)
                }
                Err(err) => {
                    self.cache.abort(id);
                    tracing::warn!(set_id = %id, error = %err, "question set fetch failed");
                    QuestionSetResolution::Failed(err)
                }
            },
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuestionSetSource for CountingSource {
        async fn fetch(&self, id: &QuestionSetId) -> Result<QuestionSet, QuestionSetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(QuestionSetError::HttpStatus(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            Ok(QuestionSet::new(id.clone(), "a passage about tides"))
        }
    }

    fn resolver(source: &Arc<CountingSource>) -> QuestionSetResolver {
        QuestionSetResolver::new(
            Arc::new(QuestionSetCache::new()),
            Arc::clone(source) as Arc<dyn QuestionSetSource>,
        )
    }

    #[tokio::test]
    async fn inline_payload_skips_fetch_and_seeds_cache() {
        let source = Arc::new(CountingSource::new(false));
        let resolver = resolver(&source);
        let set_id = QuestionSetId::new("set1");
        let inline = QuestionSet::new("set1", "passage").with_title("Tides");

        let first = resolver.resolve(Some(&set_id), Some(inline.clone())).await;
        assert_eq!(first.question_set(), Some(&inline));

        // later reference without inline content reuses the cache
        let second = resolver.resolve(Some(&set_id), None).await;
        assert!(second.is_success());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let source = Arc::new(CountingSource::new(false));
        let resolver = resolver(&source);
        let set_id = QuestionSetId::new("set2");

        assert!(resolver.resolve(Some(&set_id), None).await.is_success());
        assert!(resolver.resolve(Some(&set_id), None).await.is_success());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn missing_reference_is_idle() {
        let source = Arc::new(CountingSource::new(false));
        let resolution = resolver(&source).resolve(None, None).await;
        assert!(matches!(resolution, QuestionSetResolution::Idle));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_empty_and_allows_retry() {
        let source = Arc::new(CountingSource::new(true));
        let cache = Arc::new(QuestionSetCache::new());
        let resolver = QuestionSetResolver::new(
            Arc::clone(&cache),
            Arc::clone(&source) as Arc<dyn QuestionSetSource>,
        );
        let set_id = QuestionSetId::new("set3");

        let resolution = resolver.resolve(Some(&set_id), None).await;
        assert!(matches!(resolution, QuestionSetResolution::Failed(_)));
        assert!(cache.is_empty());

        // a fresh resolve is allowed to try again
        let resolution = resolver.resolve(Some(&set_id), None).await;
        assert!(matches!(resolution, QuestionSetResolution::Failed(_)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn duplicate_concurrent_request_observes_loading() {
        let cache = Arc::new(QuestionSetCache::new());
        let set_id = QuestionSetId::new("set4");

        // simulate the first request being in flight
        assert!(matches!(cache.ticket(&set_id), FetchTicket::Begun));
        assert!(matches!(cache.ticket(&set_id), FetchTicket::InFlight));

        let source = Arc::new(CountingSource::new(false));
        let resolver = QuestionSetResolver::new(
            Arc::clone(&cache),
            Arc::clone(&source) as Arc<dyn QuestionSetSource>,
        );
        let resolution = resolver.resolve(Some(&set_id), None).await;
        assert!(matches!(resolution, QuestionSetResolution::Loading));
        assert_eq!(source.calls(), 0);
    }
}
