//! Per-invocation session state and supersede bookkeeping.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use super::orchestrator::SearchOrchestrator;
use super::{SearchAttempt, SearchOutcome};
use crate::error::SearchError;
use crate::geocode::Geocoder;
use crate::overpass::PoiClient;

/// State owned by exactly one orchestrator invocation: a cancellation
/// token and the attempts made so far.
pub struct SearchSession {
    id: Uuid,
    token: CancellationToken,
    attempts: std::sync::Mutex<Vec<SearchAttempt>>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
            attempts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel this session's pending work.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the session is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub(crate) fn record(&self, attempt: SearchAttempt) {
        self.attempts
            .lock()
            .expect("attempt list poisoned")
            .push(attempt);
    }

    pub fn attempts(&self) -> Vec<SearchAttempt> {
        self.attempts
            .lock()
            .expect("attempt list poisoned")
            .clone()
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Supersede-safe entry point for one logical caller.
///
/// Starting a new search cancels any still-running predecessor, and a
/// superseded invocation's pipeline result is discarded rather than
/// delivered: only the most recent invocation can deliver.
pub struct SearchCoordinator<G, P> {
    orchestrator: SearchOrchestrator<G, P>,
    current: Mutex<Option<Arc<SearchSession>>>,
}

impl<G: Geocoder, P: PoiClient> SearchCoordinator<G, P> {
    pub fn new(orchestrator: SearchOrchestrator<G, P>) -> Self {
        Self {
            orchestrator,
            current: Mutex::new(None),
        }
    }

    /// Run a search, superseding any still-running predecessor.
    ///
    /// Resolves exactly once; a superseded invocation resolves with
    /// `Failed{Superseded}`.
    pub async fn search(&self, place: &str) -> SearchOutcome {
        let session = Arc::new(SearchSession::new());

        {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.replace(session.clone()) {
                previous.cancel();
            }
        }

        let outcome = self.orchestrator.run(place, &session).await;

        let mut current = self.current.lock().await;
        let is_current = current.as_ref().map(|active| active.id()) == Some(session.id());
        if !is_current || session.is_cancelled() {
            return SearchOutcome::Failed {
                error: SearchError::Superseded,
            };
        }
        *current = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::config::SearchConfig;
    use crate::geocode::ResolvedPlace;
    use crate::models::{ElementKind, GeoPoint, RawElement};

    fn resolved() -> ResolvedPlace {
        ResolvedPlace {
            point: GeoPoint::new(45.76, 4.84),
            bbox: None,
            label: "somewhere".to_string(),
        }
    }

    /// First call parks forever (until cancelled); later calls resolve.
    struct StallingGeocoder {
        entered: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Geocoder for StallingGeocoder {
        async fn resolve(&self, _place: &str) -> Result<ResolvedPlace, SearchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.entered.notify_one();
                std::future::pending::<()>().await;
                unreachable!();
            }
            Ok(resolved())
        }
    }

    struct CountingPoi {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PoiClient for CountingPoi {
        async fn query(
            &self,
            _origin: GeoPoint,
            _radius_m: u32,
            _categories: &[String],
            _deadline: std::time::Duration,
        ) -> Result<Vec<RawElement>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RawElement::Point {
                kind: ElementKind::Node,
                id: 1,
                lat: 45.77,
                lon: 4.85,
                tags: HashMap::new(),
            }])
        }
    }

    #[tokio::test]
    async fn test_supersede_delivers_only_the_newest_outcome() {
        let entered = Arc::new(Notify::new());
        let geocoder_calls = Arc::new(AtomicUsize::new(0));
        let poi_calls = Arc::new(AtomicUsize::new(0));

        let coordinator = Arc::new(SearchCoordinator::new(SearchOrchestrator::new(
            StallingGeocoder {
                entered: entered.clone(),
                calls: geocoder_calls.clone(),
            },
            CountingPoi {
                calls: poi_calls.clone(),
            },
            SearchConfig::default(),
        )));

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.search("Paris").await }
        });

        // Make sure the first invocation is in flight before superseding it.
        entered.notified().await;
        let second = coordinator.search("Lyon").await;

        assert!(matches!(second, SearchOutcome::Success { .. }));
        assert_eq!(
            first.await.unwrap(),
            SearchOutcome::Failed {
                error: SearchError::Superseded
            }
        );
        // The superseded session never reached the POI stage.
        assert_eq!(geocoder_calls.load(Ordering::SeqCst), 2);
        assert_eq!(poi_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sequential_searches_both_deliver() {
        let entered = Arc::new(Notify::new());
        let geocoder_calls = Arc::new(AtomicUsize::new(0));
        let poi_calls = Arc::new(AtomicUsize::new(0));

        // Skip the stalling first call by pre-incrementing.
        geocoder_calls.fetch_add(1, Ordering::SeqCst);

        let coordinator = SearchCoordinator::new(SearchOrchestrator::new(
            StallingGeocoder {
                entered,
                calls: geocoder_calls,
            },
            CountingPoi { calls: poi_calls },
            SearchConfig::default(),
        ));

        assert!(matches!(
            coordinator.search("Paris").await,
            SearchOutcome::Success { .. }
        ));
        assert!(matches!(
            coordinator.search("Lyon").await,
            SearchOutcome::Success { .. }
        ));
    }
}
