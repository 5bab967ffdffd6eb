//! The expanding-radius search state machine.
//!
//! Drives one geocode resolution, then a ladder of radius-bounded POI
//! queries, strictly sequentially, until facilities are found or the
//! ladder is exhausted. The ladder doubles as a resilience mechanism:
//! a failed rung is logged and retried wider unless it is the last.

use tracing::{debug, info, warn};

use super::session::SearchSession;
use super::{normalize, radius, rank};
use super::{AttemptOutcome, SearchAttempt, SearchOutcome};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::geocode::Geocoder;
use crate::overpass::PoiClient;

/// Coordinates one search invocation end to end.
///
/// Holds no mutable state between invocations; per-invocation state
/// lives in the [`SearchSession`] passed to [`run`](Self::run).
pub struct SearchOrchestrator<G, P> {
    geocoder: G,
    poi: P,
    config: SearchConfig,
}

impl<G: Geocoder, P: PoiClient> SearchOrchestrator<G, P> {
    pub fn new(geocoder: G, poi: P, config: SearchConfig) -> Self {
        Self {
            geocoder,
            poi,
            config,
        }
    }

    /// Run the full pipeline for one place name.
    ///
    /// Every suspend point races the session's cancellation token, so a
    /// superseded session stops making upstream calls immediately.
    pub async fn run(&self, place: &str, session: &SearchSession) -> SearchOutcome {
        // Resolving. A failure here is terminal; no query attempts are made.
        let place_match = tokio::select! {
            biased;
            () = session.cancelled() => return superseded(),
            result = self.geocoder.resolve(place) => match result {
                Ok(place_match) => place_match,
                Err(error) => {
                    warn!(place, %error, "place resolution failed");
                    return SearchOutcome::Failed { error };
                }
            },
        };

        let origin = place_match.point;
        info!(place, label = %place_match.label, lat = origin.lat, lon = origin.lon, "resolved place");

        let rungs = radius::ladder(radius::initial_radius(place_match.bbox.as_ref()));
        debug!(?rungs, "radius ladder");

        let deadline = self.config.query_deadline();
        let final_rung = rungs.len() - 1;

        // Searching. Rungs run smallest-first and never in parallel: a
        // hit at a smaller radius makes wider work pointless.
        for (index, radius_m) in rungs.into_iter().enumerate() {
            let result = tokio::select! {
                biased;
                () = session.cancelled() => return superseded(),
                result = self.poi.query(origin, radius_m, &self.config.categories, deadline) => result,
            };

            match result {
                Ok(raw) => {
                    let facilities = normalize(raw);
                    if facilities.is_empty() {
                        debug!(radius_m, "rung returned no usable facilities");
                        session.record(SearchAttempt {
                            radius_m,
                            outcome: AttemptOutcome::Empty,
                        });
                    } else {
                        info!(radius_m, count = facilities.len(), "facilities found");
                        session.record(SearchAttempt {
                            radius_m,
                            outcome: AttemptOutcome::Found(facilities.len()),
                        });
                        return SearchOutcome::Success {
                            origin,
                            facilities: rank(facilities, origin),
                            attempts: session.attempts(),
                        };
                    }
                }
                Err(error) if index < final_rung => {
                    warn!(radius_m, %error, "rung failed, widening");
                    session.record(SearchAttempt {
                        radius_m,
                        outcome: AttemptOutcome::Failed(error),
                    });
                }
                Err(error) => {
                    warn!(radius_m, %error, "final rung failed");
                    session.record(SearchAttempt {
                        radius_m,
                        outcome: AttemptOutcome::Failed(error.clone()),
                    });
                    return SearchOutcome::Failed { error };
                }
            }
        }

        info!(place, "no facilities within the widest radius");
        SearchOutcome::Exhausted {
            origin,
            attempts: session.attempts(),
        }
    }
}

fn superseded() -> SearchOutcome {
    SearchOutcome::Failed {
        error: SearchError::Superseded,
    }
}
