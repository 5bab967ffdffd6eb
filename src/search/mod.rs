//! Search orchestration: radius ladder, normalization, ranking, sessions.

mod normalize;
mod orchestrator;
mod radius;
mod rank;
mod session;

pub use normalize::normalize;
pub use orchestrator::SearchOrchestrator;
pub use radius::{initial_radius, ladder, DEFAULT_RADIUS_M, MAX_RADIUS_M};
pub use rank::rank;
pub use session::{SearchCoordinator, SearchSession};

use crate::error::SearchError;
use crate::models::{Facility, GeoPoint};

/// One rung of the retry ladder, as executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAttempt {
    pub radius_m: u32,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The rung answered successfully with zero usable facilities.
    Empty,
    /// The rung produced this many facilities.
    Found(usize),
    /// The rung failed.
    Failed(SearchError),
}

/// Terminal outcome of one search invocation.
///
/// Zero matches everywhere is `Exhausted`, a success-shaped value; only
/// a resolution failure or a dead final rung produces `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success {
        origin: GeoPoint,
        facilities: Vec<Facility>,
        attempts: Vec<SearchAttempt>,
    },
    Exhausted {
        origin: GeoPoint,
        attempts: Vec<SearchAttempt>,
    },
    Failed {
        error: SearchError,
    },
}
