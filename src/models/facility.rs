//! Canonical facility records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::element::ElementKind;
use super::geo::GeoPoint;

/// A normalized facility, the only record that survives the pipeline.
///
/// Identity is the composite `(kind, id)`: the provider's numeric ids are
/// only unique within one geometry kind. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub kind: ElementKind,
    pub id: i64,
    pub location: GeoPoint,
    pub tags: HashMap<String, String>,
}

impl Facility {
    pub fn new(
        kind: ElementKind,
        id: i64,
        location: GeoPoint,
        tags: HashMap<String, String>,
    ) -> Self {
        Self {
            kind,
            id,
            location,
            tags,
        }
    }

    /// Unique source identifier: "{kind}/{id}"
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    /// Facility name from tags, if tagged with one.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }
}
