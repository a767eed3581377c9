use serde::Serialize;

use crate::parser::classify::MovementType;

/// One legal notice cut out of a gazette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub process_number: String,
    pub raw_text: String,
    /// Carried for exact-duplicate checks; grouping keys on `process_number` only.
    pub normalized_text: String,
    pub movement_type: MovementType,
    pub header: String,
    pub origin: String,
    pub position: String,
    /// Descriptors of the other occurrences folded into this one. Only
    /// non-empty on canonical records coming out of the grouper.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_of: Vec<String>,
}

impl Publication {
    /// `"{position} ({origin}) - Tipo: {movement_type}"`, with blanks as `N/A`.
    pub fn descriptor(&self) -> String {
        format!(
            "{} ({}) - Tipo: {}",
            or_na(&self.position),
            or_na(&self.origin),
            or_na(self.movement_type.label()),
        )
    }
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() {
        "N/A"
    } else {
        s
    }
}

/// Output of the grouper, handed to the report renderers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Consolidated {
    /// Canonical records sorted by `(process_number, origin)`.
    pub publications: Vec<Publication>,
    /// Every partition with more than one member, in first-seen order.
    pub duplicate_groups: Vec<Vec<Publication>>,
}
