pub mod classify;
pub mod group;
pub mod normalize;
pub mod segment;

use rayon::prelude::*;
use tracing::info;

use crate::record::{Consolidated, Publication};
use crate::sources::Source;
use classify::Classifier;

/// Segment and classify one gazette.
pub fn process_source(source: &Source, classifier: &Classifier) -> Vec<Publication> {
    let publications = segment::segment(&source.text, &source.origin, classifier);
    if publications.is_empty() {
        info!(origin = %source.origin, "no publications recognised in source");
    }
    publications
}

/// Segment sources in parallel; output keeps the input source order.
pub fn process_sources(sources: &[Source], classifier: &Classifier) -> Vec<Publication> {
    sources
        .par_iter()
        .map(|s| process_source(s, classifier))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Grouping needs every source's records, so it runs after all segmentation.
pub fn consolidate(publications: &[Publication]) -> Consolidated {
    let out = group::group(publications);
    info!(
        publications = publications.len(),
        canonical = out.publications.len(),
        duplicate_groups = out.duplicate_groups.len(),
        "consolidated"
    );
    out
}
