use std::collections::HashMap;

use super::segment::is_process_number;
use crate::record::{Consolidated, Publication};

/// Fold publications sharing a process number into one canonical record.
///
/// Each partition is ordered by origin; the first member is copied out as
/// canonical and the rest become its `duplicate_of` descriptors. Partitions
/// with more than one member are also kept whole in `duplicate_groups`.
pub fn group(publications: &[Publication]) -> Consolidated {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<Vec<&Publication>> = Vec::new();

    for p in publications {
        debug_assert!(is_process_number(&p.process_number), "bad process number {}", p.process_number);
        let slot = *index.entry(p.process_number.as_str()).or_insert_with(|| {
            partitions.push(Vec::new());
            partitions.len() - 1
        });
        partitions[slot].push(p);
    }

    let mut canonical = Vec::with_capacity(partitions.len());
    let mut duplicate_groups = Vec::new();

    for mut members in partitions {
        members.sort_by(|a, b| a.origin.cmp(&b.origin));

        let mut first = members[0].clone();
        first.duplicate_of = members[1..].iter().map(|p| p.descriptor()).collect();
        canonical.push(first);

        if members.len() > 1 {
            duplicate_groups.push(members.into_iter().cloned().collect());
        }
    }

    canonical.sort_by(|a, b| {
        (a.process_number.as_str(), a.origin.as_str()).cmp(&(b.process_number.as_str(), b.origin.as_str()))
    });

    Consolidated {
        publications: canonical,
        duplicate_groups,
    }
}
