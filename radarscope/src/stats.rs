//! Aggregate counts over the latest filtered snapshot.

use crate::aircraft::{CategoryGroups, MilitaryPrefixes, TrackedObject};

/// Counts recomputed after every successful poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub total: usize,
    pub with_position: usize,
    pub emergency_count: usize,
    pub military_count: usize,
    pub commercial_count: usize,
    pub helicopter_count: usize,
}

impl TrackerStats {
    /// Compute counts for a snapshot.
    ///
    /// Military airframes are counted as military only, never as commercial
    /// or helicopter.
    pub fn compute(
        objects: &[TrackedObject],
        military: &MilitaryPrefixes,
        groups: &CategoryGroups,
    ) -> Self {
        let mut stats = Self {
            total: objects.len(),
            ..Default::default()
        };

        for object in objects {
            if object.position.is_some() {
                stats.with_position += 1;
            }
            if object.is_emergency() {
                stats.emergency_count += 1;
            }

            let category = object.category.as_deref();
            if object.is_military(military) {
                stats.military_count += 1;
            } else if groups.is_helicopter(category) {
                stats.helicopter_count += 1;
            } else if groups.is_commercial(category) {
                stats.commercial_count += 1;
            }
        }

        stats
    }
}
