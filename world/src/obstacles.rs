//! Authoritative obstacle state management utilities.

use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{ArenaBounds, ObstacleId, ObstacleRejection, ObstacleSnapshot};

/// Registry that stores standing obstacles and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ObstacleRegistry {
    entries: Vec<ObstacleSnapshot>,
    next_obstacle_id: ObstacleId,
}

impl ObstacleRegistry {
    /// Creates an empty obstacle registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_obstacle_id: ObstacleId::new(0),
        }
    }

    /// Standing obstacles ordered by identifier.
    pub(crate) fn snapshots(&self) -> &[ObstacleSnapshot] {
        &self.entries
    }

    /// Validates and stores a new obstacle footprint.
    pub(crate) fn place(
        &mut self,
        bounds: &ArenaBounds,
        center: Vec2,
        half_extent: f32,
        lifetime: Duration,
    ) -> Result<ObstacleId, ObstacleRejection> {
        if !center.is_finite()
            || !half_extent.is_finite()
            || half_extent <= 0.0
            || !bounds.contains_footprint(center, half_extent)
        {
            return Err(ObstacleRejection::OutOfBounds);
        }

        if self
            .entries
            .iter()
            .any(|existing| existing.overlaps(center, half_extent))
        {
            return Err(ObstacleRejection::Overlapping);
        }

        let id = self.next_obstacle_id;
        self.next_obstacle_id = ObstacleId::new(id.get().saturating_add(1));
        self.entries.push(ObstacleSnapshot {
            id,
            center,
            half_extent,
            remaining: lifetime,
        });
        Ok(id)
    }

    /// Ages every obstacle and reports the ones whose lifetime ran out.
    pub(crate) fn age(&mut self, elapsed: Duration, expired: &mut Vec<ObstacleId>) {
        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(elapsed);
            if entry.remaining.is_zero() {
                expired.push(entry.id);
            }
        }
        self.entries.retain(|entry| !entry.remaining.is_zero());
    }
}
