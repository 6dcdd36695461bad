//! Rebellion objectives.
//!
//! Stasis pods to open and control terminals to sabotage. The tracker reads
//! the instances from the scene when the session is built, activates them
//! when the player chooses to rebel, and reports fractional progress as they
//! are completed.

mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};
use survival_rules::{EventBus, GameEvent, ObjectiveCategory};
use tracing::{debug, info, warn};

use crate::world::World;

/// Result of a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectiveUpdate {
    /// Unknown, inactive, or already completed. Nothing changed.
    Ignored,
    /// One more instance completed.
    Progressed { progress: f32 },
    /// The last instance completed. Reported once per session.
    AllComplete,
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: ObjectiveCategory,
    pub completed: usize,
    pub total: usize,
}

/// Read-only view of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSnapshot {
    pub active: bool,
    pub progress: f32,
    pub completed: usize,
    pub total: usize,
    pub categories: Vec<CategoryProgress>,
}

#[derive(Debug)]
pub struct ObjectiveTracker {
    registry: ObjectiveRegistry,
    bus: EventBus,
    active: bool,
    progress: f32,
    completion_signalled: bool,
}

impl ObjectiveTracker {
    pub fn new(registry: ObjectiveRegistry, bus: EventBus) -> Self {
        Self {
            registry,
            bus,
            active: false,
            progress: 0.0,
            completion_signalled: false,
        }
    }

    /// Read every category's instances from the scene.
    pub fn from_world(world: &dyn World, bus: EventBus) -> Self {
        let mut registry = ObjectiveRegistry::new();
        for category in ObjectiveCategory::ALL {
            for id in world.objective_instances(category) {
                if !registry.register(category, id) {
                    warn!(%id, ?category, "objective reported twice, ignoring");
                }
            }
        }
        debug!(total = registry.total(), "objectives registered");
        Self::new(registry, bus)
    }

    /// Make every instance completable and tell the scene to show them.
    pub fn activate_all(&mut self, world: &mut dyn World) {
        if self.active {
            return;
        }
        self.active = true;

        for instance in self.registry.iter_mut() {
            instance.active = true;
            world.set_objective_active(instance.id, true);
        }

        if self.registry.is_empty() {
            warn!("rebellion started with no objectives in the scene");
        } else {
            info!(total = self.registry.total(), "rebellion objectives activated");
        }
    }

    /// Mark an instance completed.
    pub fn complete_objective(
        &mut self,
        category: ObjectiveCategory,
        id: ObjectiveId,
    ) -> ObjectiveUpdate {
        let Some(instance) = self.registry.get_mut(id) else {
            debug!(%id, "unknown objective");
            return ObjectiveUpdate::Ignored;
        };
        if instance.category != category {
            debug!(%id, ?category, "objective category mismatch");
            return ObjectiveUpdate::Ignored;
        }
        if !instance.active || instance.completed {
            debug!(%id, active = instance.active, "objective not completable");
            return ObjectiveUpdate::Ignored;
        }
        instance.completed = true;
        debug!(%id, ?category, text = instance.interaction_text(), "objective completed");

        let progress = self.compute_progress();
        if progress != self.progress {
            self.progress = progress;
            self.bus
                .publish(GameEvent::RebellionProgressChanged { progress });
        }

        let total = self.registry.total();
        if total > 0 && self.registry.completed() == total && !self.completion_signalled {
            self.completion_signalled = true;
            info!(total, "all rebellion objectives complete");
            return ObjectiveUpdate::AllComplete;
        }
        ObjectiveUpdate::Progressed { progress }
    }

    fn compute_progress(&self) -> f32 {
        let total = self.registry.total();
        if total == 0 {
            return 0.0;
        }
        self.registry.completed() as f32 / total as f32
    }

    /// Completed fraction in `[0, 1]`. Zero when there are no objectives.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn total(&self) -> usize {
        self.registry.total()
    }

    pub fn completed(&self) -> usize {
        self.registry.completed()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.completion_signalled
    }

    pub fn registry(&self) -> &ObjectiveRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> ObjectiveSnapshot {
        ObjectiveSnapshot {
            active: self.active,
            progress: self.progress,
            completed: self.completed(),
            total: self.total(),
            categories: ObjectiveCategory::ALL
                .into_iter()
                .map(|category| CategoryProgress {
                    category,
                    completed: self.registry.completed_in(category),
                    total: self.registry.total_in(category),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::InMemoryWorld;
    use survival_rules::EventLog;

    fn tracker(pods: usize, terminals: usize) -> (ObjectiveTracker, InMemoryWorld, EventLog) {
        let world = InMemoryWorld::new()
            .with_objectives(ObjectiveCategory::StasisPod, pods)
            .with_objectives(ObjectiveCategory::ControlTerminal, terminals);
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        (ObjectiveTracker::from_world(&world, bus), world, log)
    }

    fn progress_events(log: &EventLog) -> Vec<f32> {
        log.events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::RebellionProgressChanged { progress } => Some(progress),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_inactive_objectives_ignore_completion() {
        let (mut tracker, world, log) = tracker(1, 0);
        let pod = world.objectives(ObjectiveCategory::StasisPod)[0];

        assert_eq!(
            tracker.complete_objective(ObjectiveCategory::StasisPod, pod),
            ObjectiveUpdate::Ignored
        );
        assert_eq!(tracker.progress(), 0.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_activate_all_tells_the_world() {
        let (mut tracker, mut world, _log) = tracker(2, 1);
        tracker.activate_all(&mut world);

        assert!(tracker.is_active());
        for category in ObjectiveCategory::ALL {
            for id in world.objectives(category) {
                assert!(world.is_active(id));
                assert!(tracker.registry().get(id).unwrap().active);
            }
        }
    }

    #[test]
    fn test_five_objectives_progress_in_fifths() {
        let (mut tracker, mut world, log) = tracker(3, 2);
        tracker.activate_all(&mut world);

        let mut updates = Vec::new();
        for category in ObjectiveCategory::ALL {
            for id in world.objectives(category) {
                updates.push(tracker.complete_objective(category, id));
            }
        }

        let expected = [0.2, 0.4, 0.6, 0.8, 1.0];
        let seen = progress_events(&log);
        assert_eq!(seen.len(), 5);
        for (got, want) in seen.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }

        assert!(matches!(updates[0], ObjectiveUpdate::Progressed { .. }));
        assert_eq!(updates[4], ObjectiveUpdate::AllComplete);
        assert_eq!(
            updates
                .iter()
                .filter(|u| **u == ObjectiveUpdate::AllComplete)
                .count(),
            1
        );
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_repeat_completion_is_ignored() {
        let (mut tracker, mut world, log) = tracker(2, 0);
        tracker.activate_all(&mut world);
        let pod = world.objectives(ObjectiveCategory::StasisPod)[0];

        tracker.complete_objective(ObjectiveCategory::StasisPod, pod);
        assert_eq!(
            tracker.complete_objective(ObjectiveCategory::StasisPod, pod),
            ObjectiveUpdate::Ignored
        );
        assert_eq!(progress_events(&log), vec![0.5]);
        assert_eq!(tracker.completed(), 1);
    }

    #[test]
    fn test_unknown_or_mismatched_objective_is_ignored() {
        let (mut tracker, mut world, _log) = tracker(1, 0);
        tracker.activate_all(&mut world);
        let pod = world.objectives(ObjectiveCategory::StasisPod)[0];

        assert_eq!(
            tracker.complete_objective(ObjectiveCategory::StasisPod, ObjectiveId::new()),
            ObjectiveUpdate::Ignored
        );
        assert_eq!(
            tracker.complete_objective(ObjectiveCategory::ControlTerminal, pod),
            ObjectiveUpdate::Ignored
        );
        assert_eq!(tracker.completed(), 0);
    }

    #[test]
    fn test_no_objectives_never_completes() {
        let (mut tracker, mut world, _log) = tracker(0, 0);
        tracker.activate_all(&mut world);

        assert_eq!(tracker.total(), 0);
        assert_eq!(tracker.progress(), 0.0);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_snapshot_counts_per_category() {
        let (mut tracker, mut world, _log) = tracker(2, 1);
        tracker.activate_all(&mut world);
        let terminal = world.objectives(ObjectiveCategory::ControlTerminal)[0];
        tracker.complete_objective(ObjectiveCategory::ControlTerminal, terminal);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(
            snapshot.categories[1],
            CategoryProgress {
                category: ObjectiveCategory::ControlTerminal,
                completed: 1,
                total: 1,
            }
        );
    }
}
