//! The scene collaborator.
//!
//! Rendering, lighting, and level content live outside this crate. The
//! narrative core reaches them only through [`World`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use survival_rules::ObjectiveCategory;
use tracing::debug;

use crate::objectives::ObjectiveId;
use crate::timeline::Clue;

/// How far the environment has drifted from "forest" to "laboratory".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Escalation {
    /// Subtle wrongness: too-regular trees, patterned wildlife.
    AnomaliesIntensify,
    /// Drones and hidden machinery switch on.
    ArtificialElementsActivated,
    /// The barrier and the alien equipment show themselves.
    AlienTechnologyRevealed,
}

impl Escalation {
    /// Escalation for a narrative stage. Stage 0 is the untouched forest.
    pub fn for_stage(stage: u32) -> Option<Self> {
        match stage {
            0 => None,
            1 => Some(Self::AnomaliesIntensify),
            2 => Some(Self::ArtificialElementsActivated),
            _ => Some(Self::AlienTechnologyRevealed),
        }
    }
}

/// Scene operations the narrative core needs.
pub trait World: Send {
    /// Place a readable clue in the scene.
    fn spawn_clue(&mut self, clue: &Clue);

    /// Change the environment to match a narrative stage.
    fn escalate_environment(&mut self, escalation: Escalation);

    /// Objective instances present in the scene for a category.
    fn objective_instances(&self, category: ObjectiveCategory) -> Vec<ObjectiveId>;

    /// Show or hide an objective instance's interaction.
    fn set_objective_active(&mut self, id: ObjectiveId, active: bool);
}

/// Scene contents as recorded by [`InMemoryWorld`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub objectives: BTreeMap<ObjectiveCategory, Vec<ObjectiveId>>,
    pub active: HashSet<ObjectiveId>,
    pub clues: Vec<Clue>,
    pub escalations: Vec<Escalation>,
}

/// A headless [`World`] that records every call.
///
/// Clones share state, so a handle kept outside the session observes what
/// the session did.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    state: Arc<Mutex<WorldState>>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new objective instance in the scene.
    pub fn add_objective(&self, category: ObjectiveCategory) -> ObjectiveId {
        let id = ObjectiveId::new();
        self.state
            .lock()
            .objectives
            .entry(category)
            .or_default()
            .push(id);
        id
    }

    /// Builder form of [`InMemoryWorld::add_objective`].
    pub fn with_objectives(self, category: ObjectiveCategory, count: usize) -> Self {
        for _ in 0..count {
            self.add_objective(category);
        }
        self
    }

    pub fn objectives(&self, category: ObjectiveCategory) -> Vec<ObjectiveId> {
        self.objective_instances(category)
    }

    pub fn is_active(&self, id: ObjectiveId) -> bool {
        self.state.lock().active.contains(&id)
    }

    pub fn clues(&self) -> Vec<Clue> {
        self.state.lock().clues.clone()
    }

    pub fn escalations(&self) -> Vec<Escalation> {
        self.state.lock().escalations.clone()
    }

    /// Copy of everything recorded so far.
    pub fn state(&self) -> WorldState {
        self.state.lock().clone()
    }
}

impl World for InMemoryWorld {
    fn spawn_clue(&mut self, clue: &Clue) {
        debug!(clue = %clue.id, note = %clue.note_id, "clue spawned");
        self.state.lock().clues.push(clue.clone());
    }

    fn escalate_environment(&mut self, escalation: Escalation) {
        debug!(?escalation, "environment escalated");
        self.state.lock().escalations.push(escalation);
    }

    fn objective_instances(&self, category: ObjectiveCategory) -> Vec<ObjectiveId> {
        self.state
            .lock()
            .objectives
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    fn set_objective_active(&mut self, id: ObjectiveId, active: bool) {
        let mut state = self.state.lock();
        if active {
            state.active.insert(id);
        } else {
            state.active.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_for_stage() {
        assert_eq!(Escalation::for_stage(0), None);
        assert_eq!(
            Escalation::for_stage(1),
            Some(Escalation::AnomaliesIntensify)
        );
        assert_eq!(
            Escalation::for_stage(2),
            Some(Escalation::ArtificialElementsActivated)
        );
        assert_eq!(
            Escalation::for_stage(3),
            Some(Escalation::AlienTechnologyRevealed)
        );
        assert_eq!(
            Escalation::for_stage(7),
            Some(Escalation::AlienTechnologyRevealed)
        );
    }

    #[test]
    fn test_clones_share_state() {
        let world = InMemoryWorld::new().with_objectives(ObjectiveCategory::StasisPod, 2);
        let mut handle = world.clone();

        let pods = world.objectives(ObjectiveCategory::StasisPod);
        assert_eq!(pods.len(), 2);
        assert!(world.objectives(ObjectiveCategory::ControlTerminal).is_empty());

        handle.set_objective_active(pods[0], true);
        handle.escalate_environment(Escalation::AnomaliesIntensify);

        assert!(world.is_active(pods[0]));
        assert!(!world.is_active(pods[1]));
        assert_eq!(world.escalations(), vec![Escalation::AnomaliesIntensify]);
    }
}
