//! Objective instances indexed by category.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use survival_rules::ObjectiveCategory;
use uuid::Uuid;

/// Unique identifier for an objective instance in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectiveId(pub Uuid);

impl ObjectiveId {
    /// Create a new random objective ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectiveId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stasis pod or control terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveInstance {
    pub id: ObjectiveId,
    pub category: ObjectiveCategory,
    /// Accepts completion only once the rebellion has started.
    pub active: bool,
    pub completed: bool,
}

impl ObjectiveInstance {
    pub fn new(id: ObjectiveId, category: ObjectiveCategory) -> Self {
        Self {
            id,
            category,
            active: false,
            completed: false,
        }
    }

    pub fn interaction_text(&self) -> &'static str {
        self.category.interaction_text(self.completed)
    }
}

/// Every objective instance, keyed by id, with per-category order kept.
///
/// Totals and completion counts are derived from the instances on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectiveRegistry {
    instances: HashMap<ObjectiveId, ObjectiveInstance>,
    by_category: HashMap<ObjectiveCategory, Vec<ObjectiveId>>,
}

impl ObjectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance. An id already registered, in any category, is
    /// rejected.
    pub fn register(&mut self, category: ObjectiveCategory, id: ObjectiveId) -> bool {
        if self.instances.contains_key(&id) {
            return false;
        }
        self.instances.insert(id, ObjectiveInstance::new(id, category));
        self.by_category.entry(category).or_default().push(id);
        true
    }

    pub fn get(&self, id: ObjectiveId) -> Option<&ObjectiveInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectiveId) -> Option<&mut ObjectiveInstance> {
        self.instances.get_mut(&id)
    }

    /// Instances of a category in registration order.
    pub fn in_category(&self, category: ObjectiveCategory) -> Vec<&ObjectiveInstance> {
        self.by_category
            .get(&category)
            .map(|ids| ids.iter().filter_map(|id| self.instances.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectiveInstance> {
        self.instances.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ObjectiveInstance> {
        self.instances.values_mut()
    }

    pub fn total(&self) -> usize {
        self.instances.len()
    }

    pub fn completed(&self) -> usize {
        self.instances.values().filter(|o| o.completed).count()
    }

    pub fn total_in(&self, category: ObjectiveCategory) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }

    pub fn completed_in(&self, category: ObjectiveCategory) -> usize {
        self.in_category(category)
            .into_iter()
            .filter(|o| o.completed)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
