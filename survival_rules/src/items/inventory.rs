//! Slot-limited stacking inventory.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CraftingRecipe, ItemCatalog, ItemData};
use crate::error::{Result, RulesError};
use crate::events::{EventBus, GameEvent};
use crate::resources::ResourcePool;

/// A stack of items in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
}

/// The player's inventory.
///
/// New items top up existing stacks of the same item before taking new
/// slots. Operations either apply fully or not at all.
#[derive(Debug)]
pub struct Inventory {
    max_slots: usize,
    slots: Vec<ItemStack>,
    bus: EventBus,
}

impl Inventory {
    pub const DEFAULT_SLOTS: usize = 20;

    pub fn new(max_slots: usize, bus: EventBus) -> Self {
        Self {
            max_slots,
            slots: Vec::new(),
            bus,
        }
    }

    /// Add `quantity` of `item`.
    pub fn add_item(&mut self, item: &ItemData, quantity: u32) -> Result<()> {
        self.put(item, quantity)?;
        debug!(item = %item.id, quantity, "item added");
        self.notify();
        Ok(())
    }

    fn put(&mut self, item: &ItemData, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Ok(());
        }

        let limit = item.stack_limit();
        let room_in_stacks: u32 = self
            .slots
            .iter()
            .filter(|s| s.item_id == item.id && item.stackable)
            .map(|s| limit.saturating_sub(s.quantity))
            .sum();
        let free_slots = self.max_slots.saturating_sub(self.slots.len());
        let needed_slots = quantity.saturating_sub(room_in_stacks).div_ceil(limit) as usize;
        if needed_slots > free_slots {
            return Err(RulesError::InventoryFull {
                max_slots: self.max_slots,
            });
        }

        let mut remaining = quantity;
        if item.stackable {
            for slot in self.slots.iter_mut().filter(|s| s.item_id == item.id) {
                let moved = limit.saturating_sub(slot.quantity).min(remaining);
                slot.quantity += moved;
                remaining -= moved;
                if remaining == 0 {
                    break;
                }
            }
        }
        while remaining > 0 {
            let moved = remaining.min(limit);
            self.slots.push(ItemStack {
                item_id: item.id.clone(),
                quantity: moved,
            });
            remaining -= moved;
        }
        Ok(())
    }

    /// Remove `quantity` of an item, emptying later stacks first.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> Result<()> {
        self.take(item_id, quantity)?;
        self.notify();
        Ok(())
    }

    fn take(&mut self, item_id: &str, quantity: u32) -> Result<()> {
        let available = self.item_count(item_id);
        if available == 0 && quantity > 0 {
            return Err(RulesError::UnknownItem(item_id.to_string()));
        }
        if available < quantity {
            return Err(RulesError::Insufficient {
                item_id: item_id.to_string(),
                needed: quantity,
                available,
            });
        }

        let mut remaining = quantity;
        for slot in self.slots.iter_mut().rev().filter(|s| s.item_id == item_id) {
            let taken = slot.quantity.min(remaining);
            slot.quantity -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.slots.retain(|s| s.quantity > 0);
        Ok(())
    }

    /// Total quantity across all stacks.
    pub fn item_count(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.item_count(item_id) >= quantity
    }

    /// Consume one unit of a consumable, restoring stats through the pool.
    pub fn use_item(
        &mut self,
        catalog: &ItemCatalog,
        item_id: &str,
        pool: &ResourcePool,
    ) -> Result<()> {
        let item = catalog.require(item_id)?;
        if !item.consumable {
            return Err(RulesError::NotConsumable(item_id.to_string()));
        }
        self.take(item_id, 1)?;

        for (stat, amount) in item.restores.iter() {
            if amount > 0.0 {
                pool.modify(stat, amount);
            }
        }

        debug!(item = %item_id, "item used");
        self.notify();
        Ok(())
    }

    pub fn can_craft(&self, recipe: &CraftingRecipe) -> bool {
        recipe
            .ingredients
            .iter()
            .all(|i| self.has_item(&i.item_id, i.quantity))
    }

    /// Consume the ingredients and add the result.
    pub fn craft(&mut self, catalog: &ItemCatalog, recipe: &CraftingRecipe) -> Result<()> {
        let result = catalog.require(&recipe.result)?;
        let backup = self.slots.clone();

        let outcome = recipe
            .ingredients
            .iter()
            .try_for_each(|i| self.take(&i.item_id, i.quantity))
            .and_then(|()| self.put(result, recipe.quantity));

        match outcome {
            Ok(()) => {
                debug!(recipe = %recipe.name, "crafted");
                self.notify();
                Ok(())
            }
            Err(err) => {
                self.slots = backup;
                Err(err)
            }
        }
    }

    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    pub fn slots_used(&self) -> usize {
        self.slots.len()
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.max_slots
    }

    fn notify(&self) {
        self.bus.publish(GameEvent::InventoryChanged {
            slots_used: self.slots.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;
    use crate::events::EventLog;
    use crate::items::Ingredient;
    use crate::mechanics::SurvivalStat;

    fn inventory(slots: usize) -> (Inventory, ItemCatalog, EventLog) {
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        (Inventory::new(slots, bus), ItemCatalog::builtin(), log)
    }

    #[test]
    fn test_stacks_fill_before_new_slots() {
        let (mut inv, catalog, _log) = inventory(5);
        let water = catalog.get("fresh_water").unwrap();

        inv.add_item(water, 3).unwrap();
        inv.add_item(water, 4).unwrap();

        assert_eq!(inv.slots_used(), 2);
        assert_eq!(inv.slots()[0].quantity, 5);
        assert_eq!(inv.slots()[1].quantity, 2);
        assert_eq!(inv.item_count("fresh_water"), 7);
    }

    #[test]
    fn test_non_stackable_takes_a_slot_each() {
        let (mut inv, catalog, _log) = inventory(5);
        inv.add_item(catalog.get("alien_device").unwrap(), 2).unwrap();
        assert_eq!(inv.slots_used(), 2);
    }

    #[test]
    fn test_full_inventory_rejects_without_change() {
        let (mut inv, catalog, _log) = inventory(1);
        let stick = catalog.get("stick").unwrap();
        inv.add_item(stick, 20).unwrap();

        let err = inv.add_item(catalog.get("berries").unwrap(), 1).unwrap_err();
        assert!(matches!(err, RulesError::InventoryFull { max_slots: 1 }));
        assert!(inv.add_item(stick, 1).is_err());
        assert_eq!(inv.item_count("stick"), 20);
        assert!(inv.is_full());
    }

    #[test]
    fn test_remove_item() {
        let (mut inv, catalog, log) = inventory(5);
        inv.add_item(catalog.get("berries").unwrap(), 4).unwrap();

        inv.remove_item("berries", 3).unwrap();
        assert_eq!(inv.item_count("berries"), 1);

        let err = inv.remove_item("berries", 2).unwrap_err();
        assert!(matches!(err, RulesError::Insufficient { available: 1, .. }));
        assert!(matches!(
            inv.remove_item("stick", 1),
            Err(RulesError::UnknownItem(_))
        ));
        assert_eq!(log.count_named("inventory-changed"), 2);
    }

    #[test]
    fn test_use_consumable_restores_through_pool() {
        let (mut inv, catalog, log) = inventory(5);
        let pool = ResourcePool::new(&ResourceConfig::default(), EventBus::new());
        pool.modify(SurvivalStat::Hunger, -50.0);
        pool.modify(SurvivalStat::Thirst, -50.0);
        inv.add_item(catalog.get("berries").unwrap(), 1).unwrap();

        inv.use_item(&catalog, "berries", &pool).unwrap();

        assert_eq!(pool.value(SurvivalStat::Hunger), 70.0);
        assert_eq!(pool.value(SurvivalStat::Thirst), 55.0);
        assert_eq!(inv.item_count("berries"), 0);
        assert_eq!(log.count_named("inventory-changed"), 2);
    }

    #[test]
    fn test_use_rejects_non_consumable_and_missing() {
        let (mut inv, catalog, _log) = inventory(5);
        let pool = ResourcePool::new(&ResourceConfig::default(), EventBus::new());
        inv.add_item(catalog.get("stick").unwrap(), 1).unwrap();

        assert!(matches!(
            inv.use_item(&catalog, "stick", &pool),
            Err(RulesError::NotConsumable(_))
        ));
        assert!(matches!(
            inv.use_item(&catalog, "fresh_water", &pool),
            Err(RulesError::UnknownItem(_))
        ));
        assert!(matches!(
            inv.use_item(&catalog, "nectar", &pool),
            Err(RulesError::UnknownItem(_))
        ));
    }

    fn torch_catalog() -> (ItemCatalog, CraftingRecipe) {
        let mut catalog = ItemCatalog::builtin();
        catalog.insert(ItemData {
            id: "torch".into(),
            name: "Torch".into(),
            description: String::new(),
            item_type: crate::mechanics::ItemType::Tool,
            stackable: false,
            max_stack_size: 1,
            consumable: false,
            restores: Default::default(),
        });
        let recipe = CraftingRecipe {
            name: "torch".into(),
            ingredients: vec![Ingredient {
                item_id: "stick".into(),
                quantity: 2,
            }],
            result: "torch".into(),
            quantity: 1,
        };
        catalog.add_recipe(recipe.clone()).unwrap();
        (catalog, recipe)
    }

    #[test]
    fn test_craft() {
        let (catalog, recipe) = torch_catalog();
        let mut inv = Inventory::new(5, EventBus::new());
        inv.add_item(catalog.get("stick").unwrap(), 3).unwrap();

        assert!(inv.can_craft(&recipe));
        inv.craft(&catalog, &recipe).unwrap();

        assert_eq!(inv.item_count("stick"), 1);
        assert_eq!(inv.item_count("torch"), 1);
        assert!(!inv.can_craft(&recipe));
    }

    #[test]
    fn test_failed_craft_rolls_back() {
        let (catalog, recipe) = torch_catalog();
        let mut inv = Inventory::new(1, EventBus::new());
        inv.add_item(catalog.get("stick").unwrap(), 1).unwrap();

        assert!(inv.craft(&catalog, &recipe).is_err());
        assert_eq!(inv.item_count("stick"), 1);
        assert_eq!(inv.item_count("torch"), 0);
    }
}
