//! Items, the item catalog, and crafting recipes.

mod inventory;

pub use inventory::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::StatTable;
use crate::error::{Result, RulesError};
use crate::mechanics::ItemType;

fn default_true() -> bool {
    true
}

fn default_stack() -> u32 {
    10
}

fn default_quantity() -> u32 {
    1
}

/// Static definition of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub item_type: ItemType,
    #[serde(default = "default_true")]
    pub stackable: bool,
    #[serde(default = "default_stack")]
    pub max_stack_size: u32,
    #[serde(default)]
    pub consumable: bool,
    /// Amount restored per stat when consumed.
    #[serde(default)]
    pub restores: StatTable,
}

impl ItemData {
    /// Effective stack limit: 1 for non-stackable items.
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stack_size.max(1)
        } else {
            1
        }
    }
}

/// An ingredient line in a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Turns ingredients into a result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingRecipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub result: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<ItemData>,
    #[serde(default)]
    recipes: Vec<CraftingRecipe>,
}

/// All known items and recipes.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<String, ItemData>,
    recipes: Vec<CraftingRecipe>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starter items found in the forest.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.insert(ItemData {
            id: "berries".into(),
            name: "Wild Berries".into(),
            description: "Sweet berries found growing on bushes. Provides sustenance but should be eaten in moderation.".into(),
            item_type: ItemType::Food,
            stackable: true,
            max_stack_size: 10,
            consumable: true,
            restores: StatTable {
                hunger: 20.0,
                thirst: 5.0,
                ..StatTable::default()
            },
        });
        catalog.insert(ItemData {
            id: "fresh_water".into(),
            name: "Fresh Water".into(),
            description: "Clean, drinkable water from a natural spring.".into(),
            item_type: ItemType::Water,
            stackable: true,
            max_stack_size: 5,
            consumable: true,
            restores: StatTable {
                thirst: 30.0,
                ..StatTable::default()
            },
        });
        catalog.insert(ItemData {
            id: "stick".into(),
            name: "Wooden Stick".into(),
            description: "A sturdy branch that could be useful for crafting.".into(),
            item_type: ItemType::Material,
            stackable: true,
            max_stack_size: 20,
            consumable: false,
            restores: StatTable::default(),
        });
        catalog.insert(ItemData {
            id: "alien_device".into(),
            name: "Strange Device".into(),
            description: "A mysterious technological device that seems out of place in this forest. It emits a faint humming sound.".into(),
            item_type: ItemType::AlienArtifact,
            stackable: false,
            max_stack_size: 1,
            consumable: false,
            restores: StatTable::default(),
        });

        catalog
    }

    /// Load items and recipes from TOML (`[[items]]`, `[[recipes]]`).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let mut catalog = Self::new();
        for item in file.items {
            catalog.insert(item);
        }
        for recipe in file.recipes {
            catalog.add_recipe(recipe)?;
        }
        Ok(catalog)
    }

    /// Add or replace an item definition.
    pub fn insert(&mut self, item: ItemData) {
        self.items.insert(item.id.clone(), item);
    }

    /// Register a recipe whose items are all known.
    pub fn add_recipe(&mut self, recipe: CraftingRecipe) -> Result<()> {
        let referenced = recipe
            .ingredients
            .iter()
            .map(|i| i.item_id.as_str())
            .chain(std::iter::once(recipe.result.as_str()));
        for id in referenced {
            if !self.items.contains_key(id) {
                return Err(RulesError::UnknownItem(id.to_string()));
            }
        }
        self.recipes.push(recipe);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ItemData> {
        self.items.get(id)
    }

    /// Like [`ItemCatalog::get`], but unknown ids are an error.
    pub fn require(&self, id: &str) -> Result<&ItemData> {
        self.get(id)
            .ok_or_else(|| RulesError::UnknownItem(id.to_string()))
    }

    pub fn recipe(&self, name: &str) -> Option<&CraftingRecipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    pub fn recipes(&self) -> &[CraftingRecipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
