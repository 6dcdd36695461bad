//! Error types for the survival rules.

use thiserror::Error;

/// Result alias for rules operations.
pub type Result<T> = std::result::Result<T, RulesError>;

/// Errors raised by configuration loading and inventory operations.
///
/// Simulation steps never fail: bounds are enforced by clamping and repeated
/// inputs are no-ops. Only setup and item handling report errors.
#[derive(Error, Debug)]
pub enum RulesError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// No free slot for a new stack.
    #[error("inventory is full ({max_slots} slots)")]
    InventoryFull { max_slots: usize },

    /// The item is not in the inventory or catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The item exists but cannot be consumed.
    #[error("item is not consumable: {0}")]
    NotConsumable(String),

    /// Not enough of an item to complete the operation.
    #[error("not enough {item_id}: need {needed}, have {available}")]
    Insufficient {
        item_id: String,
        needed: u32,
        available: u32,
    },
}
