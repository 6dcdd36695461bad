//! # Survival Rules
//!
//! The rules crate for Alien Experiment: survival stats, their decay, the
//! day/night cycle, items, and the event bus every system publishes on.
//! It knows nothing about the narrative or the endings' evaluation.

pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod items;
pub mod mechanics;
pub mod resources;

pub use clock::*;
pub use config::*;
pub use environment::*;
pub use error::{Result, RulesError};
pub use events::*;
pub use items::*;
pub use mechanics::*;
pub use resources::*;
