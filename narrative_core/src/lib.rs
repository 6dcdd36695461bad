//! # Narrative Core
//!
//! The story half of Alien Experiment, built on `survival_rules`. It turns
//! survival time into narrative beats, offers the player the fork once the
//! experiment is revealed, and decides which of the four endings the
//! session reaches.
//!
//! ## Core Components
//!
//! - **timeline**: scripted, time-gated narrative events and discovered notes
//! - **choice**: the write-once player choice and per-branch ending evaluation
//! - **objectives**: rebellion objectives and their progress
//! - **world**: the scene collaborator trait
//! - **session**: one play-through, driven tick by tick from a clock source
//!
//! The session is the only owner of mutable state. Components talk to the
//! outside world through the event bus and the [`World`] trait.

pub mod choice;
pub mod config;
pub mod error;
pub mod objectives;
pub mod session;
pub mod timeline;
pub mod world;

pub use choice::*;
pub use config::*;
pub use error::{Result, SessionError};
pub use objectives::*;
pub use session::*;
pub use timeline::*;
pub use world::*;
