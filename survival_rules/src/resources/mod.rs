//! Survival resources and their decay.
//!
//! - **pool**: the four bounded stats, shared by every writer
//! - **decay**: fixed-period drain applied to the pool

mod decay;
mod pool;

pub use decay::*;
pub use pool::*;
