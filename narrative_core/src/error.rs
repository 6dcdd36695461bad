//! Error types for session setup.

use survival_rules::RulesError;
use thiserror::Error;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that stop a session from starting, or reject an item action.
///
/// Choice, objective, and note inputs never error: repeats are no-ops.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A required collaborator was not supplied to the builder.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Session configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// No recipe with this name.
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    /// Error from the survival rules.
    #[error(transparent)]
    Rules(#[from] RulesError),
}
