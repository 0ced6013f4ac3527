//! Error type for world setup
//!
//! Everything here is a configuration or programming defect surfaced at
//! setup time; the per-frame path never fails.

use std::fmt;

/// Error raised while wiring entities, bodies and followers together
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A follower, spinner or route was configured with unusable values
    InvalidConfiguration(String),
    /// The physics body is not registered with the world's physics (or the
    /// world has no physics at all)
    UnregisteredBody,
    /// The entity key or name does not exist in the world
    UnknownEntity(String),
    /// The entity is already paired with a physics body
    AlreadyTracked(String),
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidConfiguration(message.into())
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            CoreError::UnregisteredBody => write!(f, "Physics body is not registered with the world"),
            CoreError::UnknownEntity(entity) => write!(f, "Unknown entity: {}", entity),
            CoreError::AlreadyTracked(entity) => {
                write!(f, "Entity {} is already paired with a physics body", entity)
            }
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = CoreError::invalid("waypoint sequence is empty");
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("waypoint sequence is empty"));
    }

    #[test]
    fn test_unregistered_body_display() {
        assert!(CoreError::UnregisteredBody.to_string().contains("not registered"));
    }
}
