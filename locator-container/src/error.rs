//! Error types for Locator container operations.
//!
//! Two kinds of failure exist: a missing id ([`LocatorError::NotFound`])
//! and everything else, which is a configuration or usage error.
//! Both carry the offending id or definition in their message.

use std::fmt;

/// Main error type for all Locator operations.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// Neither the master delegate nor the local registry has the id.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// The master delegate already owns the id being added.
    #[error("{}", .0)]
    ShadowedByMaster(ShadowedError),

    /// A definition's declared parameters could not be satisfied.
    #[error("{}", .0)]
    InvalidDefinition(InvalidDefinitionError),

    /// The value stored under an id was invoked but is not callable.
    #[error("{}", .0)]
    NotCallable(NotCallableError),

    /// A typed lookup found a value of another type.
    #[error("Value with id \"{id}\" is a {found}, expected {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A definition outlived the container that would invoke it.
    ///
    /// `entry` is the id of a factory or shared entry, or the presentation
    /// of a definition invoked directly.
    #[error("\"{entry}\" can not be invoked: its container was dropped")]
    ContainerDropped { entry: String },

    /// A definition failed for its own reasons.
    #[error("Definition failed: {source}")]
    ConstructionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LocatorError {
    /// Wraps an error raised inside a definition body.
    pub fn failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        LocatorError::ConstructionFailed { source: source.into() }
    }

    /// Returns `true` for a missing id, `false` for container errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocatorError::NotFound(_))
    }
}

/// Error when an id is neither delegated nor stored locally.
#[derive(Debug)]
pub struct NotFoundError {
    /// The id that was requested
    pub id: String,
    /// Similar ids that ARE stored (for "did you mean?" suggestions)
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value with id \"{}\" was not found", self.id)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when a local assignment would be hidden by the master delegate.
#[derive(Debug)]
pub struct ShadowedError {
    pub id: String,
}

impl fmt::Display for ShadowedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Value \"{}\" assignment will not take effect: the master container already owns this id",
            self.id,
        )?;
        write!(
            f,
            "\n  Hint: pick another id, or register the value on the master container"
        )
    }
}

/// Error when a definition's parameters do not line up with its arguments.
#[derive(Debug)]
pub struct InvalidDefinitionError {
    /// Presentation of the definition, e.g. `Mailer::build()`
    pub definition: String,
    /// The offending parameter position, when known
    pub position: Option<usize>,
    /// What went wrong
    pub reason: String,
}

impl fmt::Display for InvalidDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "Argument {position} of {} is not properly declared. {}",
                self.definition, self.reason,
            ),
            None => write!(
                f,
                "Arguments of {} are not properly declared. {}",
                self.definition, self.reason,
            ),
        }
    }
}

/// Error when a non-callable value is invoked.
#[derive(Debug)]
pub struct NotCallableError {
    pub id: String,
    pub type_name: &'static str,
}

impl fmt::Display for NotCallableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Value with id \"{}\" is not a callable ({}) and can not be executed",
            self.id, self.type_name,
        )
    }
}

/// Convenient Result type for Locator operations.
pub type Result<T> = std::result::Result<T, LocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_display() {
        let err = LocatorError::NotFound(NotFoundError {
            id: "mailer".to_string(),
            suggestions: vec!["mailer.transport".to_string()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("\"mailer\" was not found"));
        assert!(msg.contains("Did you mean"));
        assert!(msg.contains("mailer.transport"));
        assert!(err.is_not_found());
    }

    #[test]
    fn shadowed_error_display() {
        let err = LocatorError::ShadowedByMaster(ShadowedError { id: "db".to_string() });

        let msg = format!("{err}");
        assert!(msg.contains("\"db\""));
        assert!(msg.contains("master container"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn invalid_definition_error_display() {
        let err = LocatorError::InvalidDefinition(InvalidDefinitionError {
            definition: "closure defined in app::boot".to_string(),
            position: Some(1),
            reason: "Expected a value of type String, found i32.".to_string(),
        });

        let msg = format!("{err}");
        assert!(msg.contains("Argument 1 of closure defined in app::boot"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn not_callable_error_display() {
        let err = LocatorError::NotCallable(NotCallableError {
            id: "greeting".to_string(),
            type_name: "&str",
        });

        let msg = format!("{err}");
        assert!(msg.contains("not a callable (&str)"));
    }

    #[test]
    fn container_dropped_names_entry() {
        let err = LocatorError::ContainerDropped {
            entry: "closure defined in app::boot".to_string(),
        };

        let msg = format!("{err}");
        assert!(msg.starts_with("\"closure defined in app::boot\" can not be invoked"));
        assert!(!msg.contains("\"\""));
    }

    #[test]
    fn construction_failed_keeps_source() {
        use std::error::Error as _;

        let err = LocatorError::failed("disk full");
        assert!(err.source().is_some());
        assert!(format!("{err}").contains("disk full"));
    }
}
