//! Autowiring: splicing the container into a definition's arguments.
//!
//! Injection is positional and type-driven. Every parameter declared as
//! an injection point receives the injection target; the caller's
//! arguments fill the remaining positions in their original order.
//!
//! ```text
//! declared:  (Arg<String>, Arc<dyn Resolver>, Arg<String>)
//! supplied:  ["a", "b"]
//! spliced:   ["a", <target>, "b"]
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::container::Container;
use crate::definition::{Argument, Arguments, Definition, IntoDefinition, Parameter};
use crate::error::Result;
use crate::resolver::Resolver;
use crate::value::Value;

/// Positions of the injection points, ascending.
pub(crate) fn injection_points(parameters: &[Parameter]) -> Vec<usize> {
    parameters
        .iter()
        .enumerate()
        .filter(|(_, parameter)| parameter.is_injected())
        .map(|(position, _)| position)
        .collect()
}

/// Inserts `target` at every injection point, shifting later arguments right.
///
/// A point past the end of the list appends the target.
pub(crate) fn splice(
    parameters: &[Parameter],
    target: &Arc<dyn Resolver>,
    supplied: Vec<Value>,
) -> Vec<Argument> {
    let points = injection_points(parameters);
    let mut arguments: Vec<Argument> = Vec::with_capacity(supplied.len() + points.len());
    arguments.extend(supplied.into_iter().map(Argument::Value));

    for position in points {
        let at = position.min(arguments.len());
        arguments.insert(at, Argument::Injected(target.clone()));
    }

    arguments
}

impl Container {
    /// Invokes `definition`, injecting the container wherever it is declared.
    ///
    /// The injected reference is the lookup delegate when there is one,
    /// otherwise this container. The definition's result and errors are
    /// returned unchanged.
    ///
    /// # Errors
    /// Returns [`LocatorError::InvalidDefinition`](crate::LocatorError::InvalidDefinition)
    /// when the declared parameters can not be produced or satisfied.
    pub fn invoke<M>(&self, definition: impl IntoDefinition<M>, arguments: Vec<Value>) -> Result<Value> {
        self.invoke_definition(&definition.into_definition(), arguments)
    }

    pub(crate) fn invoke_definition(&self, definition: &Definition, supplied: Vec<Value>) -> Result<Value> {
        let target = self.injection_target(definition)?;
        let parameters = definition.parameters()?;

        trace!(
            definition = definition.presentation(),
            parameters = parameters.len(),
            supplied = supplied.len(),
            "Invoking"
        );

        let arguments = splice(parameters, &target, supplied);
        definition.call(&Arguments::new(definition.presentation_arc(), arguments))
    }
}
