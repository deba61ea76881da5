//! Core container implementation for Locator.

pub mod container;
pub mod definition;
pub mod error;
pub mod invoker;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod value;

pub use container::{Container, ContainerBuilder, DelegateRole, prelude};
pub use definition::{Arg, Arguments, Definition, FromArgument, Invokable, IntoDefinition, Parameter};
pub use error::{LocatorError, Result};
pub use lifecycle::{Callable, Lifecycle};
pub use resolver::{Resolver, ResolverExt};
pub use value::Value;

/// Builds a positional argument list.
///
/// ```
/// use locator_container::{args, Value};
///
/// let arguments: Vec<Value> = args!["arg1", 2u8];
/// assert_eq!(arguments.len(), 2);
/// assert!(arguments[1].is::<u8>());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($argument:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($argument)),+]
    };
}
