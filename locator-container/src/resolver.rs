//! The container capability.
//!
//! [`Resolver`] is the small contract every container-like object
//! implements: presence check and lookup by id. Delegates are held as
//! `Arc<dyn Resolver>`, and a definition that declares an
//! `Arc<dyn Resolver>` parameter receives the injection target through it.

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::container::Container;
use crate::error::{LocatorError, Result};
use crate::value::Value;

/// Resolves values by id.
///
/// # Examples
/// ```
/// use locator_container::{Container, Resolver, ResolverExt};
///
/// let container = Container::new();
/// container.add("port", 8080u16).unwrap();
///
/// let resolver: &dyn Resolver = &*container;
/// assert!(resolver.has("port"));
/// assert_eq!(*resolver.resolve::<u16>("port").unwrap(), 8080);
/// ```
pub trait Resolver: Send + Sync {
    /// Returns `true` if `id` can be resolved.
    fn has(&self, id: &str) -> bool;

    /// Returns the value stored under `id`.
    ///
    /// # Errors
    /// Returns [`LocatorError::NotFound`] if `id` is unknown.
    fn get(&self, id: &str) -> Result<Value>;

    /// The concrete [`Container`] behind this resolver, if there is one.
    ///
    /// Lets an `Arc<Container>` parameter accept a delegate that is itself
    /// a container.
    fn as_container(&self) -> Option<&Container> {
        None
    }
}

/// Typed helpers available on every [`Resolver`].
pub trait ResolverExt: Resolver {
    /// Resolves `id` and downcasts it to `T`.
    ///
    /// # Errors
    /// Returns [`LocatorError::TypeMismatch`] if the stored value is not a `T`.
    fn resolve<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let value = self.get(id)?;
        value.downcast::<T>().ok_or_else(|| LocatorError::TypeMismatch {
            id: id.to_string(),
            expected: type_name::<T>(),
            found: value.type_name(),
        })
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}
