//! Type-erased values stored in the container.
//!
//! A [`Value`] is a cheap, cloneable handle to anything `Send + Sync`.
//! Clones share the same allocation, so identity survives a round trip
//! through the container.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::lifecycle::Callable;

/// A reference-counted, type-erased value.
///
/// # Examples
/// ```
/// use locator_container::Value;
///
/// let value = Value::new(String::from("hi"));
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hi"));
/// assert!(value.ptr_eq(&value.clone()));
/// ```
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`.
    ///
    /// Wrapping a [`Value`] returns it unchanged instead of nesting it.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<Value>() {
            Ok(value) => *value,
            Err(boxed) => Self {
                inner: Arc::from(boxed),
                type_name: type_name::<T>(),
            },
        }
    }

    /// Stores an existing `Arc<T>`, keeping its identity.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: type_name::<T>(),
        }
    }

    /// Returns a shared handle to the inner `T`, if that is what is stored.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// Borrows the inner `T`, if that is what is stored.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Returns `true` if the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Returns `true` if the stored value can be called.
    pub fn is_callable(&self) -> bool {
        self.is::<Callable>()
    }

    /// Name of the stored type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.type_name)
    }
}
