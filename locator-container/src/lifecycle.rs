//! Entry lifecycles and the callable entry type.
//!
//! Lifecycles determine how often a registered definition runs:
//! - [`Lifecycle::Factory`]: on every call, fresh each time
//! - [`Lifecycle::Shared`]: once, the first result is kept forever
//!
//! Both wrap the definition in a [`Callable`] stored as an ordinary
//! entry, so it is retrieved with `get` and run with
//! [`Container::call`](crate::Container::call) or [`Callable::call`].

use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::container::Container;
use crate::definition::Definition;
use crate::error::{LocatorError, Result};
use crate::value::Value;

/// How a registered definition is run when its entry is called.
///
/// # Examples
/// ```
/// use locator_container::lifecycle::Lifecycle;
///
/// assert!(Lifecycle::Shared.is_memoized());
/// assert!(!Lifecycle::Factory.is_memoized());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// New result on every call.
    ///
    /// Call-time arguments are passed through each time.
    Factory,

    /// One result per entry.
    ///
    /// The first call's arguments build the result; later calls ignore
    /// their arguments and return the same value. A failing first call
    /// stores nothing, so the next call tries again.
    Shared,
}

impl Lifecycle {
    /// Returns `true` if results are kept between calls.
    #[inline]
    pub fn is_memoized(&self) -> bool {
        matches!(self, Lifecycle::Shared)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Factory => write!(f, "Factory"),
            Lifecycle::Shared => write!(f, "Shared"),
        }
    }
}

type CallFn = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// A callable stored as a container entry.
///
/// Factory and shared callables hold their container weakly: an entry
/// never keeps its container alive. A factory fetched with `get` and
/// called after the container is dropped fails with
/// [`LocatorError::ContainerDropped`]; so does a shared entry that was
/// never filled. A filled shared entry keeps returning its value. Plain
/// callables built with [`Callable::new`] do not depend on a container.
///
/// ```
/// use locator_container::prelude::*;
///
/// let container = Container::new();
/// container
///     .add("len", Callable::new(|args| Ok(Value::new(args.len()))))
///     .unwrap();
///
/// let out = container.call("len", args![1, 2, 3]).unwrap();
/// assert_eq!(out.downcast_ref::<usize>(), Some(&3));
/// ```
#[derive(Clone)]
pub struct Callable {
    lifecycle: Option<Lifecycle>,
    presentation: Arc<str>,
    call: CallFn,
}

impl Callable {
    /// Wraps a plain function over positional values.
    ///
    /// Plain callables receive the arguments as given; nothing is injected.
    pub fn new(call: impl Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            lifecycle: None,
            presentation: Arc::from("callable"),
            call: Arc::new(call),
        }
    }

    /// Runs the callable.
    pub fn call(&self, arguments: Vec<Value>) -> Result<Value> {
        trace!(callable = %self.presentation, arguments = arguments.len(), "Calling");
        (self.call)(arguments)
    }

    /// The lifecycle, or `None` for a plain callable.
    pub fn lifecycle(&self) -> Option<Lifecycle> {
        self.lifecycle
    }

    /// Presentation of the wrapped definition.
    pub fn presentation(&self) -> &str {
        &self.presentation
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("lifecycle", &self.lifecycle)
            .field("presentation", &self.presentation)
            .finish()
    }
}

/// Wraps `definition` so every call invokes it through `owner`.
pub(crate) fn factory(id: &str, owner: Weak<Container>, definition: Definition) -> Callable {
    let id = id.to_string();
    let presentation = definition.presentation_arc();

    Callable {
        lifecycle: Some(Lifecycle::Factory),
        presentation,
        call: Arc::new(move |arguments| {
            let container = owner
                .upgrade()
                .ok_or_else(|| LocatorError::ContainerDropped { entry: id.clone() })?;
            container.invoke_definition(&definition, arguments)
        }),
    }
}

/// Wraps `definition` so the first successful call is kept.
pub(crate) fn shared(id: &str, owner: Weak<Container>, definition: Definition) -> Callable {
    let id = id.to_string();
    let presentation = definition.presentation_arc();
    let cell: OnceCell<Value> = OnceCell::new();

    Callable {
        lifecycle: Some(Lifecycle::Shared),
        presentation,
        call: Arc::new(move |arguments| {
            cell.get_or_try_init(|| {
                let container = owner
                    .upgrade()
                    .ok_or_else(|| LocatorError::ContainerDropped { entry: id.clone() })?;
                trace!(id = %id, "Filling shared entry");
                container.invoke_definition(&definition, arguments)
            })
            .cloned()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Session;

    #[test]
    fn lifecycle_display() {
        assert_eq!(format!("{}", Lifecycle::Factory), "Factory");
        assert_eq!(format!("{}", Lifecycle::Shared), "Shared");
    }

    #[test]
    fn plain_callable_receives_arguments() {
        let callable = Callable::new(|args| Ok(args[0].clone()));
        let out = callable.call(vec![Value::new(5u8)]).unwrap();
        assert_eq!(out.downcast_ref::<u8>(), Some(&5));
        assert_eq!(callable.lifecycle(), None);
    }

    #[test]
    fn factory_runs_every_call() {
        let container = Container::new();
        let counter = Arc::new(AtomicU32::new(0));
        let definition = Definition::new("counting", vec![], {
            let counter = counter.clone();
            move |_| Ok(Value::new(counter.fetch_add(1, Ordering::SeqCst)))
        });

        let callable = factory("count", Arc::downgrade(&container), definition);
        let a = callable.call(vec![]).unwrap();
        let b = callable.call(vec![]).unwrap();

        assert_eq!(a.downcast_ref::<u32>(), Some(&0));
        assert_eq!(b.downcast_ref::<u32>(), Some(&1));
        assert_eq!(callable.lifecycle(), Some(Lifecycle::Factory));
    }

    #[test]
    fn shared_runs_once() {
        let container = Container::new();
        let counter = Arc::new(AtomicU32::new(0));
        let definition = Definition::new("session", vec![], {
            let counter = counter.clone();
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::new(Session))
            }
        });

        let callable = shared("session", Arc::downgrade(&container), definition);
        let a = callable.call(vec![Value::new(1)]).unwrap();
        let b = callable.call(vec![]).unwrap();

        assert!(a.ptr_eq(&b));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shared_retries_after_failure() {
        let container = Container::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let definition = Definition::new("flaky", vec![], {
            let attempts = attempts.clone();
            move |_| {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(LocatorError::failed("not yet"))
                } else {
                    Ok(Value::new(Session))
                }
            }
        });

        let callable = shared("flaky", Arc::downgrade(&container), definition);
        assert!(callable.call(vec![]).is_err());
        assert!(callable.call(vec![]).is_ok());
        assert!(callable.call(vec![]).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropped_owner_is_reported() {
        let container = Container::new();
        let owner = Arc::downgrade(&container);
        drop(container);

        let definition = Definition::new("orphan", vec![], |_| Ok(Value::new(())));
        let callable = factory("orphan", owner, definition);
        match callable.call(vec![]) {
            Err(LocatorError::ContainerDropped { entry }) => assert_eq!(entry, "orphan"),
            other => panic!("Expected ContainerDropped, got: {other:?}"),
        }
    }
}
