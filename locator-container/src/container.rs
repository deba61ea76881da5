//! # The Container
//!
//! A keyed registry of values and factories with an optional delegate.
//!
//! # Delegation
//! ```text
//!           Master                          Lookup
//!
//!   ┌──────────────┐                ┌──────────────┐
//!   │   upstream   │◄─ has/get ─┐   │   upstream   │◄─ injected into
//!   └──────────────┘   first    │   └──────────────┘   definitions
//!   ┌──────────────┐            │   ┌──────────────┐
//!   │  container   │────────────┘   │  container   │  (storage untouched)
//!   └──────────────┘                └──────────────┘
//! ```
//!
//! # Examples
//! ```rust
//! use locator_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Mailer {
//!     host: &'static str,
//! }
//!
//! let container = Container::new();
//! container
//!     .add("mailer.host", "smtp.local")?
//!     .add_shared("mailer", |c: Arc<dyn Resolver>| -> Result<Mailer> {
//!         Ok(Mailer { host: *c.resolve::<&'static str>("mailer.host")? })
//!     })?;
//!
//! let first = container.call("mailer", args![])?;
//! let second = container.call("mailer", args![])?;
//! assert!(first.ptr_eq(&second));
//! assert_eq!(first.downcast_ref::<Mailer>().map(|m| m.host), Some("smtp.local"));
//! # Ok::<(), LocatorError>(())
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use locator_support::rendering::suggest_similar;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::definition::{Definition, IntoDefinition};
use crate::error::{LocatorError, NotCallableError, NotFoundError, Result, ShadowedError};
use crate::lifecycle::{self, Callable};
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::value::Value;

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// Delegation
// ============================================================

/// The role a delegate container plays, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DelegateRole {
    /// Consulted before local storage; owns every id it has.
    #[default]
    Master,
    /// Injected into invoked definitions in place of the container.
    Lookup,
}

impl fmt::Display for DelegateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateRole::Master => write!(f, "Master"),
            DelegateRole::Lookup => write!(f, "Lookup"),
        }
    }
}

/// A container holds one delegate at most, in exactly one role.
enum Delegate {
    Master(Arc<dyn Resolver>),
    Lookup(Arc<dyn Resolver>),
}

impl Delegate {
    fn new(resolver: Arc<dyn Resolver>, role: DelegateRole) -> Self {
        match role {
            DelegateRole::Master => Delegate::Master(resolver),
            DelegateRole::Lookup => Delegate::Lookup(resolver),
        }
    }

    fn role(&self) -> DelegateRole {
        match self {
            Delegate::Master(_) => DelegateRole::Master,
            Delegate::Lookup(_) => DelegateRole::Lookup,
        }
    }
}

// ============================================================
// ContainerBuilder
// ============================================================

/// Configures a [`Container`] before it is created.
///
/// # Examples
/// ```rust
/// use locator_container::prelude::*;
///
/// let parent = Container::new();
/// let child = Container::builder()
///     .master(parent.clone())
///     .build();
///
/// assert_eq!(child.delegate_role(), Some(DelegateRole::Master));
/// ```
pub struct ContainerBuilder {
    delegate: Option<Delegate>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self { delegate: None }
    }

    /// Sets the delegate and its role, replacing any earlier one.
    pub fn delegate(mut self, delegate: Arc<dyn Resolver>, role: DelegateRole) -> Self {
        self.delegate = Some(Delegate::new(delegate, role));
        self
    }

    /// Shorthand for `.delegate(delegate, DelegateRole::Master)`.
    pub fn master(self, delegate: Arc<dyn Resolver>) -> Self {
        self.delegate(delegate, DelegateRole::Master)
    }

    /// Shorthand for `.delegate(delegate, DelegateRole::Lookup)`.
    pub fn lookup(self, delegate: Arc<dyn Resolver>) -> Self {
        self.delegate(delegate, DelegateRole::Lookup)
    }

    /// Creates the container.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Arc<Container> {
        info!(
            delegate = ?self.delegate.as_ref().map(Delegate::role),
            "Building container"
        );

        Arc::new_cyclic(|this| Container {
            registry: RwLock::new(Registry::new()),
            delegate: self.delegate,
            this: this.clone(),
        })
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// A keyed service container.
///
/// Always handed out as `Arc<Container>`: the container injects a
/// reference to itself into the definitions it invokes.
pub struct Container {
    registry: RwLock<Registry>,
    delegate: Option<Delegate>,
    this: Weak<Container>,
}

impl Container {
    /// Creates an empty container without a delegate.
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    /// Creates a container delegating to `delegate` in the given role.
    pub fn with_delegate(delegate: Arc<dyn Resolver>, role: DelegateRole) -> Arc<Self> {
        Self::builder().delegate(delegate, role).build()
    }

    /// Creates a container that defers to `delegate` for every id it has.
    pub fn with_master(delegate: Arc<dyn Resolver>) -> Arc<Self> {
        Self::with_delegate(delegate, DelegateRole::Master)
    }

    /// Creates a container whose definitions receive `delegate` instead of it.
    pub fn with_lookup(delegate: Arc<dyn Resolver>) -> Arc<Self> {
        Self::with_delegate(delegate, DelegateRole::Lookup)
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// The role of the delegate, if there is one.
    pub fn delegate_role(&self) -> Option<DelegateRole> {
        self.delegate.as_ref().map(Delegate::role)
    }

    // ── Lookup ──

    /// Returns `true` if the master delegate or the local registry has `id`.
    pub fn has(&self, id: &str) -> bool {
        self.master().is_some_and(|master| master.has(id)) || self.registry.read().contains(id)
    }

    /// Resolves `id`.
    ///
    /// The master delegate wins over a local entry with the same id.
    ///
    /// # Errors
    /// Returns [`LocatorError::NotFound`] if neither has `id`.
    pub fn get(&self, id: &str) -> Result<Value> {
        if let Some(master) = self.master() {
            if master.has(id) {
                trace!(id, "Resolved through master delegate");
                return master.get(id);
            }
        }

        let registry = self.registry.read();
        if let Some(value) = registry.get(id) {
            return Ok(value.clone());
        }

        let ids = registry.ids();
        let available: Vec<&str> = ids.iter().map(String::as_str).collect();
        Err(LocatorError::NotFound(NotFoundError {
            id: id.to_string(),
            suggestions: suggest_similar(id, &available, MAX_SUGGESTIONS),
        }))
    }

    // ── Registration ──

    /// Stores `value` under `id`, silently replacing any local entry.
    ///
    /// # Errors
    /// Returns [`LocatorError::ShadowedByMaster`] if the master delegate owns
    /// `id`. The registry is then left unchanged.
    pub fn add<T: Send + Sync + 'static>(&self, id: impl Into<String>, value: T) -> Result<&Self> {
        let id = id.into();

        if self.master().is_some_and(|master| master.has(&id)) {
            warn!(id = %id, "Rejected assignment: master container owns this id");
            return Err(LocatorError::ShadowedByMaster(ShadowedError { id }));
        }

        self.registry.write().insert(id, Value::new(value));
        Ok(self)
    }

    /// Registers a definition that runs on every call of the entry.
    pub fn add_factory<M>(&self, id: impl Into<String>, definition: impl IntoDefinition<M>) -> Result<&Self> {
        let id = id.into();
        let callable = lifecycle::factory(&id, self.this.clone(), definition.into_definition());
        debug!(id = %id, definition = callable.presentation(), "Adding factory");
        self.add(id, callable)
    }

    /// Registers a definition that runs on the first call only.
    pub fn add_shared<M>(&self, id: impl Into<String>, definition: impl IntoDefinition<M>) -> Result<&Self> {
        let id = id.into();
        let callable = lifecycle::shared(&id, self.this.clone(), definition.into_definition());
        debug!(id = %id, definition = callable.presentation(), "Adding shared");
        self.add(id, callable)
    }

    /// Removes the local entry for `id`, if any.
    ///
    /// Entries of the master delegate are not affected.
    pub fn remove(&self, id: &str) -> &Self {
        self.registry.write().remove(id);
        self
    }

    /// Invokes `provider` for its side effects and discards its result.
    ///
    /// A provider usually declares a container parameter and calls `add`
    /// on it.
    pub fn register<M>(&self, provider: impl IntoDefinition<M>, arguments: Vec<Value>) -> Result<&Self> {
        let definition = provider.into_definition();
        debug!(provider = definition.presentation(), "Registering provider");
        self.invoke_definition(&definition, arguments)?;
        Ok(self)
    }

    // ── Sugar ──

    /// Resolves `id` and calls it.
    ///
    /// # Errors
    /// Returns [`LocatorError::NotCallable`] if the value is not a [`Callable`].
    pub fn call(&self, id: &str, arguments: Vec<Value>) -> Result<Value> {
        let value = self.get(id)?;
        match value.downcast_ref::<Callable>() {
            Some(callable) => callable.call(arguments),
            None => Err(LocatorError::NotCallable(NotCallableError {
                id: id.to_string(),
                type_name: value.type_name(),
            })),
        }
    }

    /// Number of local entries.
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// Returns true if no local entries exist.
    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Local ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.registry.read().ids()
    }

    /// Snapshot of local entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.registry.read().entries()
    }

    // ── Internal ──

    fn master(&self) -> Option<&Arc<dyn Resolver>> {
        match &self.delegate {
            Some(Delegate::Master(master)) => Some(master),
            _ => None,
        }
    }

    /// The reference `definition` receives: the lookup delegate, else self.
    pub(crate) fn injection_target(&self, definition: &Definition) -> Result<Arc<dyn Resolver>> {
        if let Some(Delegate::Lookup(lookup)) = &self.delegate {
            return Ok(lookup.clone());
        }
        self.upgrade()
            .map(|this| this as Arc<dyn Resolver>)
            .ok_or_else(|| LocatorError::ContainerDropped {
                entry: definition.presentation().to_string(),
            })
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<Container>> {
        self.this.upgrade()
    }
}

impl Resolver for Container {
    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }

    fn get(&self, id: &str) -> Result<Value> {
        Container::get(self, id)
    }

    fn as_container(&self) -> Option<&Container> {
        Some(self)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("entries", &self.len())
            .field("delegate", &self.delegate_role())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, DelegateRole};
    pub use crate::args;
    pub use crate::definition::{
        Arg, Arguments, Definition, FromArgument, Invokable, IntoDefinition, Parameter,
        ParameterKind, SignatureError,
    };
    pub use crate::error::{LocatorError, Result};
    pub use crate::lifecycle::{Callable, Lifecycle};
    pub use crate::resolver::{Resolver, ResolverExt};
    pub use crate::value::Value;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Arg;
    use crate::resolver::ResolverExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Probe;

    #[test]
    fn add_and_get_value() {
        let container = Container::new();
        container.add("greeting", "hi").unwrap();

        assert!(container.has("greeting"));
        assert_eq!(*container.resolve::<&str>("greeting").unwrap(), "hi");
    }

    #[test]
    fn get_missing_is_not_found() {
        let container = Container::new();
        container.add("mailer", 1u8).unwrap();

        assert!(!container.has("mail"));
        match container.get("mail").unwrap_err() {
            LocatorError::NotFound(e) => {
                assert_eq!(e.id, "mail");
                assert_eq!(e.suggestions, vec!["mailer".to_string()]);
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn add_overwrites_silently() {
        let container = Container::new();
        container.add("id", 1i32).unwrap().add("id", 2i32).unwrap();
        assert_eq!(*container.resolve::<i32>("id").unwrap(), 2);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let container = Container::new();
        container.add("greeting", "hi").unwrap();
        container.remove("greeting").remove("greeting");
        assert!(!container.has("greeting"));
        assert!(container.is_empty());
    }

    #[test]
    fn master_owns_its_ids() {
        let master = Container::new();
        master.add("x", 1i32).unwrap();
        let child = Container::with_master(master.clone());

        assert!(matches!(
            child.add("x", 2i32).unwrap_err(),
            LocatorError::ShadowedByMaster(_)
        ));
        assert_eq!(*child.resolve::<i32>("x").unwrap(), 1);
        assert!(child.is_empty());
    }

    #[test]
    fn master_owns_ids_for_factories_and_shared() {
        let master = Container::new();
        master.add("x", 1i32).unwrap();
        let child = Container::with_master(master.clone());

        let factory = child.add_factory("x", || -> Result<i32> { Ok(2) });
        assert!(matches!(factory.unwrap_err(), LocatorError::ShadowedByMaster(_)));

        let shared = child.add_shared("x", || -> Result<i32> { Ok(3) });
        assert!(matches!(shared.unwrap_err(), LocatorError::ShadowedByMaster(_)));

        assert_eq!(child.len(), 0);
        assert!(child.ids().is_empty());
        assert_eq!(*child.resolve::<i32>("x").unwrap(), 1);
        assert_eq!(master.len(), 1);
    }

    #[test]
    fn master_does_not_see_child_entries() {
        let master = Container::new();
        let child = Container::with_master(master.clone());
        child.add("local", true).unwrap();

        assert!(child.has("local"));
        assert!(!master.has("local"));
    }

    #[test]
    fn lookup_delegate_is_injected() {
        let upstream = Container::new();
        upstream.add("upstream", 1u8).unwrap();
        let child = Container::with_lookup(upstream.clone());
        child.add("local", 2u8).unwrap();

        assert!(!child.has("upstream"));

        let upstream_for_check = upstream.clone();
        child
            .add_shared("probe", move |c: Arc<Container>| -> Result<bool> {
                Ok(Arc::ptr_eq(&c, &upstream_for_check) && c.has("upstream") && !c.has("local"))
            })
            .unwrap();

        let out = child.call("probe", vec![]).unwrap();
        assert_eq!(out.downcast_ref::<bool>(), Some(&true));
    }

    #[test]
    fn self_is_injected_without_lookup() {
        let container = Container::new();
        let weak = Arc::downgrade(&container);
        container
            .add_factory("probe", move |c: Arc<Container>| -> Result<bool> {
                Ok(weak.upgrade().is_some_and(|this| Arc::ptr_eq(&this, &c)))
            })
            .unwrap();

        let out = container.call("probe", vec![]).unwrap();
        assert_eq!(out.downcast_ref::<bool>(), Some(&true));
    }

    #[test]
    fn factory_results_are_distinct() {
        let container = Container::new();
        container
            .add_factory("probe", || -> Result<Probe> { Ok(Probe) })
            .unwrap();

        let a = container.call("probe", vec![]).unwrap();
        let b = container.call("probe", vec![]).unwrap();
        assert!(!a.ptr_eq(&b));
        assert!(a.is::<Probe>());
    }

    #[test]
    fn shared_ignores_later_arguments() {
        let container = Container::new();
        let calls = Arc::new(AtomicU32::new(0));
        container
            .add_shared("echo", {
                let calls = calls.clone();
                move |Arg(n): Arg<i32>| -> Result<i32> {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(n)
                }
            })
            .unwrap();

        let a = container.call("echo", vec![Value::new(7)]).unwrap();
        let b = container.call("echo", vec![Value::new(8)]).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(b.downcast_ref::<i32>(), Some(&7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn call_non_callable_fails() {
        let container = Container::new();
        container.add("id", "string_value").unwrap();
        match container.call("id", vec![]).unwrap_err() {
            LocatorError::NotCallable(e) => assert_eq!(e.id, "id"),
            other => panic!("Expected NotCallable, got: {other:?}"),
        }
    }

    #[test]
    fn register_runs_provider() {
        let container = Container::new();
        container
            .register(
                |c: Arc<Container>, Arg(id): Arg<&'static str>| -> Result<()> {
                    c.add(id, "test_value")?;
                    Ok(())
                },
                vec![Value::new("seeded")],
            )
            .unwrap();
        assert!(container.has("seeded"));
    }

    #[test]
    fn entries_keep_insertion_order() {
        let container = Container::new();
        for id in ["id1", "id2", "id3"] {
            container.add(id, id).unwrap();
        }
        assert_eq!(container.ids(), vec!["id1", "id2", "id3"]);
        assert_eq!(container.entries().len(), 3);
    }

    #[test]
    fn debug_display() {
        let container = Container::new();
        container.add("a", 1i32).unwrap().add("b", 2i32).unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("2"));
    }

    #[test]
    fn build_emits_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("locator_container=trace")
            .try_init();

        let container = Container::new();
        container.add("traced", ()).unwrap();
        assert!(container.has("traced"));
    }
}
