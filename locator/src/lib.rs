//! # Locator: a keyed service container for Rust
//!
//! Register values, factories, and shared (memoized) factories under
//! string ids, then resolve them by id. Definitions that declare a
//! container parameter get the container injected at that position.
//!
//! ```
//! use std::sync::Arc;
//! use locator::prelude::*;
//!
//! let container = Container::new();
//! container
//!     .add("greeting", "hi")
//!     .unwrap()
//!     .add_factory("shout", |c: Arc<dyn Resolver>, Arg(name): Arg<&'static str>| -> Result<String> {
//!         let greeting = c.resolve::<&'static str>("greeting")?;
//!         Ok(format!("{}, {name}!", greeting.to_uppercase()))
//!     })
//!     .unwrap();
//!
//! let out = container.call("shout", args!["ada"]).unwrap();
//! assert_eq!(out.downcast_ref::<String>().map(String::as_str), Some("HI, ada!"));
//! ```

pub use locator_container::*;
pub use locator_support::*;
