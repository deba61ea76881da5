//! Callable definitions and their declared parameters.
//!
//! A definition is anything the container can invoke: a closure, a
//! function item, or an [`Invokable`] object. Each one exposes the list
//! of its declared [`Parameter`]s so the invoker can tell which
//! positions want the container.
//!
//! For closures and functions the list comes from the parameter types
//! themselves, through [`FromArgument`]:
//!
//! | Parameter type       | Kind                                   |
//! |----------------------|----------------------------------------|
//! | `Arc<dyn Resolver>`  | injection point                        |
//! | `Arc<Container>`     | injection point                        |
//! | `Arg<T>`             | positional argument, cloned out as `T` |
//! | `Value`              | positional argument, untouched         |
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use locator_container::prelude::*;
//!
//! let container = Container::new();
//! container.add("greeting", "hello").unwrap();
//!
//! let greet = |c: Arc<dyn Resolver>, Arg(name): Arg<&'static str>| -> Result<String> {
//!     let greeting = c.resolve::<&'static str>("greeting")?;
//!     Ok(format!("{greeting}, {name}"))
//! };
//!
//! let out = container.invoke(greet, args!["world"]).unwrap();
//! assert_eq!(out.downcast_ref::<String>().map(String::as_str), Some("hello, world"));
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use locator_support::rendering::{present_definition, present_object};

use crate::container::Container;
use crate::error::{InvalidDefinitionError, LocatorError, Result};
use crate::resolver::Resolver;
use crate::value::Value;

/// Whether a parameter is filled by the container or by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Receives the injection target.
    Injected,
    /// Receives the next caller-supplied argument.
    Argument,
}

/// A declared parameter: its kind and the type it was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    kind: ParameterKind,
    type_name: &'static str,
}

impl Parameter {
    /// A parameter typed to the container capability (or an implementor).
    pub fn injected<T: ?Sized>() -> Self {
        Self {
            kind: ParameterKind::Injected,
            type_name: type_name::<T>(),
        }
    }

    /// A parameter filled from the caller's positional arguments.
    pub fn argument<T: ?Sized>() -> Self {
        Self {
            kind: ParameterKind::Argument,
            type_name: type_name::<T>(),
        }
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn is_injected(&self) -> bool {
        self.kind == ParameterKind::Injected
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A parameter descriptor that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parameter {position}: {reason}")]
pub struct SignatureError {
    pub position: usize,
    pub reason: String,
}

/// One slot of the spliced argument list.
#[derive(Clone)]
pub(crate) enum Argument {
    /// The injection target.
    Injected(Arc<dyn Resolver>),
    /// A caller-supplied value.
    Value(Value),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Injected(_) => write!(f, "Injected"),
            Argument::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// The positional argument list handed to a definition body.
///
/// Every accessor reports failures as [`LocatorError::InvalidDefinition`]
/// naming the definition and the position.
#[derive(Debug, Clone)]
pub struct Arguments {
    definition: Arc<str>,
    items: Vec<Argument>,
}

impl Arguments {
    pub(crate) fn new(definition: Arc<str>, items: Vec<Argument>) -> Self {
        Self { definition, items }
    }

    /// The injection target at `position`.
    pub fn resolver(&self, position: usize) -> Result<Arc<dyn Resolver>> {
        match self.items.get(position) {
            Some(Argument::Injected(target)) => Ok(target.clone()),
            Some(Argument::Value(value)) => Err(self.invalid(
                position,
                format!("Expected the container, found a value of type {}.", value.type_name()),
            )),
            None => Err(self.invalid(position, "Expected the container, but nothing was supplied.")),
        }
    }

    /// The injection target at `position`, as a concrete [`Container`].
    pub fn container(&self, position: usize) -> Result<Arc<Container>> {
        let target = self.resolver(position)?;
        target.as_container().and_then(Container::upgrade).ok_or_else(|| {
            self.invalid(
                position,
                "Expected a Container, but the injection target is another resolver.",
            )
        })
    }

    /// The caller-supplied value at `position`.
    pub fn value(&self, position: usize) -> Result<Value> {
        match self.items.get(position) {
            Some(Argument::Value(value)) => Ok(value.clone()),
            Some(Argument::Injected(_)) => Err(self.invalid(
                position,
                "Expected a value, found the container.",
            )),
            None => Err(self.invalid(
                position,
                format!("Expected a value, but only {} argument(s) were supplied.", self.items.len()),
            )),
        }
    }

    /// The caller-supplied value at `position`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, position: usize) -> Result<Arc<T>> {
        let value = self.value(position)?;
        value.downcast::<T>().ok_or_else(|| {
            self.invalid(
                position,
                format!(
                    "Expected a value of type {}, found {}.",
                    type_name::<T>(),
                    value.type_name()
                ),
            )
        })
    }

    /// Like [`get`](Arguments::get), cloning the `T` out.
    pub fn cloned<T: Any + Clone + Send + Sync>(&self, position: usize) -> Result<T> {
        self.get::<T>(position).map(|value| T::clone(&value))
    }

    fn invalid(&self, position: usize, reason: impl Into<String>) -> LocatorError {
        LocatorError::InvalidDefinition(InvalidDefinitionError {
            definition: self.definition.to_string(),
            position: Some(position),
            reason: reason.into(),
        })
    }
}

/// A parameter type a definition may declare.
pub trait FromArgument: Sized {
    /// The descriptor of this parameter type.
    fn parameter() -> Parameter;

    /// Extracts the parameter from the spliced argument list.
    fn from_arguments(arguments: &Arguments, position: usize) -> Result<Self>;
}

impl FromArgument for Arc<dyn Resolver> {
    fn parameter() -> Parameter {
        Parameter::injected::<dyn Resolver>()
    }

    fn from_arguments(arguments: &Arguments, position: usize) -> Result<Self> {
        arguments.resolver(position)
    }
}

impl FromArgument for Arc<Container> {
    fn parameter() -> Parameter {
        Parameter::injected::<Container>()
    }

    fn from_arguments(arguments: &Arguments, position: usize) -> Result<Self> {
        arguments.container(position)
    }
}

impl FromArgument for Value {
    fn parameter() -> Parameter {
        Parameter::argument::<Value>()
    }

    fn from_arguments(arguments: &Arguments, position: usize) -> Result<Self> {
        arguments.value(position)
    }
}

/// A caller-supplied argument of type `T`.
///
/// ```
/// use locator_container::prelude::*;
///
/// let container = Container::new();
/// let double = |Arg(n): Arg<i32>| -> Result<i32> { Ok(n * 2) };
/// let out = container.invoke(double, args![21]).unwrap();
/// assert_eq!(out.downcast_ref::<i32>(), Some(&42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Arg<T>(pub T);

impl<T: Any + Clone + Send + Sync> FromArgument for Arg<T> {
    fn parameter() -> Parameter {
        Parameter::argument::<T>()
    }

    fn from_arguments(arguments: &Arguments, position: usize) -> Result<Self> {
        arguments.cloned::<T>(position).map(Arg)
    }
}

/// An object that invokes itself with an explicit parameter descriptor.
///
/// Use this when the positions that want the container are only known
/// at run time, or to give a definition its own name in error messages.
///
/// ```
/// use locator_container::prelude::*;
///
/// struct Seed;
///
/// impl Invokable for Seed {
///     type Output = ();
///
///     fn parameters(&self) -> std::result::Result<Vec<Parameter>, SignatureError> {
///         Ok(vec![
///             Parameter::injected::<Container>(),
///             Parameter::argument::<&'static str>(),
///         ])
///     }
///
///     fn invoke(&self, arguments: &Arguments) -> Result<()> {
///         let container = arguments.container(0)?;
///         let id = arguments.cloned::<&'static str>(1)?;
///         container.add(id, "seeded")?;
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.register(Seed, args!["first"]).unwrap();
/// assert!(container.has("first"));
/// ```
pub trait Invokable: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    /// Declared parameters, in order.
    ///
    /// # Errors
    /// A [`SignatureError`] surfaces as [`LocatorError::InvalidDefinition`]
    /// when the object is invoked.
    fn parameters(&self) -> std::result::Result<Vec<Parameter>, SignatureError>;

    /// Runs the object with the spliced arguments.
    fn invoke(&self, arguments: &Arguments) -> Result<Self::Output>;
}

type Body = Box<dyn Fn(&Arguments) -> Result<Value> + Send + Sync>;

/// A normalized callable: presentation, declared signature, and body.
pub struct Definition {
    presentation: Arc<str>,
    signature: std::result::Result<Vec<Parameter>, SignatureError>,
    body: Body,
}

impl Definition {
    /// Builds a definition from its parts.
    pub fn new(
        presentation: impl Into<Arc<str>>,
        parameters: Vec<Parameter>,
        body: impl Fn(&Arguments) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::with_signature(presentation, Ok(parameters), body)
    }

    fn with_signature(
        presentation: impl Into<Arc<str>>,
        signature: std::result::Result<Vec<Parameter>, SignatureError>,
        body: impl Fn(&Arguments) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            presentation: presentation.into(),
            signature,
            body: Box::new(body),
        }
    }

    /// Human-readable form used in error messages.
    pub fn presentation(&self) -> &str {
        &self.presentation
    }

    pub(crate) fn presentation_arc(&self) -> Arc<str> {
        self.presentation.clone()
    }

    /// The declared parameters.
    ///
    /// # Errors
    /// Returns [`LocatorError::InvalidDefinition`] if the descriptor failed.
    pub fn parameters(&self) -> Result<&[Parameter]> {
        match &self.signature {
            Ok(parameters) => Ok(parameters),
            Err(err) => Err(LocatorError::InvalidDefinition(InvalidDefinitionError {
                definition: self.presentation.to_string(),
                position: Some(err.position),
                reason: err.reason.clone(),
            })),
        }
    }

    pub(crate) fn call(&self, arguments: &Arguments) -> Result<Value> {
        (self.body)(arguments)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("presentation", &self.presentation)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Conversion into a [`Definition`].
///
/// `Marker` only disambiguates the blanket implementations; callers
/// never name it.
pub trait IntoDefinition<Marker>: Send + Sync + 'static {
    fn into_definition(self) -> Definition;
}

#[doc(hidden)]
pub struct DefinitionMarker;

#[doc(hidden)]
pub struct InvokableMarker;

impl IntoDefinition<DefinitionMarker> for Definition {
    fn into_definition(self) -> Definition {
        self
    }
}

impl<T: Invokable> IntoDefinition<InvokableMarker> for T {
    fn into_definition(self) -> Definition {
        let signature = self.parameters();
        Definition::with_signature(present_object(type_name::<T>()), signature, move |arguments| {
            self.invoke(arguments).map(Value::new)
        })
    }
}

macro_rules! impl_into_definition {
    ($($param:ident),*) => {
        impl<F, R, $($param,)*> IntoDefinition<fn($($param,)*) -> R> for F
        where
            F: Fn($($param),*) -> Result<R> + Send + Sync + 'static,
            R: Send + Sync + 'static,
            $($param: FromArgument + 'static,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_definition(self) -> Definition {
                let parameters = vec![$($param::parameter()),*];
                Definition::new(present_definition(type_name::<F>()), parameters, move |arguments| {
                    let mut position = 0usize;
                    $(
                        let $param = $param::from_arguments(arguments, position)?;
                        position += 1;
                    )*
                    (self)($($param),*).map(Value::new)
                })
            }
        }
    };
}

impl_into_definition!();
impl_into_definition!(P0);
impl_into_definition!(P0, P1);
impl_into_definition!(P0, P1, P2);
impl_into_definition!(P0, P1, P2, P3);
impl_into_definition!(P0, P1, P2, P3, P4);
impl_into_definition!(P0, P1, P2, P3, P4, P5);
impl_into_definition!(P0, P1, P2, P3, P4, P5, P6);
impl_into_definition!(P0, P1, P2, P3, P4, P5, P6, P7);

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(items: Vec<Argument>) -> Arguments {
        Arguments::new(Arc::from("closure defined in tests"), items)
    }

    fn define_static(_c: Arc<dyn Resolver>, Arg(a): Arg<String>) -> Result<String> {
        Ok(a)
    }

    #[test]
    fn closure_signature_follows_parameter_types() {
        let definition = (|_a: Arg<u8>, _c: Arc<dyn Resolver>, _v: Value| -> Result<()> { Ok(()) })
            .into_definition();
        let kinds: Vec<ParameterKind> = definition
            .parameters()
            .unwrap()
            .iter()
            .map(Parameter::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ParameterKind::Argument, ParameterKind::Injected, ParameterKind::Argument]
        );
        assert!(definition.presentation().starts_with("closure defined in"));
    }

    #[test]
    fn function_presentation() {
        let definition = define_static.into_definition();
        assert!(definition.presentation().ends_with("define_static()"));
        assert_eq!(definition.parameters().unwrap().len(), 2);
    }

    #[test]
    fn container_parameter_is_injected() {
        assert!(<Arc<Container> as FromArgument>::parameter().is_injected());
        assert!(!<Arg<String> as FromArgument>::parameter().is_injected());
        assert_eq!(<Arg<String> as FromArgument>::parameter().type_name(), type_name::<String>());
    }

    #[test]
    fn missing_argument_names_definition() {
        let err = arguments(vec![]).get::<String>(0).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Argument 0 of closure defined in tests"));
        assert!(msg.contains("only 0 argument(s)"));
    }

    #[test]
    fn mismatched_argument_type() {
        let err = arguments(vec![Argument::Value(Value::new(7i32))])
            .get::<String>(0)
            .unwrap_err();
        assert!(format!("{err}").contains("found i32"));
    }

    #[test]
    fn value_where_container_expected() {
        let err = arguments(vec![Argument::Value(Value::new(7i32))])
            .resolver(0)
            .err()
            .unwrap();
        assert!(matches!(err, LocatorError::InvalidDefinition(_)));
    }

    #[test]
    fn failed_signature_reported_with_position() {
        struct Broken;

        impl Invokable for Broken {
            type Output = ();

            fn parameters(&self) -> std::result::Result<Vec<Parameter>, SignatureError> {
                Err(SignatureError {
                    position: 2,
                    reason: "unknown type Mailer".to_string(),
                })
            }

            fn invoke(&self, _arguments: &Arguments) -> Result<()> {
                Ok(())
            }
        }

        let definition = Broken.into_definition();
        let err = definition.parameters().unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Argument 2 of invokable object Broken"));
        assert!(msg.contains("unknown type Mailer"));
    }
}
