//! Test-function adapter.
//!
//! A runner accepts either a named function `(name, payload)` or an anonymous one
//! `(payload)`; both are normalized to [`Executor::execute`].

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::diagnostics;

/// Test function receiving the resolved case name and the payload.
pub type NamedFn<T> = Arc<dyn Fn(&str, T) + Send + Sync>;

/// Test function receiving only the payload.
pub type AnonymousFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Holds at most one of the two test-function shapes.
///
/// An empty executor is legal until it is executed, which reports an invalid test.
pub struct Executor<T> {
    named: Option<NamedFn<T>>,
    anonymous: Option<AnonymousFn<T>>,
}

impl<T> Clone for Executor<T> {
    fn clone(&self) -> Self {
        Self {
            named: self.named.clone(),
            anonymous: self.anonymous.clone(),
        }
    }
}

impl<T> fmt::Debug for Executor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match (&self.named, &self.anonymous) {
            (Some(_), _) => "named",
            (None, Some(_)) => "anonymous",
            (None, None) => "empty",
        };
        f.debug_tuple("Executor").field(&shape).finish()
    }
}

impl<T> Executor<T> {
    pub fn named(f: impl Fn(&str, T) + Send + Sync + 'static) -> Self {
        Self {
            named: Some(Arc::new(f)),
            anonymous: None,
        }
    }

    pub fn anonymous(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            named: None,
            anonymous: Some(Arc::new(f)),
        }
    }

    pub fn empty() -> Self {
        Self {
            named: None,
            anonymous: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_none() && self.anonymous.is_none()
    }

    /// Call whichever shape is populated.
    #[track_caller]
    pub fn execute(&self, name: &str, payload: T) {
        if let Some(named) = &self.named {
            named(name, payload);
        } else if let Some(anonymous) = &self.anonymous {
            anonymous(payload);
        } else {
            diagnostics::invalid(["a test function must be provided"]);
        }
    }
}

impl<T: 'static> Executor<T> {
    /// Adopt an arbitrary value as a test function.
    ///
    /// `value` must be a [`NamedFn<T>`] or an [`AnonymousFn<T>`]; anything else is
    /// reported as a warning and yields an empty executor.
    #[track_caller]
    pub fn from_value<V: Any>(value: V) -> Self {
        let any: &dyn Any = &value;
        if let Some(named) = any.downcast_ref::<NamedFn<T>>() {
            return Self {
                named: Some(Arc::clone(named)),
                anonymous: None,
            };
        }
        if let Some(anonymous) = any.downcast_ref::<AnonymousFn<T>>() {
            return Self {
                named: None,
                anonymous: Some(Arc::clone(anonymous)),
            };
        }
        diagnostics::warning(&format!("{} is not a valid test function", type_name::<V>()));
        Self::empty()
    }
}

/// Marker for closures taking `(name, payload)`.
pub struct NamedShape;

/// Marker for closures taking `(payload)`.
pub struct AnonymousShape;

/// Marker for ready-made executors.
pub struct ExecutorShape;

/// Marker for possibly missing executors.
pub struct OptionalShape;

/// Anything a [`crate::Runner`] can be built from.
///
/// `None` means no executor was supplied at all.
pub trait IntoExecutor<T, Marker> {
    fn into_executor(self) -> Option<Executor<T>>;
}

impl<T, F> IntoExecutor<T, NamedShape> for F
where
    F: Fn(&str, T) + Send + Sync + 'static,
{
    fn into_executor(self) -> Option<Executor<T>> {
        Some(Executor::named(self))
    }
}

impl<T, F> IntoExecutor<T, AnonymousShape> for F
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn into_executor(self) -> Option<Executor<T>> {
        Some(Executor::anonymous(self))
    }
}

impl<T> IntoExecutor<T, ExecutorShape> for Executor<T> {
    fn into_executor(self) -> Option<Executor<T>> {
        Some(self)
    }
}

impl<T> IntoExecutor<T, OptionalShape> for Option<Executor<T>> {
    fn into_executor(self) -> Option<Executor<T>> {
        self
    }
}
