//! Structural introspection of case payloads.
//!
//! A payload describes itself through [`Describe`]: an optional display name and
//! the `debug` / `skip` markers. Records get the implementation from
//! `#[derive(Describe)]`, which looks up the conventional field names (`name`,
//! `scenario`, `Name`, `Scenario`; `debug`/`Debug`; `skip`/`Skip`). Everything
//! else is a non-record and describes nothing.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

/// Self-description of a case payload. Every method has a "nothing to say" default.
pub trait Describe {
    /// Non-blank display name carried by the payload, already trimmed.
    fn case_name(&self) -> Option<&str> {
        None
    }

    /// Whether the payload asks to be debugged (focus mode).
    fn is_debug(&self) -> bool {
        false
    }

    /// Whether the payload asks to be skipped.
    fn is_skip(&self) -> bool {
        false
    }
}

/// `text` trimmed, or `None` if nothing is left.
#[doc(hidden)]
pub fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Resolve the display name of a case.
///
/// The trimmed `hint` wins; then the payload's own name; then `testcase-NNN`.
pub fn name_or_default<T: Describe + ?Sized>(value: &T, hint: &str, index: usize) -> String {
    if let Some(hint) = non_blank(hint) {
        return hint.to_string();
    }
    if let Some(name) = value.case_name().and_then(non_blank) {
        return name.to_string();
    }
    format!("testcase-{index:03}")
}

pub fn is_debugging<T: Describe + ?Sized>(value: &T) -> bool {
    value.is_debug()
}

pub fn is_skipping<T: Describe + ?Sized>(value: &T) -> bool {
    value.is_skip()
}

/// Wraps any value as a payload that describes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Plain<T>(pub T);

impl<T> Describe for Plain<T> {}

// Indirections are transparent.

impl<T: Describe + ?Sized> Describe for &T {
    fn case_name(&self) -> Option<&str> {
        (**self).case_name()
    }

    fn is_debug(&self) -> bool {
        (**self).is_debug()
    }

    fn is_skip(&self) -> bool {
        (**self).is_skip()
    }
}

impl<T: Describe + ?Sized> Describe for &mut T {
    fn case_name(&self) -> Option<&str> {
        (**self).case_name()
    }

    fn is_debug(&self) -> bool {
        (**self).is_debug()
    }

    fn is_skip(&self) -> bool {
        (**self).is_skip()
    }
}

macro_rules! describe_through {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ptr<T> {
                fn case_name(&self) -> Option<&str> {
                    (**self).case_name()
                }

                fn is_debug(&self) -> bool {
                    (**self).is_debug()
                }

                fn is_skip(&self) -> bool {
                    (**self).is_skip()
                }
            }
        )*
    };
}

describe_through!(Box, Rc, Arc);

/// `None` is an absent record.
impl<T: Describe> Describe for Option<T> {
    fn case_name(&self) -> Option<&str> {
        self.as_ref().and_then(Describe::case_name)
    }

    fn is_debug(&self) -> bool {
        self.as_ref().is_some_and(Describe::is_debug)
    }

    fn is_skip(&self) -> bool {
        self.as_ref().is_some_and(Describe::is_skip)
    }
}

macro_rules! describe_nothing {
    ($($ty:ty),* $(,)?) => {
        $(impl Describe for $ty {})*
    };
}

describe_nothing!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, str, String,
);

impl Describe for Cow<'_, str> {}

impl<T> Describe for [T] {}

impl<T, const N: usize> Describe for [T; N] {}

impl<T> Describe for Vec<T> {}

impl<K, V, S> Describe for HashMap<K, V, S> {}

impl<K, V> Describe for BTreeMap<K, V> {}

macro_rules! describe_tuples {
    ($(($($name:ident),+)),* $(,)?) => {
        $(impl<$($name),+> Describe for ($($name,)+) {})*
    };
}

describe_tuples!((A), (A, B), (A, B, C), (A, B, C, D), (A, B, C, D, E), (A, B, C, D, E, F));
