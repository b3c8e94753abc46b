//! # Signature Normalization
//!
//! Maps observer callables and notification argument lists onto one canonical
//! dispatch key.
//!
//! ## Calling Convention
//!
//! A notification carries its arguments as a tuple passed by value: `()`,
//! `(a,)`, `(a, b)`, up to eight elements. Every observer receives each element
//! by shared reference, so an observer of `(A, B)` is any `Fn(&A, &B)`.
//! Because there is exactly one convention per tuple type, the tuple's
//! `TypeId` is the bucket key for both sides.
//!
//! ## Rejected Observers
//!
//! Compatibility is checked by the trait system when the observer is
//! subscribed, never at dispatch time.
//!
//! Observers cannot return a value, since a notification may reach zero, one,
//! or many of them:
//!
//! ```compile_fail
//! use shared_subject::Subject;
//!
//! let subject: Subject = Subject::new();
//! let _sub = subject.subscribe(|x: &i32| *x + 1);
//! ```
//!
//! Observers cannot take a mutable reference, since the same argument value is
//! shared by every observer of the notification:
//!
//! ```compile_fail
//! use shared_subject::Subject;
//!
//! let subject: Subject = Subject::new();
//! let _sub = subject.subscribe(|x: &mut i32| *x = 1);
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical descriptor of an argument list.
///
/// Equality and hashing use the `TypeId` of the argument tuple only; the type
/// name is carried for logs and `Debug` output.
#[derive(Clone, Copy)]
pub struct Signature {
    id: TypeId,
    arity: usize,
    name: &'static str,
}

impl Signature {
    /// Descriptor for the argument tuple `Args`.
    #[must_use]
    pub fn of<Args: ArgumentList>() -> Self {
        Self {
            id: TypeId::of::<Args>(),
            arity: Args::ARITY,
            name: type_name::<Args>(),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Type name of the argument tuple.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("arity", &self.arity)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.name)
    }
}

/// An argument tuple that can be carried by a notification.
///
/// Implemented for `()` and tuples of up to eight `'static` elements.
pub trait ArgumentList: 'static {
    /// Number of elements in the tuple.
    const ARITY: usize;

    /// Canonical signature of this tuple.
    #[must_use]
    fn signature() -> Signature
    where
        Self: Sized,
    {
        Signature::of::<Self>()
    }
}

/// A callable that can be subscribed for notifications carrying `Args`.
///
/// Blanket-implemented for every `Fn(&A, &B, ..) + Send + Sync + 'static`
/// returning `()`.
pub trait Observer<Args: ArgumentList>: Send + Sync + 'static {
    /// Invoke the observer with one notification's arguments.
    fn on_notify(&self, args: &Args);
}

macro_rules! impl_arguments {
    ($arity:literal $(, $arg:ident)*) => {
        impl<$($arg: 'static),*> ArgumentList for ($($arg,)*) {
            const ARITY: usize = $arity;
        }

        impl<Func, $($arg: 'static),*> Observer<($($arg,)*)> for Func
        where
            Func: Fn($(&$arg),*) + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn on_notify(&self, args: &($($arg,)*)) {
                let ($($arg,)*) = args;
                (self)($($arg),*);
            }
        }
    };
}

impl_arguments!(0);
impl_arguments!(1, A);
impl_arguments!(2, A, B);
impl_arguments!(3, A, B, C);
impl_arguments!(4, A, B, C, D);
impl_arguments!(5, A, B, C, D, E);
impl_arguments!(6, A, B, C, D, E, F);
impl_arguments!(7, A, B, C, D, E, F, G);
impl_arguments!(8, A, B, C, D, E, F, G, H);
