//! # Subscriptions
//!
//! Handles returned by [`Subject::subscribe`](crate::Subject::subscribe).
//!
//! - [`Subscription`]: plain token. Dropping it leaves the observer
//!   registered; call [`Subscription::unsubscribe`] to remove it.
//! - [`ScopedSubscription`]: guard that unsubscribes exactly once when it goes
//!   out of scope, including during unwinding.
//!
//! Tokens hold only a weak reference to the subject. Once the subject is
//! dropped, unsubscribing is a silent no-op.

use crate::collection::CallableId;
use std::any::Any;
use std::fmt;
use std::sync::Weak;

type UnsubscribeFn = Box<dyn FnOnce() + Send + Sync>;

/// Capability to remove one observer from the subject it was registered on.
#[must_use = "dropping a Subscription keeps the observer registered; use `scoped()` to tie it to a scope"]
pub struct Subscription {
    id: CallableId,
    action: Option<UnsubscribeFn>,
    owner: Weak<dyn Any + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new(
        id: CallableId,
        owner: Weak<dyn Any + Send + Sync>,
        action: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            action: Some(Box::new(action)),
            owner,
        }
    }

    /// Token with nothing left to do.
    fn detached(id: CallableId) -> Self {
        let owner: Weak<dyn Any + Send + Sync> = Weak::<()>::new();
        Self {
            id,
            action: None,
            owner,
        }
    }

    /// Identifier of the observer within its tag's collection.
    #[must_use]
    pub fn id(&self) -> CallableId {
        self.id
    }

    /// Whether unsubscribing would still have an effect.
    ///
    /// False once [`unsubscribe`](Self::unsubscribe) has run or the owning
    /// subject has been dropped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.action.is_some() && self.owner.strong_count() > 0
    }

    /// Remove the observer from its subject.
    ///
    /// Runs at most once; later calls, and calls after the subject has been
    /// dropped, do nothing. An in-flight notify that already loaded its
    /// snapshot may still invoke the observer one last time.
    pub fn unsubscribe(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    /// Tie this subscription to a scope.
    pub fn scoped(self) -> ScopedSubscription {
        ScopedSubscription::new(self)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Subscription that is released when dropped.
#[must_use = "dropping a ScopedSubscription unsubscribes immediately"]
#[derive(Debug)]
pub struct ScopedSubscription {
    inner: Subscription,
}

impl ScopedSubscription {
    /// Guard `subscription` until the end of the current scope.
    pub fn new(subscription: Subscription) -> Self {
        Self {
            inner: subscription,
        }
    }

    /// Identifier of the guarded observer.
    #[must_use]
    pub fn id(&self) -> CallableId {
        self.inner.id()
    }

    /// Whether the guarded subscription is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Unsubscribe now instead of at the end of the scope.
    pub fn unsubscribe(mut self) {
        self.inner.unsubscribe();
    }

    /// Disarm the guard and hand back the plain token without unsubscribing.
    pub fn release(mut self) -> Subscription {
        let id = self.inner.id();
        std::mem::replace(&mut self.inner, Subscription::detached(id))
    }
}

impl From<Subscription> for ScopedSubscription {
    fn from(subscription: Subscription) -> Self {
        Self::new(subscription)
    }
}

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        self.inner.unsubscribe();
    }
}
