//! # Subject
//!
//! Tag-routed, signature-typed observer registry.
//!
//! ## Snapshot Protocol
//!
//! The subscriber table (`tag -> CallableCollection`) is an immutable value
//! published through an [`ArcSwap`]:
//!
//! - **Read path** (`notify*`, introspection): load the current table and use
//!   it. Never takes the mutation lock.
//! - **Write path** (`subscribe*`, unsubscribe): under the mutation lock, clone
//!   the current table, modify the clone, and store it as the new current
//!   table.
//!
//! A notify therefore sees a table from strictly before or strictly after any
//! concurrent mutation, never a partially applied one.

use crate::collection::{CallableCollection, CallableId};
use crate::config::SubjectConfig;
use crate::error::SubjectError;
use crate::metrics::{MetricsSnapshot, SubjectMetrics};
use crate::signature::{ArgumentList, Observer, Signature};
use crate::subscription::{ScopedSubscription, Subscription};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Values usable as routing tags.
///
/// `Default::default()` is the tag used by the untagged `subscribe` and
/// `notify`.
pub trait Tag: Eq + Hash + Clone + Default + fmt::Debug + Send + Sync + 'static {}

impl<T> Tag for T where T: Eq + Hash + Clone + Default + fmt::Debug + Send + Sync + 'static {}

type SubscriberTable<T> = HashMap<T, CallableCollection>;

/// State shared between a subject and its outstanding subscriptions.
struct Shared<T: Tag> {
    table: ArcSwap<SubscriberTable<T>>,
    lock: Mutex<()>,
    metrics: SubjectMetrics,
    label: String,
}

impl<T: Tag> Shared<T> {
    fn insert<Args, F>(&self, tag: T, observer: F) -> CallableId
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        let (id, _retired) = {
            let _guard = self.lock.lock();

            let mut next: SubscriberTable<T> = (**self.table.load()).clone();
            let id = next.entry(tag).or_default().insert::<Args, F>(observer);
            (id, self.publish(next))
        };

        id
    }

    fn remove(&self, tag: &T, id: CallableId) {
        // Observers may own guards on this subject, so the retired table is
        // dropped only after the mutation lock is released.
        let retired = {
            let _guard = self.lock.lock();

            let current = self.table.load_full();
            if !current.get(tag).is_some_and(|c| c.contains(id)) {
                debug!(subject = %self.label, tag = ?tag, id = %id, "Observer already removed");
                return;
            }

            let mut next: SubscriberTable<T> = (*current).clone();
            if let Some(collection) = next.get_mut(tag) {
                collection.remove(id);
                if collection.is_empty() {
                    next.remove(tag);
                }
            }
            self.publish(next)
        };

        self.metrics.record_unsubscription();
        debug!(subject = %self.label, tag = ?tag, id = %id, "Observer unsubscribed");
        drop(retired);
    }

    /// Store `table` as current and hand back the table it replaced.
    fn publish(&self, table: SubscriberTable<T>) -> Arc<SubscriberTable<T>> {
        let retired = self.table.swap(Arc::new(table));
        self.metrics.record_snapshot();
        retired
    }
}

/// Registry of observers notified with heterogeneous argument lists.
///
/// Observers are grouped by tag, then by argument signature. A notification
/// reaches every observer registered under an equal tag whose signature
/// matches the notification's arguments, in subscription order.
///
/// All methods may be called concurrently from any thread. Dispatch is
/// synchronous on the calling thread, and a panicking observer unwinds
/// straight through `notify`.
///
/// # Example
///
/// ```
/// use shared_subject::Subject;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let subject: Subject = Subject::new();
/// let captured = Arc::new(AtomicI32::new(0));
///
/// let sink = Arc::clone(&captured);
/// let _sub = subject.subscribe(move |x: &i32| sink.store(*x, Ordering::SeqCst));
///
/// subject.notify((42,));
/// assert_eq!(captured.load(Ordering::SeqCst), 42);
/// ```
pub struct Subject<T: Tag = String> {
    shared: Arc<Shared<T>>,
}

impl<T: Tag> Subject<T> {
    /// Create an empty subject with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SubjectConfig::default())
    }

    /// Create an empty subject from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SubjectConfig::validate`].
    pub fn with_config(config: SubjectConfig) -> Result<Self, SubjectError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SubjectConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: ArcSwap::from_pointee(SubscriberTable::new()),
                lock: Mutex::new(()),
                metrics: SubjectMetrics::new(config.metrics_enabled),
                label: config.label,
            }),
        }
    }

    /// Subscribe to untagged notifications.
    pub fn subscribe<Args, F>(&self, observer: F) -> Subscription
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        self.subscribe_tagged(T::default(), observer)
    }

    /// Subscribe to notifications carrying `tag`.
    ///
    /// The returned token removes exactly this observer. No notification is
    /// triggered by subscribing.
    pub fn subscribe_tagged<Args, F>(&self, tag: impl Into<T>, observer: F) -> Subscription
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        let tag = tag.into();
        let signature = Signature::of::<Args>();
        let id = self.shared.insert::<Args, F>(tag.clone(), observer);
        self.shared.metrics.record_subscription();

        debug!(
            subject = %self.shared.label,
            tag = ?tag,
            signature = %signature,
            id = %id,
            "Observer subscribed"
        );

        let owner: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let liveness: Weak<dyn Any + Send + Sync> = owner.clone();

        Subscription::new(id, liveness, move || match owner.upgrade() {
            Some(shared) => shared.remove(&tag, id),
            None => debug!(tag = ?tag, id = %id, "Subject dropped, unsubscribe skipped"),
        })
    }

    /// Subscribe to untagged notifications for the current scope.
    pub fn subscribe_scoped<Args, F>(&self, observer: F) -> ScopedSubscription
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        self.subscribe(observer).scoped()
    }

    /// Subscribe to notifications carrying `tag` for the current scope.
    pub fn subscribe_tagged_scoped<Args, F>(
        &self,
        tag: impl Into<T>,
        observer: F,
    ) -> ScopedSubscription
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        self.subscribe_tagged(tag, observer).scoped()
    }

    /// Notify untagged observers of `Args`.
    pub fn notify<Args: ArgumentList>(&self, args: Args) {
        self.notify_tagged(&T::default(), args);
    }

    /// Notify observers of `Args` registered under `tag`.
    ///
    /// An unknown tag, or a tag with no observers of this signature, is a
    /// no-op.
    pub fn notify_tagged<Q, Args>(&self, tag: &Q, args: Args)
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        Args: ArgumentList,
    {
        self.notify_tagged_ref(tag, &args);
    }

    /// Notify untagged observers with borrowed arguments.
    pub fn notify_ref<Args: ArgumentList>(&self, args: &Args) {
        self.notify_tagged_ref(&T::default(), args);
    }

    /// Notify observers under `tag` without taking ownership of the
    /// arguments, so one tuple can be broadcast repeatedly.
    pub fn notify_tagged_ref<Q, Args>(&self, tag: &Q, args: &Args)
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        Args: ArgumentList,
    {
        self.shared.metrics.record_notification();

        let table = self.shared.table.load_full();
        let Some(collection) = table.get(tag) else {
            trace!(subject = %self.shared.label, tag = ?tag, "No subscribers for tag");
            return;
        };

        let delivered = collection.call_all(args);
        self.shared.metrics.record_deliveries(delivered);

        let signature = Signature::of::<Args>();
        trace!(
            subject = %self.shared.label,
            tag = ?tag,
            signature = %signature,
            delivered,
            "Notification dispatched"
        );
    }

    /// Number of observers (of any signature) registered under `tag`.
    #[must_use]
    pub fn subscriber_count<Q>(&self, tag: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared
            .table
            .load()
            .get(tag)
            .map_or(0, CallableCollection::len)
    }

    /// Number of observers across all tags.
    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.shared
            .table
            .load()
            .values()
            .map(CallableCollection::len)
            .sum()
    }

    /// Number of tags with at least one observer.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.shared.table.load().len()
    }

    /// Whether no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.table.load().is_empty()
    }

    /// Label from the configuration.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Dispatch counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl<T: Tag> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tag> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("label", &self.shared.label)
            .field("table", &**self.shared.table.load())
            .finish()
    }
}
