//! # Callable Collection
//!
//! Heterogeneous store of observers, bucketed by normalized signature.
//!
//! Each bucket keeps its observers in insertion order. Identifiers come from a
//! single counter per collection, so they are unique across all buckets and
//! never reused while the collection exists.

use crate::signature::{ArgumentList, Observer, Signature};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of one stored observer, unique within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(u64);

impl CallableId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased view of one signature bucket.
trait Bucket: Send + Sync {
    fn remove(&mut self, id: CallableId) -> bool;
    fn contains(&self, id: CallableId) -> bool;
    fn len(&self) -> usize;
    fn clone_bucket(&self) -> Box<dyn Bucket>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedBucket<Args: ArgumentList> {
    entries: Vec<(CallableId, Arc<dyn Observer<Args>>)>,
}

impl<Args: ArgumentList> TypedBucket<Args> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<Args: ArgumentList> Bucket for TypedBucket<Args> {
    fn remove(&mut self, id: CallableId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: CallableId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clone_bucket(&self) -> Box<dyn Bucket> {
        Box::new(Self {
            entries: self.entries.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Observers of any number of signatures, keyed by `(Signature, CallableId)`.
///
/// Cloning duplicates the bucket mapping and shares the observers themselves,
/// so a clone can be mutated without affecting the original.
#[derive(Default)]
pub struct CallableCollection {
    buckets: HashMap<Signature, Box<dyn Bucket>>,
    next_id: u64,
}

impl CallableCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `observer` in the bucket for `Args` and return its identifier.
    pub fn insert<Args, F>(&mut self, observer: F) -> CallableId
    where
        Args: ArgumentList,
        F: Observer<Args>,
    {
        let id = CallableId(self.next_id);
        self.next_id += 1;

        let bucket = self
            .buckets
            .entry(Signature::of::<Args>())
            .or_insert_with(|| Box::new(TypedBucket::<Args>::new()));

        // Buckets are keyed by the TypeId of `Args`, so the downcast cannot miss.
        let observer: Arc<dyn Observer<Args>> = Arc::new(observer);
        let stored = match bucket.as_any_mut().downcast_mut::<TypedBucket<Args>>() {
            Some(typed) => {
                typed.entries.push((id, observer));
                true
            }
            None => false,
        };
        debug_assert!(stored, "bucket for {} holds another type", Signature::of::<Args>());

        id
    }

    /// Remove the observer stored under `id`, whatever its signature.
    ///
    /// Returns `false` (and does nothing) if `id` is unknown or was already
    /// removed. A bucket left empty is dropped.
    pub fn remove(&mut self, id: CallableId) -> bool {
        let Some(signature) = self
            .buckets
            .iter_mut()
            .find_map(|(signature, bucket)| bucket.remove(id).then_some(*signature))
        else {
            return false;
        };

        if self.buckets.get(&signature).is_some_and(|b| b.len() == 0) {
            self.buckets.remove(&signature);
        }
        true
    }

    /// Invoke every observer of `Args` with `args`, in insertion order.
    ///
    /// Observers of other signatures are not touched. Returns the number of
    /// observers invoked.
    pub fn call_all<Args: ArgumentList>(&self, args: &Args) -> usize {
        let Some(typed) = self
            .buckets
            .get(&Signature::of::<Args>())
            .and_then(|bucket| bucket.as_any().downcast_ref::<TypedBucket<Args>>())
        else {
            return 0;
        };

        for (_, observer) in &typed.entries {
            observer.on_notify(args);
        }
        typed.entries.len()
    }

    /// Whether an observer with `id` is stored.
    #[must_use]
    pub fn contains(&self, id: CallableId) -> bool {
        self.buckets.values().any(|bucket| bucket.contains(id))
    }

    /// Number of observers stored for `Args`.
    #[must_use]
    pub fn len_of<Args: ArgumentList>(&self) -> usize {
        self.buckets
            .get(&Signature::of::<Args>())
            .map_or(0, |bucket| bucket.len())
    }

    /// Total number of observers across all signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.len()).sum()
    }

    /// Whether no observers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Signatures that currently have at least one observer.
    pub fn signatures(&self) -> impl Iterator<Item = Signature> + '_ {
        self.buckets.keys().copied()
    }
}

impl Clone for CallableCollection {
    fn clone(&self) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .map(|(signature, bucket)| (*signature, bucket.clone_bucket()))
                .collect(),
            next_id: self.next_id,
        }
    }
}

impl fmt::Debug for CallableCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (signature, bucket) in &self.buckets {
            map.entry(&signature.name(), &bucket.len());
        }
        map.finish()
    }
}
