//! # Shared Subject - Typed In-Process Notification
//!
//! A [`Subject`] stores observer callbacks of arbitrary argument signatures and
//! later invokes every matching observer with a heterogeneous argument list,
//! optionally partitioned by a tag value.
//!
//! ## Routing
//!
//! ```text
//!                          ┌────────────────────────────────────┐
//!   subscribe(tag, f) ───► │ Subject                            │
//!                          │                                    │
//!                          │  tag "A" ─► (i32,)    : [f1, f2]   │
//!                          │          └► (String,) : [f3]       │
//!   notify("A", (7,)) ───► │  tag "B" ─► ()        : [f4]       │
//!                          │                                    │
//!                          └───────────────┬────────────────────┘
//!                                          │ f1(&7), f2(&7)
//!                                          ▼
//! ```
//!
//! ## Concurrency
//!
//! - **Copy-on-write:** subscribe and unsubscribe clone the subscriber table
//!   under a mutex and publish the clone atomically
//! - **Lock-free notify:** notify loads whatever table is current; it never
//!   waits on, or blocks, concurrent subscription changes
//! - **Weak tokens:** a [`Subscription`] never keeps its subject alive, and
//!   unsubscribing after the subject is gone is a no-op
//!
//! ## Example
//!
//! ```
//! use shared_subject::Subject;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let subject: Subject = Subject::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let sink = Arc::clone(&hits);
//! let mut sub = subject.subscribe_tagged("A", move |x: &usize, _: &String| {
//!     sink.fetch_add(*x, Ordering::SeqCst);
//! });
//!
//! subject.notify_tagged("B", (1usize, "ignored".to_string()));
//! subject.notify_tagged("A", (2usize, "delivered".to_string()));
//! assert_eq!(hits.load(Ordering::SeqCst), 2);
//!
//! sub.unsubscribe();
//! subject.notify_tagged("A", (2usize, "dropped".to_string()));
//! assert_eq!(hits.load(Ordering::SeqCst), 2);
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod collection;
pub mod config;
pub mod error;
pub mod metrics;
pub mod signature;
pub mod subject;
pub mod subscription;

// Re-export main types
pub use collection::{CallableCollection, CallableId};
pub use config::SubjectConfig;
pub use error::SubjectError;
pub use metrics::{MetricsSnapshot, SubjectMetrics};
pub use signature::{ArgumentList, Observer, Signature};
pub use subject::{Subject, Tag};
pub use subscription::{ScopedSubscription, Subscription};

/// Label used when none is configured.
pub const DEFAULT_LABEL: &str = "subject";

/// Maximum subject label length in bytes.
pub const MAX_LABEL_LEN: usize = 64;
