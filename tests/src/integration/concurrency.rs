//! # Concurrency Stress
//!
//! Concurrent subscribe / unsubscribe / notify from independent threads must
//! never crash, deadlock, or leave the subscriber table inconsistent.

/// Threads per role in the stress runs.
pub const STRESS_THREADS: usize = 4;

/// Operations per thread in the stress runs.
pub const STRESS_ITERATIONS: usize = 500;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_test_logging;
    use shared_subject::Subject;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_concurrent_subscribe_unsubscribe_notify() {
        init_test_logging();
        let subject: Subject = Subject::new();
        let deliveries = Arc::new(AtomicUsize::new(0));
        let done = AtomicBool::new(false);
        let barrier = Barrier::new(STRESS_THREADS * 2);

        thread::scope(|scope| {
            for writer in 0..STRESS_THREADS {
                let subject = &subject;
                let deliveries = &deliveries;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let tag = format!("tag-{}", writer % 2);
                    for _ in 0..STRESS_ITERATIONS {
                        let sink = Arc::clone(deliveries);
                        let mut sub = subject.subscribe_tagged(tag.clone(), move |_: &usize| {
                            sink.fetch_add(1, Ordering::Relaxed);
                        });
                        subject.notify_tagged(tag.as_str(), (writer,));
                        sub.unsubscribe();
                    }
                });
            }

            for reader in 0..STRESS_THREADS {
                let subject = &subject;
                let done = &done;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let tag = format!("tag-{}", reader % 2);
                    while !done.load(Ordering::Acquire) {
                        subject.notify_tagged(tag.as_str(), (reader,));
                        let _ = subject.subscriber_count(tag.as_str());
                    }
                });
            }

            // Readers stop once every writer has finished.
            while subject.metrics().subscriptions < (STRESS_THREADS * STRESS_ITERATIONS) as u64
                || !subject.is_empty()
            {
                thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        let metrics = subject.metrics();
        assert!(subject.is_empty());
        assert_eq!(subject.tag_count(), 0);
        assert_eq!(
            metrics.subscriptions,
            (STRESS_THREADS * STRESS_ITERATIONS) as u64
        );
        assert_eq!(metrics.unsubscriptions, metrics.subscriptions);
        assert_eq!(metrics.snapshots_published, metrics.subscriptions * 2);
        // Every writer notifies its own tag while its observer is registered.
        assert!(deliveries.load(Ordering::Relaxed) >= STRESS_THREADS * STRESS_ITERATIONS);
    }

    #[test]
    fn test_concurrent_subscribers_all_registered() {
        let subject: Subject<u32> = Subject::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let subscriptions = thread::scope(|scope| {
            let handles: Vec<_> = (0..STRESS_THREADS)
                .map(|_| {
                    let subject = &subject;
                    let hits = &hits;
                    scope.spawn(move || {
                        (0..STRESS_ITERATIONS)
                            .map(|_| {
                                let sink = Arc::clone(hits);
                                subject.subscribe(move || {
                                    sink.fetch_add(1, Ordering::Relaxed);
                                })
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap_or_default())
                .collect::<Vec<_>>()
        });

        assert_eq!(subscriptions.len(), STRESS_THREADS * STRESS_ITERATIONS);
        assert_eq!(subject.total_subscribers(), STRESS_THREADS * STRESS_ITERATIONS);

        subject.notify(());
        assert_eq!(
            hits.load(Ordering::Relaxed),
            STRESS_THREADS * STRESS_ITERATIONS
        );
    }

    #[test]
    fn test_in_flight_notify_keeps_its_snapshot() {
        let subject: Subject = Subject::new();
        let entered = Arc::new(Barrier::new(2));
        let resume = Arc::new(Barrier::new(2));
        let gated = Arc::new(AtomicBool::new(false));
        let hits = Arc::new(AtomicUsize::new(0));

        let gate_entered = Arc::clone(&entered);
        let gate_resume = Arc::clone(&resume);
        let gate_once = Arc::clone(&gated);
        let _gate = subject.subscribe_tagged("batch", move || {
            if !gate_once.swap(true, Ordering::SeqCst) {
                gate_entered.wait();
                gate_resume.wait();
            }
        });

        let mut peers: Vec<_> = (0..STRESS_THREADS * 4)
            .map(|_| {
                let sink = Arc::clone(&hits);
                subject.subscribe_tagged("batch", move || {
                    sink.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        thread::scope(|scope| {
            let subject_ref = &subject;
            let dispatch = scope.spawn(move || subject_ref.notify_tagged("batch", ()));

            // Dispatch is parked inside the gate observer; remove every peer.
            entered.wait();
            for peer in &mut peers {
                peer.unsubscribe();
            }
            assert_eq!(subject.subscriber_count("batch"), 1);
            resume.wait();

            assert!(dispatch.join().is_ok());
        });

        // The loaded table was taken before the removals and still held all peers.
        assert_eq!(hits.load(Ordering::SeqCst), STRESS_THREADS * 4);

        subject.notify_tagged("batch", ());
        assert_eq!(hits.load(Ordering::SeqCst), STRESS_THREADS * 4);
    }

    #[test]
    fn test_subject_dropped_while_tokens_in_other_threads() {
        let subject: Subject = Subject::new();
        let tokens: Vec<_> = (0..STRESS_THREADS)
            .map(|_| subject.subscribe(|_: &i32| {}))
            .collect();
        drop(subject);

        thread::scope(|scope| {
            for mut token in tokens {
                scope.spawn(move || {
                    token.unsubscribe();
                    assert!(!token.is_active());
                });
            }
        });
    }
}
