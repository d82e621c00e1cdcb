//! # Pending Pool Flows
//!
//! Exactly-once resolution between responses and the timeout sweep:
//!
//! ```text
//! add_requests ──→ [pending] ──try_finish_requests──→ response path
//!                      │
//!                      └──── deadline passed ──→ timeout callback
//! ```
//!
//! Each id leaves the pool through exactly one of the two paths.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use shared_types::RequestId;
    use vl_02_pending_pool::{ClientId, PendingRequestPool, PoolConfig, PoolError, TimeoutCallback};

    const CLIENT: Option<ClientId> = Some(ClientId(1));

    type Reports = Arc<Mutex<Vec<HashSet<RequestId>>>>;

    fn recorder() -> (Reports, TimeoutCallback) {
        let reports: Reports = Arc::default();
        let sink = Arc::clone(&reports);
        let callback: TimeoutCallback = Arc::new(move |ids: &HashSet<RequestId>| {
            sink.lock().push(ids.clone());
        });
        (reports, callback)
    }

    fn ids(values: &[RequestId]) -> HashSet<RequestId> {
        values.iter().copied().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_wins_exactly_once() {
        let pool = PendingRequestPool::with_timeout(Duration::from_secs(1)).unwrap();
        let (reports, callback) = recorder();
        pool.add_requests(CLIENT, [7], callback).unwrap();

        assert_eq!(pool.try_finish_requests(CLIENT, &[7]), ids(&[7]));
        assert_eq!(pool.try_finish_requests(CLIENT, &[7]), HashSet::new());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(reports.lock().is_empty());
        assert!(pool.stats().is_balanced());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_after_deadline_only() {
        let pool = PendingRequestPool::with_timeout(Duration::from_millis(100)).unwrap();
        let (reports, callback) = recorder();
        pool.add_requests(CLIENT, [42], callback).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(reports.lock().is_empty());
        assert_eq!(pool.count_pending_requests(CLIENT), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*reports.lock(), vec![ids(&[42])]);
        assert_eq!(pool.count_pending_requests(CLIENT), 0);

        // The response lost the race.
        assert!(pool.try_finish_requests(CLIENT, &[42]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_batch_reported_together() {
        let pool = PendingRequestPool::new(
            PoolConfig::new(Duration::from_millis(100)).with_sweep_interval(Duration::from_millis(10)),
        )
        .unwrap();
        let (reports, callback) = recorder();
        pool.add_requests(CLIENT, [1, 2, 3], Arc::clone(&callback))
            .unwrap();
        assert_eq!(pool.try_finish_requests(CLIENT, &[2]), ids(&[2]));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*reports.lock(), vec![ids(&[1, 3])]);

        let stats = pool.stats();
        assert_eq!(stats.registered, 3);
        assert_eq!(stats.finished, 1);
        assert_eq!(stats.timed_out, 2);
        assert!(stats.is_balanced());
    }

    #[tokio::test]
    async fn test_duplicate_batch_rejected_whole() {
        let pool = PendingRequestPool::with_timeout(Duration::from_secs(5)).unwrap();
        let (_, callback) = recorder();
        pool.add_requests(CLIENT, [1], Arc::clone(&callback)).unwrap();

        let err = pool
            .add_requests(CLIENT, [2, 1], Arc::clone(&callback))
            .unwrap_err();
        assert!(matches!(err, PoolError::DuplicateRequest { request_id: 1, .. }));
        assert_eq!(pool.count_pending_requests(CLIENT), 1);

        // Another group may reuse the id.
        pool.add_requests(Some(ClientId(2)), [1], callback).unwrap();
        assert_eq!(pool.total_pending_requests(), 2);
    }

    #[tokio::test]
    async fn test_drop_reports_everything_pending() {
        let (reports, callback) = recorder();
        {
            let pool = PendingRequestPool::with_timeout(Duration::from_secs(60)).unwrap();
            pool.add_requests(CLIENT, [1, 2, 3, 4, 5], callback).unwrap();
        }
        let reported: HashSet<RequestId> = reports.lock().iter().flatten().copied().collect();
        assert_eq!(reported, ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_pool_requires_runtime() {
        assert!(matches!(
            PendingRequestPool::with_timeout(Duration::from_secs(1)),
            Err(PoolError::NoRuntime)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_finish_and_sweep_resolve_once() {
        const REQUESTS: RequestId = 2_000;

        let pool = Arc::new(
            PendingRequestPool::new(
                PoolConfig::new(Duration::from_millis(5)).with_sweep_interval(Duration::from_millis(1)),
            )
            .unwrap(),
        );
        let timed_out = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&timed_out);
        let callback: TimeoutCallback = Arc::new(move |ids: &HashSet<RequestId>| {
            counter.fetch_add(ids.len(), Ordering::SeqCst);
        });

        pool.add_requests(CLIENT, 0..REQUESTS, callback).unwrap();

        let finished = Arc::new(AtomicUsize::new(0));
        let mut workers = Vec::new();
        for worker in 0..4 {
            let pool = Arc::clone(&pool);
            let finished = Arc::clone(&finished);
            workers.push(std::thread::spawn(move || {
                // Every worker races for every id; interleave the order.
                for id in (0..REQUESTS).filter(|id| id % 4 == worker).chain(0..REQUESTS) {
                    let won = pool.try_finish_requests(CLIENT, &[id]);
                    finished.fetch_add(won.len(), Ordering::SeqCst);
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let finished = finished.load(Ordering::SeqCst);
        let timed_out = timed_out.load(Ordering::SeqCst);
        assert_eq!(finished + timed_out, REQUESTS as usize);
        assert_eq!(pool.total_pending_requests(), 0);
        assert!(pool.stats().is_balanced());
    }
}
