//! PollBridge - bounded worker pool for blocking sources
//!
//! Runs a caller-supplied blocking job on background threads and publishes
//! the latest result to the scheduler without ever blocking it.
//!
//! Shared state is split into three independently locked pieces:
//! - result slot (payload + freshness flag), written by workers
//! - live-worker table, touched only by the owning thread
//! - join queue, where finished workers register for reclamation
//!
//! Requests beyond `max_workers` are dropped, never queued.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use metrics::counter;
use tracing::{debug, error, warn};

use crate::error::{Result, SourceError};

/// Default pool capacity
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Blocking operation run verbatim by each worker
pub type BlockingJob<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

type WorkerId = u64;

/// Poisoning only means a worker panicked mid-update; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared with worker threads
struct Shared<T> {
    slot: Mutex<T>,
    fresh: AtomicBool,
    finished: Mutex<Vec<WorkerId>>,
}

/// Bounded pool bridging a blocking job into the tick loop
pub struct PollBridge<T> {
    name: String,
    job: BlockingJob<T>,
    max_workers: usize,
    shared: Arc<Shared<T>>,
    workers: Mutex<HashMap<WorkerId, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl<T> fmt::Debug for PollBridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollBridge")
            .field("name", &self.name)
            .field("max_workers", &self.max_workers)
            .field("live", &self.live_workers())
            .field("fresh", &self.has_new_data())
            .finish()
    }
}

impl<T> PollBridge<T>
where
    T: Clone + Default + Send + 'static,
{
    /// Create a bridge running `job` on at most `max_workers` threads
    ///
    /// A `max_workers` of 0 is treated as 1.
    pub fn new<F>(name: impl Into<String>, max_workers: usize, job: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            job: Arc::new(job),
            max_workers: max_workers.max(1),
            shared: Arc::new(Shared {
                slot: Mutex::new(T::default()),
                fresh: AtomicBool::new(false),
                finished: Mutex::new(Vec::new()),
            }),
            workers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Ask for one more run of the job
    ///
    /// Reclaims finished workers first, then spawns exactly one worker if
    /// fewer than `max_workers` are live. Returns false when the request was
    /// dropped because the pool is full.
    pub fn request_poll(&self) -> bool {
        self.reclaim_finished();

        let mut workers = lock(&self.workers);
        if workers.len() >= self.max_workers {
            counter!("tickcast_bridge_dropped_requests_total", "bridge" => self.name.clone())
                .increment(1);
            debug!(
                bridge = %self.name,
                live = workers.len(),
                max = self.max_workers,
                "pool at capacity, poll request dropped"
            );
            return false;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Arc::clone(&self.job);
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();

        let spawned = thread::Builder::new()
            .name(format!("{}-poll-{}", self.name, id))
            .spawn(move || run_worker(id, &name, job, shared));

        match spawned {
            Ok(handle) => {
                // Inserted while holding the table lock, so reclaim never sees
                // a finished id before its handle.
                workers.insert(id, handle);
                counter!("tickcast_bridge_spawned_total", "bridge" => self.name.clone())
                    .increment(1);
                debug!(
                    bridge = %self.name,
                    worker = id,
                    live = workers.len(),
                    max = self.max_workers,
                    "poll worker launched"
                );
                true
            }
            Err(e) => {
                error!(bridge = %self.name, error = %e, "failed to spawn poll worker");
                false
            }
        }
    }

    /// Read the latest payload and clear the freshness flag
    ///
    /// Returns the previous payload again if no worker completed since the
    /// last read.
    pub fn get_latest(&self) -> T {
        let slot = lock(&self.shared.slot);
        self.shared.fresh.store(false, Ordering::Release);
        slot.clone()
    }

    /// Join every worker that registered as finished
    ///
    /// Returns the number of reclaimed workers.
    pub fn reclaim_finished(&self) -> usize {
        let mut workers = lock(&self.workers);
        let finished = std::mem::take(&mut *lock(&self.shared.finished));

        let mut reclaimed = 0;
        for id in finished {
            if let Some(handle) = workers.remove(&id) {
                if handle.join().is_err() {
                    warn!(bridge = %self.name, worker = id, "poll worker panicked");
                }
                reclaimed += 1;
            }
        }
        reclaimed
    }

    /// Wait for every live worker to finish
    ///
    /// In-flight jobs are not cancelled; this blocks until they complete.
    pub fn shutdown(&self) {
        let drained: Vec<(WorkerId, JoinHandle<()>)> = lock(&self.workers).drain().collect();
        if drained.is_empty() {
            return;
        }

        debug!(bridge = %self.name, workers = drained.len(), "joining poll workers");
        for (id, handle) in drained {
            if handle.join().is_err() {
                warn!(bridge = %self.name, worker = id, "poll worker panicked");
            }
        }
        lock(&self.shared.finished).clear();
    }
}

impl<T> PollBridge<T> {
    /// Bridge name (used for logging and thread names)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pool capacity
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Whether a worker completed since the last `get_latest`
    pub fn has_new_data(&self) -> bool {
        self.shared.fresh.load(Ordering::Acquire)
    }

    /// Workers spawned and not yet reclaimed
    pub fn live_workers(&self) -> usize {
        lock(&self.workers).len()
    }

    fn join_all(&self) {
        let drained: Vec<JoinHandle<()>> = lock(&self.workers).drain().map(|(_, h)| h).collect();
        for handle in drained {
            let _ = handle.join();
        }
    }
}

impl<T> Drop for PollBridge<T> {
    fn drop(&mut self) {
        self.join_all();
    }
}

/// Body of one worker thread: run the job once, publish, register for join
fn run_worker<T>(id: WorkerId, bridge: &str, job: BlockingJob<T>, shared: Arc<Shared<T>>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job())).unwrap_or_else(|_| {
        Err(SourceError::WorkerPanicked {
            bridge: bridge.to_string(),
        })
    });

    match outcome {
        Ok(payload) => {
            let mut slot = lock(&shared.slot);
            *slot = payload;
            shared.fresh.store(true, Ordering::Release);
        }
        Err(e) => {
            counter!("tickcast_bridge_failures_total", "bridge" => bridge.to_string())
                .increment(1);
            warn!(bridge = %bridge, worker = id, error = %e, "poll job failed");
        }
    }

    lock(&shared.finished).push(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Condvar;
    use std::time::{Duration, Instant};

    /// Blocks jobs until opened
    #[derive(Clone, Default)]
    struct Gate(Arc<(Mutex<bool>, Condvar)>);

    impl Gate {
        fn wait(&self) {
            let (open, cvar) = &*self.0;
            let mut guard = open.lock().unwrap();
            while !*guard {
                guard = cvar.wait(guard).unwrap();
            }
        }

        fn open(&self) {
            let (open, cvar) = &*self.0;
            *open.lock().unwrap() = true;
            cvar.notify_all();
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_request_beyond_capacity_is_dropped() {
        let gate = Gate::default();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let job_gate = gate.clone();
        let job_in_flight = Arc::clone(&in_flight);
        let bridge = PollBridge::new("bounded", 2, move || {
            job_in_flight.fetch_add(1, Ordering::SeqCst);
            job_gate.wait();
            job_in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        });

        assert!(bridge.request_poll());
        assert!(bridge.request_poll());
        assert!(!bridge.request_poll());
        assert_eq!(bridge.live_workers(), 2);

        wait_until(|| in_flight.load(Ordering::SeqCst) == 2);

        gate.open();
        wait_until(|| {
            bridge.reclaim_finished();
            bridge.live_workers() < 2
        });

        assert!(bridge.request_poll());
        bridge.shutdown();
        assert_eq!(bridge.live_workers(), 0);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_latest_wins_and_freshness_clears() {
        let runs = Arc::new(AtomicUsize::new(0));
        let job_runs = Arc::clone(&runs);
        let bridge = PollBridge::new("fresh", 1, move || {
            let n = job_runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("run-{n}"))
        });

        assert!(!bridge.has_new_data());
        assert_eq!(bridge.get_latest(), "");

        bridge.request_poll();
        wait_until(|| bridge.has_new_data());

        let first = bridge.get_latest();
        assert_eq!(first, "run-1");
        assert!(!bridge.has_new_data());
        assert_eq!(bridge.get_latest(), first);
        assert!(!bridge.has_new_data());
    }

    #[test]
    fn test_failed_job_leaves_flag_clear_and_pool_healthy() {
        let fail = Arc::new(AtomicBool::new(true));
        let job_fail = Arc::clone(&fail);
        let bridge = PollBridge::new("flaky", 1, move || {
            if job_fail.load(Ordering::SeqCst) {
                Err(SourceError::EmptyCommand)
            } else {
                Ok(42u32)
            }
        });

        assert!(bridge.request_poll());
        let mut reclaimed = 0;
        wait_until(|| {
            reclaimed += bridge.reclaim_finished();
            reclaimed == 1
        });
        assert!(!bridge.has_new_data());

        fail.store(false, Ordering::SeqCst);
        assert!(bridge.request_poll());
        wait_until(|| bridge.has_new_data());
        assert_eq!(bridge.get_latest(), 42);
    }

    #[test]
    fn test_panicking_job_is_reclaimed() {
        let bridge: PollBridge<String> = PollBridge::new("panicky", 1, || panic!("boom"));

        assert!(bridge.request_poll());
        let mut reclaimed = 0;
        wait_until(|| {
            reclaimed += bridge.reclaim_finished();
            reclaimed == 1
        });
        assert_eq!(bridge.live_workers(), 0);
        assert!(!bridge.has_new_data());
        assert!(bridge.request_poll());
    }

    #[test]
    fn test_shutdown_waits_for_in_flight_jobs() {
        let completed = Arc::new(AtomicUsize::new(0));
        let job_completed = Arc::clone(&completed);
        let bridge = PollBridge::new("slow", 3, move || {
            thread::sleep(Duration::from_millis(50));
            job_completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        for _ in 0..3 {
            assert!(bridge.request_poll());
        }
        bridge.shutdown();

        assert_eq!(completed.load(Ordering::SeqCst), 3);
        assert_eq!(bridge.live_workers(), 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bridge = PollBridge::new("tiny", 0, || Ok(1u8));
        assert_eq!(bridge.max_workers(), 1);
    }
}
