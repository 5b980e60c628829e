//! Manager driven end to end over a real [`WorkQueue`].
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use shardq_core::{
    Event, EventKind, Manager, Outcome, ProcessError, Processor, Queue, QueueRef, Subscribe,
};
use tokio::{sync::Notify, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::WorkQueue;

type Behaviour = dyn Fn(&str, usize) -> Result<Outcome, ProcessError> + Send + Sync;

fn always_stable(_key: &str, _nth: usize) -> Result<Outcome, ProcessError> {
    Ok(Outcome::Stable)
}

/// Processor that sleeps, records every call and detects overlapping calls per key.
struct Probe {
    queue: Arc<WorkQueue<String>>,
    work: Duration,
    behaviour: Box<Behaviour>,
    calls: Mutex<HashMap<String, usize>>,
    starts: Mutex<Vec<(String, Instant)>>,
    active: Mutex<HashSet<String>>,
    overlap: AtomicBool,
    started: AtomicUsize,
    finished: AtomicUsize,
    target: usize,
    reached: Notify,
}

impl Probe {
    fn new(work: Duration, target: usize) -> Self {
        Self {
            queue: Arc::new(WorkQueue::new("probe")),
            work,
            behaviour: Box::new(always_stable),
            calls: Mutex::new(HashMap::new()),
            starts: Mutex::new(Vec::new()),
            active: Mutex::new(HashSet::new()),
            overlap: AtomicBool::new(false),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            target,
            reached: Notify::new(),
        }
    }

    fn behaving(
        mut self,
        f: impl Fn(&str, usize) -> Result<Outcome, ProcessError> + Send + Sync + 'static,
    ) -> Self {
        self.behaviour = Box::new(f);
        self
    }

    fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn starts_of(&self, key: &str) -> Vec<Instant> {
        self.starts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl Processor for Probe {
    type Key = String;

    fn queue(&self) -> QueueRef<String> {
        self.queue.clone()
    }

    async fn process(&self, _ctx: &CancellationToken, key: &String) -> Result<Outcome, ProcessError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if !self.active.lock().unwrap().insert(key.clone()) {
            self.overlap.store(true, Ordering::SeqCst);
        }
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(key.clone()).or_default();
            *n += 1;
            *n
        };
        self.starts.lock().unwrap().push((key.clone(), Instant::now()));

        tokio::time::sleep(self.work).await;

        self.active.lock().unwrap().remove(key);
        if self.finished.fetch_add(1, Ordering::SeqCst) + 1 == self.target {
            self.reached.notify_one();
        }
        (self.behaviour)(key, nth)
    }

    fn name(&self) -> &str {
        "probe"
    }
}

#[derive(Default)]
struct Counter(Mutex<HashMap<EventKind, usize>>);

impl Counter {
    fn get(&self, kind: EventKind) -> usize {
        self.0.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }
}

impl Subscribe for Counter {
    fn on_event(&self, event: &Event) {
        *self.0.lock().unwrap().entry(event.kind).or_default() += 1;
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

fn start(
    probe: &Arc<Probe>,
    workers: usize,
    counter: &Arc<Counter>,
) -> (CancellationToken, tokio::task::JoinHandle<()>) {
    start_with_jitter(probe, workers, counter, Duration::ZERO)
}

fn start_with_jitter(
    probe: &Arc<Probe>,
    workers: usize,
    counter: &Arc<Counter>,
    jitter: Duration,
) -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let manager = Manager::builder(probe.clone())
        .with_workers(workers)
        .with_dequeue_jitter(jitter)
        .with_subscriber(counter.clone())
        .build()
        .unwrap();
    let token = CancellationToken::new();
    let handle = tokio::spawn({
        let token = token.clone();
        async move { manager.start(token).await }
    });
    (token, handle)
}

#[tokio::test(start_paused = true)]
async fn thousand_keys_sixteen_workers() {
    let probe = Arc::new(Probe::new(Duration::from_millis(50), 1_000));
    for i in 0..1_000 {
        probe.queue.add(format!("ns/item-{i}"));
    }
    let counter = Arc::new(Counter::default());

    let begin = Instant::now();
    let (token, handle) = start(&probe, 16, &counter);
    probe.reached.notified().await;
    let elapsed = begin.elapsed();

    token.cancel();
    handle.await.unwrap();

    // 1000 / 16 rounds of 50ms each.
    assert!(elapsed >= Duration::from_millis(63 * 50), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(64 * 50), "{elapsed:?}");
    for i in 0..1_000 {
        assert_eq!(probe.calls(&format!("ns/item-{i}")), 1);
    }
    assert!(!probe.overlap.load(Ordering::SeqCst));
    assert_eq!(counter.get(EventKind::ProcessSucceeded), 1_000);
}

#[tokio::test(start_paused = true)]
async fn jitter_stretches_rounds_within_its_bound() {
    let probe = Arc::new(Probe::new(Duration::from_millis(50), 160));
    for i in 0..160 {
        probe.queue.add(format!("ns/item-{i}"));
    }
    let counter = Arc::new(Counter::default());

    let begin = Instant::now();
    let (token, handle) = start_with_jitter(&probe, 16, &counter, Duration::from_millis(20));
    probe.reached.notified().await;
    let elapsed = begin.elapsed();

    token.cancel();
    handle.await.unwrap();

    // 10 rounds of 50ms work, each followed by at most 20ms of jitter.
    assert!(elapsed >= Duration::from_millis(10 * 50), "{elapsed:?}");
    assert!(elapsed <= Duration::from_millis(10 * (50 + 20)), "{elapsed:?}");
    for i in 0..160 {
        assert_eq!(probe.calls(&format!("ns/item-{i}")), 1);
    }
    assert!(!probe.overlap.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_jitter_starts_nothing_new() {
    let probe = Arc::new(Probe::new(Duration::from_millis(50), 1));
    probe.queue.add("ns/a".to_string());
    probe.queue.add("ns/b".to_string());
    let counter = Arc::new(Counter::default());

    let (token, handle) = start_with_jitter(&probe, 1, &counter, Duration::from_secs(3_600));
    probe.reached.notified().await;
    // The worker is now pausing before its next pop.
    tokio::time::sleep(Duration::from_millis(1)).await;

    let cancelled_at = Instant::now();
    token.cancel();
    handle.await.unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(1), "{:?}", cancelled_at.elapsed());
    assert_eq!(probe.calls("ns/a"), 1);
    assert_eq!(probe.calls("ns/b"), 0);
    assert_eq!(probe.queue.len(), 1);
    assert_eq!(counter.get(EventKind::WorkerStopped), 1);
}

#[tokio::test(start_paused = true)]
async fn unbounded_requeue_delay_keeps_the_pool_alive() {
    let probe = Arc::new(Probe::new(Duration::from_millis(10), 2).behaving(|key, _| {
        if key == "forever" {
            Ok(Outcome::RequeueAfter(Duration::MAX))
        } else {
            Ok(Outcome::Stable)
        }
    }));
    probe.queue.add("forever".to_string());
    let counter = Arc::new(Counter::default());
    let (token, handle) = start(&probe, 2, &counter);

    tokio::time::sleep(Duration::from_millis(50)).await;
    probe.queue.add("other".to_string());
    probe.reached.notified().await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(!handle.is_finished(), "start ended before cancellation");
    assert_eq!(probe.calls("forever"), 1);
    assert_eq!(probe.calls("other"), 1);
    assert_eq!(probe.queue.delayed_len(), 1);
    assert_eq!(counter.get(EventKind::RequeueScheduled), 1);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn panicking_key_is_retried_and_others_unaffected() {
    let probe = Arc::new(
        Probe::new(Duration::from_millis(10), 6).behaving(|key, nth| {
            if key == "b" && nth == 1 {
                panic!("nil dereference in b");
            }
            Ok(Outcome::Stable)
        }),
    );
    for key in ["a", "b", "c", "d", "e"] {
        probe.queue.add(key.to_string());
    }
    let counter = Arc::new(Counter::default());

    let (token, handle) = start(&probe, 2, &counter);
    probe.reached.notified().await;
    token.cancel();
    handle.await.unwrap();

    assert_eq!(probe.calls("b"), 2);
    for key in ["a", "c", "d", "e"] {
        assert_eq!(probe.calls(key), 1, "{key}");
    }
    assert_eq!(counter.get(EventKind::ProcessPanicked), 1);
    assert_eq!(counter.get(EventKind::ProcessFailed), 1);
    assert_eq!(probe.queue.num_requeues(&"b".to_string()), 0, "success forgets the retry history");
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_burst_finishes_in_flight_only() {
    let probe = Arc::new(Probe::new(Duration::from_millis(50), usize::MAX));
    for i in 0..100 {
        probe.queue.add(format!("k{i}"));
    }
    let counter = Arc::new(Counter::default());

    let begin = Instant::now();
    let (token, handle) = start(&probe, 4, &counter);
    tokio::time::sleep(Duration::from_millis(75)).await;
    token.cancel();
    handle.await.unwrap();

    assert!(begin.elapsed() >= Duration::from_millis(100));
    assert_eq!(probe.started.load(Ordering::SeqCst), 8);
    assert_eq!(probe.finished.load(Ordering::SeqCst), 8);
    assert_eq!(probe.queue.len(), 92);
    assert_eq!(counter.get(EventKind::WorkerStopped), 4);
}

#[tokio::test(start_paused = true)]
async fn busy_producer_never_overlaps_a_key() {
    let probe = Arc::new(Probe::new(Duration::from_millis(7), usize::MAX).behaving(|_, nth| {
        match nth % 3 {
            0 => Err(ProcessError::fail("transient")),
            1 => Ok(Outcome::RequeueAfter(Duration::from_millis(3))),
            _ => Ok(Outcome::Stable),
        }
    }));
    let counter = Arc::new(Counter::default());
    let (token, handle) = start(&probe, 8, &counter);

    let keys = ["a", "b", "c", "d", "e"];
    for tick in 0..500usize {
        probe.queue.add(keys[tick % keys.len()].to_string());
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    token.cancel();
    handle.await.unwrap();

    assert!(probe.started.load(Ordering::SeqCst) > 50);
    assert!(!probe.overlap.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn duplicate_pop_is_redelivered_after_the_deferral() {
    let probe = Arc::new(Probe::new(Duration::from_secs(1), 2));
    let counter = Arc::new(Counter::default());
    let (token, handle) = start(&probe, 2, &counter);

    let begin = Instant::now();
    probe.queue.add("ns/a".to_string());
    tokio::time::sleep(Duration::from_millis(10)).await;
    // Re-added after the first pop was acknowledged: the second worker pops it
    // while the first call is still running.
    probe.queue.add("ns/a".to_string());

    probe.reached.notified().await;
    token.cancel();
    handle.await.unwrap();

    assert_eq!(counter.get(EventKind::KeyDeferred), 1);
    assert_eq!(probe.calls("ns/a"), 2);
    assert!(!probe.overlap.load(Ordering::SeqCst));

    let starts = probe.starts_of("ns/a");
    assert_eq!(starts.len(), 2);
    assert!(starts[1] - begin >= Duration::from_secs(5), "{:?}", starts[1] - begin);
}

#[tokio::test(start_paused = true)]
async fn stable_key_waits_for_an_external_add() {
    let probe = Arc::new(Probe::new(Duration::from_millis(5), usize::MAX));
    let counter = Arc::new(Counter::default());
    let (token, handle) = start(&probe, 4, &counter);

    probe.queue.add("ns/a".to_string());
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(probe.calls("ns/a"), 1);

    probe.queue.add("ns/a".to_string());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(probe.calls("ns/a"), 2);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn requeue_after_brings_the_key_back() {
    let probe = Arc::new(
        Probe::new(Duration::from_millis(1), 3)
            .behaving(|_, _| Ok(Outcome::RequeueAfter(Duration::from_secs(30)))),
    );
    let counter = Arc::new(Counter::default());
    let (token, handle) = start(&probe, 1, &counter);

    let begin = Instant::now();
    probe.queue.add("ns/a".to_string());
    probe.reached.notified().await;
    token.cancel();
    handle.await.unwrap();

    let starts = probe.starts_of("ns/a");
    assert!(starts[1] - starts[0] >= Duration::from_secs(30));
    assert!(begin.elapsed() >= Duration::from_secs(60));
    assert_eq!(counter.get(EventKind::RequeueScheduled), 3);
}

#[tokio::test(start_paused = true)]
async fn unrecovered_panic_ends_start() {
    let probe = Arc::new(Probe::new(Duration::ZERO, usize::MAX).behaving(|_, _| panic!("fatal")));
    probe.queue.add("ns/a".to_string());

    let manager = Manager::builder(probe.clone())
        .with_workers(3)
        .with_dequeue_jitter(Duration::ZERO)
        .with_recover_panic(false)
        .build()
        .unwrap();
    let err = tokio::spawn(async move { manager.start(CancellationToken::new()).await })
        .await
        .unwrap_err();

    assert!(err.is_panic());
    assert_eq!(probe.calls("ns/a"), 1);
}
