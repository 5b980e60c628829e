//! In-memory rate-limiting work queue.
//!
//! Key bookkeeping:
//! - `dirty`: keys that need processing (queued, or re-added while processing);
//! - `processing`: keys handed out by `get` and not yet `done`;
//! - `queue`: FIFO of keys ready to be handed out, each at most once;
//! - `waiting`: delayed adds, ordered by ready time, earliest time per key wins.
use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::Notify,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

use shardq_core::{Queue, WorkKey};

use crate::limiter::{RateLimiter, default_controller_limiter};

struct Delayed<K> {
    ready: Instant,
    seq: u64,
    key: K,
}

impl<K> PartialEq for Delayed<K> {
    fn eq(&self, other: &Self) -> bool {
        self.ready == other.ready && self.seq == other.seq
    }
}

impl<K> Eq for Delayed<K> {}

impl<K> PartialOrd for Delayed<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Delayed<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.ready, self.seq).cmp(&(other.ready, other.seq))
    }
}

struct State<K> {
    queue: VecDeque<K>,
    dirty: HashSet<K>,
    processing: HashSet<K>,
    waiting: BinaryHeap<Reverse<Delayed<K>>>,
    ready_at: HashMap<K, Instant>,
    seq: u64,
    shutting_down: bool,
}

impl<K: WorkKey> State<K> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            dirty: HashSet::new(),
            processing: HashSet::new(),
            waiting: BinaryHeap::new(),
            ready_at: HashMap::new(),
            seq: 0,
            shutting_down: false,
        }
    }

    /// Returns `true` when the key became poppable.
    fn insert(&mut self, key: K) -> bool {
        if self.shutting_down || !self.dirty.insert(key.clone()) {
            return false;
        }
        if self.processing.contains(&key) {
            return false;
        }
        self.queue.push_back(key);
        true
    }

    /// Returns `true` when the earliest deadline moved.
    fn schedule(&mut self, key: K, ready: Instant) -> bool {
        if let Some(at) = self.ready_at.get(&key) {
            if *at <= ready {
                return false;
            }
        }
        let earlier = self.next_deadline().is_none_or(|next| ready < next);

        self.seq += 1;
        self.ready_at.insert(key.clone(), ready);
        self.waiting.push(Reverse(Delayed {
            ready,
            seq: self.seq,
            key,
        }));
        earlier
    }

    /// Move every due delayed key into the ready queue.
    fn promote(&mut self, now: Instant) {
        while let Some(Reverse(head)) = self.waiting.peek() {
            if head.ready > now {
                break;
            }
            let Some(Reverse(entry)) = self.waiting.pop() else {
                break;
            };
            // Superseded by an earlier schedule of the same key.
            if self.ready_at.get(&entry.key) != Some(&entry.ready) {
                continue;
            }
            self.ready_at.remove(&entry.key);
            self.insert(entry.key);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.waiting.peek().map(|Reverse(d)| d.ready)
    }
}

/// Stand-in for delays `Instant` cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Deduplicating FIFO with delayed and rate-limited adds.
///
/// A key is handed to at most one `get` caller until it is `done`; adding it in
/// the meantime marks it dirty and it is queued again on `done`.
pub struct WorkQueue<K: WorkKey> {
    name: Arc<str>,
    state: Mutex<State<K>>,
    notify: Notify,
    limiter: Box<dyn RateLimiter<K>>,
}

impl<K: WorkKey> WorkQueue<K> {
    /// Queue paced by [`default_controller_limiter`].
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_rate_limiter(name, default_controller_limiter())
    }

    pub fn with_rate_limiter(name: impl Into<Arc<str>>, limiter: impl RateLimiter<K> + 'static) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::new()),
            notify: Notify::new(),
            limiter: Box::new(limiter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys scheduled for later, excluding superseded entries.
    pub fn delayed_len(&self) -> usize {
        self.state().ready_at.len()
    }

    fn state(&self) -> MutexGuard<'_, State<K>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<K: WorkKey> Queue<K> for WorkQueue<K> {
    fn add(&self, key: K) {
        if self.state().insert(key) {
            self.notify.notify_one();
        }
    }

    fn add_after(&self, key: K, delay: Duration) {
        if delay.is_zero() {
            return self.add(key);
        }
        let mut state = self.state();
        if state.shutting_down {
            return;
        }
        trace!(queue = %self.name, key = %key, ?delay, "delayed add");
        let moved = state.schedule(key, deadline_after(delay));
        drop(state);
        if moved {
            // A getter may be sleeping towards a later deadline.
            self.notify.notify_one();
        }
    }

    fn add_rate_limited(&self, key: K) {
        let delay = self.limiter.when(&key);
        self.add_after(key, delay);
    }

    fn forget(&self, key: &K) {
        self.limiter.forget(key);
    }

    fn num_requeues(&self, key: &K) -> u32 {
        self.limiter.num_requeues(key)
    }

    async fn get(&self) -> Option<K> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let deadline = {
                let mut state = self.state();
                state.promote(Instant::now());

                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    if !state.queue.is_empty() {
                        self.notify.notify_one();
                    }
                    return Some(key);
                }
                if state.shutting_down {
                    return None;
                }
                state.next_deadline()
            };

            match deadline {
                Some(at) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = sleep_until(at) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    fn done(&self, key: &K) {
        let mut state = self.state();
        state.processing.remove(key);
        if state.dirty.contains(key) {
            state.queue.push_back(key.clone());
            drop(state);
            self.notify.notify_one();
        }
    }

    fn shut_down(&self) {
        let mut state = self.state();
        state.shutting_down = true;
        state.waiting.clear();
        state.ready_at.clear();
        drop(state);

        debug!(queue = %self.name, "work queue shutting down");
        self.notify.notify_waiters();
    }

    fn is_shutting_down(&self) -> bool {
        self.state().shutting_down
    }

    fn len(&self) -> usize {
        self.state().queue.len()
    }
}
