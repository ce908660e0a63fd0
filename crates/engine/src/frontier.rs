use std::collections::{HashSet, VecDeque};

use tokio::sync::{Mutex, Notify};

use sitecrawl_core::CrawlTask;

struct FrontierState {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    active_workers: usize,
    enqueued_count: usize,
}

/// The shared per-run frontier (§3, §5): an ordered queue of `(url, depth)`
/// pairs, the set of every URL ever admitted this run, and the count of
/// workers currently processing a URL. All three live behind one lock, as
/// required by the concurrency model — the visited set and the
/// active-worker count are mutated under the same lock as the queue push so
/// no worker can observe "empty queue, zero active" inconsistently.
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                visited: HashSet::new(),
                active_workers: 0,
                enqueued_count: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Admits `task` if its URL hasn't been seen this run and the enqueued
    /// count is still under `max_count` (the admission predicate's count
    /// cap, §4.1(e) — the only part of admission the frontier itself
    /// enforces; the rest is checked by the caller before this is called).
    /// Returns whether the task was actually enqueued.
    pub async fn enqueue(&self, task: CrawlTask, max_count: Option<usize>) -> bool {
        let mut state = self.state.lock().await;

        if let Some(cap) = max_count {
            if state.enqueued_count >= cap {
                return false;
            }
        }
        if !state.visited.insert(task.url.clone()) {
            return false;
        }

        state.enqueued_count += 1;
        state.queue.push_back(task);
        drop(state);
        self.notify.notify_waiters();
        true
    }

    /// Per-worker dequeue loop step (§4.7 step 1): dequeues one task, or
    /// waits for one to appear, or returns `None` once the frontier is
    /// quiescent (queue empty and no worker active) — the signal for every
    /// worker to exit.
    pub async fn dequeue_or_wait(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;
                if let Some(task) = state.queue.pop_front() {
                    state.active_workers += 1;
                    return Some(task);
                }
                if state.active_workers == 0 {
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// §4.7 step 3: reacquire the lock, decrement active workers, signal
    /// every waiter so they can re-check the quiescence condition.
    pub async fn finish(&self) {
        let mut state = self.state.lock().await;
        state.active_workers -= 1;
        drop(state);
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(url: &str) -> CrawlTask {
        CrawlTask {
            url: url.to_string(),
            depth: 0,
        }
    }

    #[tokio::test]
    async fn duplicate_url_is_not_enqueued_twice() {
        let frontier = Frontier::new();
        assert!(frontier.enqueue(task("https://a.gov/x"), None).await);
        assert!(!frontier.enqueue(task("https://a.gov/x"), None).await);
    }

    #[tokio::test]
    async fn max_count_cap_rejects_once_reached() {
        let frontier = Frontier::new();
        assert!(frontier.enqueue(task("https://a.gov/1"), Some(1)).await);
        assert!(!frontier.enqueue(task("https://a.gov/2"), Some(1)).await);
    }

    #[tokio::test]
    async fn single_worker_drains_then_exits() {
        let frontier = Frontier::new();
        frontier.enqueue(task("https://a.gov/1"), None).await;

        let t = frontier.dequeue_or_wait().await.unwrap();
        assert_eq!(t.url, "https://a.gov/1");
        frontier.finish().await;

        assert!(frontier.dequeue_or_wait().await.is_none());
    }

    #[tokio::test]
    async fn waiting_worker_wakes_on_late_enqueue() {
        let frontier = std::sync::Arc::new(Frontier::new());
        // one worker "active" so the other doesn't see quiescence immediately
        frontier.enqueue(task("https://a.gov/seed"), None).await;
        let seed = frontier.dequeue_or_wait().await.unwrap();
        assert_eq!(seed.url, "https://a.gov/seed");

        let waiter_frontier = frontier.clone();
        let waiter = tokio::spawn(async move { waiter_frontier.dequeue_or_wait().await });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        frontier.enqueue(task("https://a.gov/discovered"), None).await;
        frontier.finish().await;

        let got = waiter.await.unwrap();
        assert_eq!(got.unwrap().url, "https://a.gov/discovered");
    }
}
