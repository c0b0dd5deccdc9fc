//! Shared job queue drained by the worker pool

use crate::crawler::lock;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Debug)]
struct QueueState<T> {
    jobs: VecDeque<T>,
    in_flight: usize,
    closed: bool,
}

/// FIFO job queue that knows when the run is finished
///
/// A job taken with [`ConversionQueue::next`] counts as in flight until the
/// worker calls [`ConversionQueue::finish`]. Jobs may push further jobs while
/// in flight; the queue is drained once it is empty and nothing is in flight.
#[derive(Debug)]
pub struct ConversionQueue<T> {
    state: Mutex<QueueState<T>>,
    notify: Notify,
}

impl<T> ConversionQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Appends a job; jobs pushed after [`ConversionQueue::close`] are dropped
    pub fn push(&self, job: T) {
        {
            let mut state = lock(&self.state);
            if state.closed {
                return;
            }
            state.jobs.push_back(job);
        }
        self.notify.notify_one();
    }

    /// Waits for the next job
    ///
    /// Returns `None` once the queue is drained or closed.
    pub async fn next(&self) -> Option<T> {
        loop {
            // Registered before the state check so no wakeup is lost
            let notified = self.notify.notified();

            {
                let mut state = lock(&self.state);
                if state.closed {
                    return None;
                }
                if let Some(job) = state.jobs.pop_front() {
                    state.in_flight += 1;
                    return Some(job);
                }
                if state.in_flight == 0 {
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks one job taken with `next` as done
    pub fn finish(&self) {
        let drained = {
            let mut state = lock(&self.state);
            state.in_flight = state.in_flight.saturating_sub(1);
            state.jobs.is_empty() && state.in_flight == 0
        };

        if drained {
            self.notify.notify_waiters();
        }
    }

    /// Stops the queue: pending jobs are discarded and waiting workers return
    pub fn close(&self) {
        {
            let mut state = lock(&self.state);
            state.closed = true;
            state.jobs.clear();
        }
        self.notify.notify_waiters();
    }

    /// Number of jobs waiting to be taken
    pub fn len(&self) -> usize {
        lock(&self.state).jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.state).in_flight
    }
}

impl<T> Default for ConversionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = ConversionQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.next().await, Some(1));
        queue.finish();
        assert_eq!(queue.next().await, Some(2));
        queue.finish();
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_empty_queue_is_drained() {
        let queue: ConversionQueue<u32> = ConversionQueue::new();
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_waiter_gets_job_pushed_by_in_flight_job() {
        let queue = ConversionQueue::new();
        queue.push("first");

        assert_eq!(queue.next().await, Some("first"));
        assert_eq!(queue.in_flight(), 1);

        let waiter = queue.next();
        let producer = async {
            tokio::task::yield_now().await;
            queue.push("second");
            queue.finish();
        };

        let (got, ()) = tokio::join!(waiter, producer);
        assert_eq!(got, Some("second"));

        queue.finish();
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_waiters_released_when_last_job_finishes() {
        let queue = ConversionQueue::new();
        queue.push(7);
        assert_eq!(queue.next().await, Some(7));

        let first = queue.next();
        let second = queue.next();
        let finisher = async {
            tokio::task::yield_now().await;
            queue.finish();
        };

        let (a, b, ()) = tokio::join!(first, second, finisher);
        assert_eq!((a, b), (None, None));
    }

    #[tokio::test]
    async fn test_close() {
        let queue = ConversionQueue::new();
        queue.push(1);
        queue.push(2);
        queue.close();

        assert_eq!(queue.next().await, None);
        queue.push(3);
        assert!(queue.is_empty());
    }
}
