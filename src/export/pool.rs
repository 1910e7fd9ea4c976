//! Bounded, order-preserving worker pool
//!
//! Frames are encoded on a rayon pool but must reach the output in frame
//! order. Every task is tagged with its submission index; finished results
//! wait in a reorder buffer until all earlier ones are available. At most
//! `workers + queue_depth` tasks are in flight; `submit` blocks on the result
//! channel beyond that.

use crate::{Result, SpidyAniError};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// Worker pool returning results in submission order
pub struct FramePool<T> {
    pool: ThreadPool,
    results_tx: Option<SyncSender<(u32, Result<T>)>>,
    results: Receiver<(u32, Result<T>)>,
    reorder: BTreeMap<u32, Result<T>>,
    in_flight_limit: u32,
    submitted: u32,
    received: u32,
    delivered: u32,
}

impl<T: Send + 'static> FramePool<T> {
    /// Start `workers` threads with room for `queue_depth` waiting tasks
    ///
    /// `submit` blocks while the queue is full.
    pub fn new(name: &str, workers: usize, queue_depth: usize) -> Result<Self> {
        let workers = workers.max(1);
        let thread_prefix = name.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |id| format!("{thread_prefix}-{id}"))
            .build()
            .map_err(|e| SpidyAniError::Export(format!("{name}: {e}")))?;

        let in_flight_limit = (workers + queue_depth.max(1)) as u32;
        let (results_tx, results) = sync_channel(in_flight_limit as usize);

        log::debug!("{name}: started {workers} workers, {in_flight_limit} tasks in flight");
        Ok(Self {
            pool,
            results_tx: Some(results_tx),
            results,
            reorder: BTreeMap::new(),
            in_flight_limit,
            submitted: 0,
            received: 0,
            delivered: 0,
        })
    }

    /// Tasks submitted so far
    pub fn submitted(&self) -> u32 {
        self.submitted
    }

    /// Queue a task, blocking while the queue is full
    pub fn submit<F>(&mut self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let results_tx = self
            .results_tx
            .clone()
            .ok_or_else(|| SpidyAniError::Export("worker pool already finished".into()))?;

        while self.submitted - self.received >= self.in_flight_limit {
            if !self.receive_one() {
                return Err(SpidyAniError::Export("worker pool stopped".into()));
            }
        }

        let index = self.submitted;
        self.pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|_| {
                Err(SpidyAniError::Export(format!("frame task {index} panicked")))
            });
            // The pool may already be gone
            let _ = results_tx.send((index, result));
        });
        self.submitted += 1;
        Ok(())
    }

    /// Block for the next finished task; `false` once no sender is left
    fn receive_one(&mut self) -> bool {
        match self.results.recv() {
            Ok((index, result)) => {
                self.reorder.insert(index, result);
                self.received += 1;
                true
            }
            Err(_) => false,
        }
    }

    fn take_in_order(&mut self) -> Vec<Result<T>> {
        let mut ready = Vec::new();
        while let Some(result) = self.reorder.remove(&self.delivered) {
            ready.push(result);
            self.delivered += 1;
        }
        ready
    }

    /// Results available now, in submission order, without blocking
    pub fn drain_ready(&mut self) -> Vec<Result<T>> {
        while let Ok((index, result)) = self.results.try_recv() {
            self.reorder.insert(index, result);
            self.received += 1;
        }
        self.take_in_order()
    }

    /// Wait for every submitted task and return the remaining results in order
    pub fn finish(mut self) -> Vec<Result<T>> {
        self.results_tx = None;
        while self.received < self.submitted && self.receive_one() {}

        let mut ready = self.take_in_order();
        for index in self.delivered..self.submitted {
            ready.push(
                self.reorder
                    .remove(&index)
                    .unwrap_or_else(|| Err(SpidyAniError::Export(format!("frame task {index} lost")))),
            );
        }
        self.delivered = self.submitted;
        ready
    }
}

impl<T> std::fmt::Debug for FramePool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePool")
            .field("workers", &self.pool.current_num_threads())
            .field("submitted", &self.submitted)
            .field("received", &self.received)
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl<T> Drop for FramePool<T> {
    fn drop(&mut self) {
        // Outstanding tasks still write files; wait for them
        self.results_tx = None;
        while self.received < self.submitted && self.results.recv().is_ok() {
            self.received += 1;
        }
    }
}
