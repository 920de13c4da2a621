//! Worker pool for concurrent file processing with backpressure.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results go to an unbounded channel drained by the caller,
//! which is the only place results are aggregated.
//!
//! `async-channel`'s `Receiver` is `Clone`, so each worker gets its own
//! handle and no `Mutex` is needed around the work queue.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A pool of worker tasks that process items concurrently.
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, files, |path| async move {
///     process(path).await
/// });
///
/// while let Some(result) = pool.recv().await {
///     summary.record(result);
/// }
/// ```
pub struct WorkerPool<W: Send + 'static, R: Send + 'static> {
    work_rx: async_channel::Receiver<W>,
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<W: Send + 'static, R: Send + 'static> WorkerPool<W, R> {
    /// Spawn `n` workers, submit all items, and return a pool for receiving
    /// results.
    ///
    /// Items are submitted from a background task through a channel of
    /// capacity `n`, so the caller can start receiving immediately.
    pub fn start<F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        let result = process_fn(item).await;
                        if result_tx.send(result).is_err() {
                            break; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // Channel closes once every worker has exited
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    log::debug!("Worker pool: stopped, dropping remaining items");
                    break;
                }
            }
        });

        Self {
            work_rx,
            result_rx,
            _handles: handles,
        }
    }

    /// Stop accepting new work. Items already picked up (or buffered in the
    /// channel) still complete and their results can still be received.
    pub fn stop(&self) {
        self.work_rx.close();
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }
}
