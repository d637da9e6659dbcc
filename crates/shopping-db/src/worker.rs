//! # Worker-Backed Cart Store
//!
//! A `CartStore` whose database handle lives on one dedicated thread.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller thread(s)                        "cart-worker" thread           │
//! │  ────────────────                        ────────────────────           │
//! │                                          current-thread runtime         │
//! │  store.increase_quantity(id) ──┐         backend = open().await         │
//! │  store.find_range(0, 5) ───────┤  jobs   ┌──────────────────────────┐   │
//! │  store.submit(command) ────────┼──────►  │ loop { jobs.recv() }     │   │
//! │                                │  (FIFO) │   Command → apply_command│   │
//! │        blocking_recv ◄─────────┘ oneshot │   Query   → run_query    │   │
//! │                                          │   Shutdown → break       │   │
//! │  take_failures() ◄────────────────────── │ fire-and-forget errors   │   │
//! │                                          └──────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Jobs run one at a time in submission order, so a queued mutation is
//! visible to every job submitted after it.
//!
//! ## Blocking
//! Every `CartStore` method blocks the calling thread until the worker
//! replies. Calling them from inside an async runtime panics; async callers
//! should use `tokio::task::spawn_blocking`.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use shopping_core::{
    CartError, CartItem, CartObserver, CartResult, CartStore, NoOpObserver, ProductId, Quantity,
};

use crate::backend::{apply_command, run_query, CartBackend, CartCommand, CartQuery, QueryReply};
use crate::pool::{Database, DbConfig};

const WORKER_THREAD_NAME: &str = "cart-worker";

// =============================================================================
// Jobs
// =============================================================================

enum Job {
    Command {
        command: CartCommand,
        /// `None` for fire-and-forget submissions.
        reply: Option<oneshot::Sender<CartResult<()>>>,
    },
    Query {
        query: CartQuery,
        reply: oneshot::Sender<CartResult<QueryReply>>,
    },
    Shutdown,
}

/// A fire-and-forget command that failed on the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub command: CartCommand,
    pub error: CartError,
}

fn worker_gone() -> CartError {
    CartError::backend("cart worker is not running")
}

fn unexpected_reply() -> CartError {
    CartError::backend("unexpected reply from cart worker")
}

// =============================================================================
// Store
// =============================================================================

/// `CartStore` that forwards every operation to a single worker thread.
///
/// ## Usage
/// ```rust,ignore
/// let store = WorkerBackedCartStore::open(DbConfig::new("shopping.db"))?;
///
/// store.increase_quantity(ProductId::new(1))?;   // waits for the worker
/// store.submit(CartCommand::Increase(ProductId::new(2)))?; // does not
///
/// assert_eq!(store.total_count()?, 2);
/// ```
pub struct WorkerBackedCartStore {
    jobs: mpsc::UnboundedSender<Job>,
    failures: Mutex<Option<mpsc::UnboundedReceiver<WorkerFailure>>>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerBackedCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerBackedCartStore")
            .field("running", &!self.jobs.is_closed())
            .finish_non_exhaustive()
    }
}

impl WorkerBackedCartStore {
    /// Opens the SQLite cart at `config` on a new worker thread.
    pub fn open(config: DbConfig) -> CartResult<Self> {
        Self::open_with_observer(config, Arc::new(NoOpObserver))
    }

    /// Like [`open`](Self::open), reporting changes to `observer` from the
    /// worker thread.
    pub fn open_with_observer(config: DbConfig, observer: Arc<dyn CartObserver>) -> CartResult<Self> {
        Self::spawn(
            move || async move { Ok::<_, CartError>(Database::new(config).await?.carts()) },
            observer,
        )
    }

    /// Starts a worker over any backend.
    ///
    /// `open` runs on the worker thread. This call returns once it has
    /// finished, with its error if it failed.
    pub fn spawn<F, Fut, B>(open: F, observer: Arc<dyn CartObserver>) -> CartResult<Self>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CartResult<B>>,
        B: CartBackend + 'static,
    {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(CartError::backend(e.to_string())));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let backend = match open().await {
                        Ok(backend) => backend,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));

                    run_worker(backend, jobs_rx, failures_tx, observer).await;
                });
            })
            .map_err(|e| CartError::backend(format!("failed to start cart worker: {e}")))?;

        match ready_rx.blocking_recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(worker_gone());
            }
        }

        info!("Cart worker started");

        Ok(WorkerBackedCartStore {
            jobs: jobs_tx,
            failures: Mutex::new(Some(failures_rx)),
            worker: Some(worker),
        })
    }

    /// Queues a mutation without waiting for it.
    ///
    /// Fails only if the worker is gone. Execution errors are logged and
    /// delivered through [`take_failures`](Self::take_failures).
    pub fn submit(&self, command: CartCommand) -> CartResult<()> {
        self.jobs
            .send(Job::Command {
                command,
                reply: None,
            })
            .map_err(|_| worker_gone())
    }

    /// Takes the receiver of fire-and-forget failures. Only the first call
    /// gets it.
    pub fn take_failures(&self) -> Option<mpsc::UnboundedReceiver<WorkerFailure>> {
        self.failures.lock().ok().and_then(|mut slot| slot.take())
    }

    fn execute(&self, command: CartCommand) -> CartResult<()> {
        let (reply, rx) = oneshot::channel();
        self.jobs
            .send(Job::Command {
                command,
                reply: Some(reply),
            })
            .map_err(|_| worker_gone())?;
        rx.blocking_recv().map_err(|_| worker_gone())?
    }

    fn query(&self, query: CartQuery) -> CartResult<QueryReply> {
        let (reply, rx) = oneshot::channel();
        self.jobs
            .send(Job::Query { query, reply })
            .map_err(|_| worker_gone())?;
        rx.blocking_recv().map_err(|_| worker_gone())?
    }
}

impl Drop for WorkerBackedCartStore {
    fn drop(&mut self) {
        // Jobs already queued run before Shutdown.
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Cart worker panicked");
            }
        }
    }
}

impl CartStore for WorkerBackedCartStore {
    fn increase_quantity(&self, product_id: ProductId) -> CartResult<()> {
        self.execute(CartCommand::Increase(product_id))
    }

    fn decrease_quantity(&self, product_id: ProductId) -> CartResult<()> {
        self.execute(CartCommand::Decrease(product_id))
    }

    fn set_quantity(&self, product_id: ProductId, quantity: Quantity) -> CartResult<()> {
        self.execute(CartCommand::Set(product_id, quantity))
    }

    fn delete_cart_item(&self, product_id: ProductId) -> CartResult<()> {
        self.execute(CartCommand::Delete(product_id))
    }

    fn find_or_none(&self, product_id: ProductId) -> CartResult<Option<CartItem>> {
        match self.query(CartQuery::Find(product_id))? {
            QueryReply::Item(item) => Ok(item),
            _ => Err(unexpected_reply()),
        }
    }

    fn find_range(&self, page: usize, page_size: usize) -> CartResult<Vec<CartItem>> {
        match self.query(CartQuery::Range { page, page_size })? {
            QueryReply::Items(items) => Ok(items),
            _ => Err(unexpected_reply()),
        }
    }

    fn total_count(&self) -> CartResult<usize> {
        match self.query(CartQuery::Count)? {
            QueryReply::Count(count) => Ok(count),
            _ => Err(unexpected_reply()),
        }
    }

    fn total_quantity(&self) -> CartResult<u64> {
        match self.query(CartQuery::TotalQuantity)? {
            QueryReply::TotalQuantity(total) => Ok(total),
            _ => Err(unexpected_reply()),
        }
    }
}

// =============================================================================
// Worker Loop
// =============================================================================

async fn run_worker<B: CartBackend>(
    backend: B,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    failures: mpsc::UnboundedSender<WorkerFailure>,
    observer: Arc<dyn CartObserver>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Command { command, reply } => {
                let outcome = apply_command(&backend, command).await.map(|event| {
                    debug!(?event, "Cart changed");
                    observer.on_change(&event);
                });

                match reply {
                    Some(reply) => {
                        let _ = reply.send(outcome);
                    }
                    None => {
                        if let Err(error) = outcome {
                            error!(?command, %error, "Queued cart command failed");
                            if failures.send(WorkerFailure { command, error }).is_err() {
                                warn!("Failure receiver dropped");
                            }
                        }
                    }
                }
            }

            Job::Query { query, reply } => {
                let _ = reply.send(run_query(&backend, query).await);
            }

            Job::Shutdown => break,
        }
    }

    info!("Cart worker stopped");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::ErrorKind;

    /// Backend whose every call fails.
    struct BrokenBackend;

    impl CartBackend for BrokenBackend {
        async fn find(&self, _: ProductId) -> CartResult<Option<CartItem>> {
            Err(CartError::backend("disk on fire"))
        }
        async fn upsert(&self, _: ProductId, _: Quantity) -> CartResult<CartItem> {
            Err(CartError::backend("disk on fire"))
        }
        async fn delete(&self, _: ProductId) -> CartResult<bool> {
            Err(CartError::backend("disk on fire"))
        }
        async fn range(&self, _: usize, _: usize) -> CartResult<Vec<CartItem>> {
            Err(CartError::backend("disk on fire"))
        }
        async fn count(&self) -> CartResult<usize> {
            Err(CartError::backend("disk on fire"))
        }
        async fn total_quantity(&self) -> CartResult<u64> {
            Err(CartError::backend("disk on fire"))
        }
    }

    fn broken_store() -> WorkerBackedCartStore {
        WorkerBackedCartStore::spawn(
            || async { Ok::<_, CartError>(BrokenBackend) },
            Arc::new(NoOpObserver),
        )
        .unwrap()
    }

    #[test]
    fn test_open_failure_is_returned() {
        let result = WorkerBackedCartStore::spawn(
            || async { Err::<BrokenBackend, _>(CartError::backend("no database")) },
            Arc::new(NoOpObserver),
        );
        assert_eq!(result.unwrap_err(), CartError::backend("no database"));
    }

    #[test]
    fn test_backend_errors_reach_caller() {
        let store = broken_store();
        let err = store.increase_quantity(ProductId::new(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(store.total_count().unwrap_err().kind(), ErrorKind::Backend);
    }

    #[test]
    fn test_submit_failures_are_published() {
        let store = broken_store();
        let mut failures = store.take_failures().unwrap();
        assert!(store.take_failures().is_none());

        store
            .submit(CartCommand::Increase(ProductId::new(3)))
            .unwrap();
        // Any later request completes after the queued command ran.
        let _ = store.total_count();

        let failure = failures.try_recv().unwrap();
        assert_eq!(failure.command, CartCommand::Increase(ProductId::new(3)));
        assert_eq!(failure.error.kind(), ErrorKind::Backend);
    }

    #[test]
    fn test_zero_page_size_rejected_on_worker() {
        let store = WorkerBackedCartStore::open(DbConfig::in_memory()).unwrap();
        let err = store.find_range(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
