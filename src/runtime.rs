//! Runtime abstraction layer for async operations
//!
//! The panel never blocks: tile batches are handed to an [`AsyncSpawner`]
//! supplied by the host. Tokio hosts use [`spawners::tokio_impl::TokioSpawner`],
//! headless hosts and tests use [`spawners::DeferredSpawner`] and drive the
//! queued work themselves.

use futures::future::BoxFuture;

/// A trait for spawning fire-and-forget async tasks (object-safe)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use futures::future::{AbortHandle, Abortable, FutureExt};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner; must be used from inside a runtime
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
                let handle = ::tokio::spawn(future);
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    struct DeferredTask {
        future: BoxFuture<'static, ()>,
        abort: AbortHandle,
        finished: Arc<AtomicBool>,
    }

    /// Queues spawned futures until [`DeferredSpawner::run_pending`] drives them
    #[derive(Clone, Default)]
    pub struct DeferredSpawner {
        queue: Arc<Mutex<Vec<DeferredTask>>>,
    }

    impl DeferredSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pending(&self) -> usize {
            self.queue.lock().map(|q| q.len()).unwrap_or(0)
        }

        /// Runs every queued task to completion on the current thread,
        /// returning how many ran without being cancelled.
        pub fn run_pending(&self) -> usize {
            let tasks: Vec<DeferredTask> = match self.queue.lock() {
                Ok(mut queue) => queue.drain(..).collect(),
                Err(_) => return 0,
            };

            let mut completed = 0;
            for task in tasks {
                if task.abort.is_aborted() {
                    task.finished.store(true, Ordering::SeqCst);
                    continue;
                }
                futures::executor::block_on(task.future);
                task.finished.store(true, Ordering::SeqCst);
                completed += 1;
            }
            completed
        }
    }

    impl AsyncSpawner for DeferredSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
            let (abort, registration) = AbortHandle::new_pair();
            let finished = Arc::new(AtomicBool::new(false));
            let task = DeferredTask {
                future: Abortable::new(future, registration).map(|_| ()).boxed(),
                abort: abort.clone(),
                finished: Arc::clone(&finished),
            };
            if let Ok(mut queue) = self.queue.lock() {
                queue.push(task);
            }
            Box::new(DeferredHandle { abort, finished })
        }
    }

    struct DeferredHandle {
        abort: AbortHandle,
        finished: Arc<AtomicBool>,
    }

    impl AsyncHandle for DeferredHandle {
        fn is_finished(&self) -> bool {
            self.finished.load(Ordering::SeqCst)
        }

        fn cancel(&self) {
            self.abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spawners::DeferredSpawner;
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_deferred_spawner_runs_on_demand() {
        let spawner = DeferredSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let handle = spawner.spawn_boxed(
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );

        assert_eq!(spawner.pending(), 1);
        assert!(!handle.is_finished());
        assert_eq!(spawner.run_pending(), 1);
        assert!(handle.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_tasks_never_run() {
        let spawner = DeferredSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let handle = spawner.spawn_boxed(
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );
        handle.cancel();

        assert_eq!(spawner.run_pending(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let spawner = spawners::tokio_impl::TokioSpawner;
        let (tx, rx) = futures::channel::oneshot::channel();
        let handle = spawner.spawn_boxed(
            async move {
                let _ = tx.send(7);
            }
            .boxed(),
        );

        assert_eq!(rx.await.unwrap(), 7);
        handle.cancel();
    }
}
