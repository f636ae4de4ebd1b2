//! Runtime abstraction layer for async operations
//!
//! Tile fetches are the only work the engine hands to an executor. The loader
//! holds an `Arc<dyn AsyncSpawner>` so hosts and tests can choose the runtime.

use futures::Future;
use std::pin::Pin;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience wrapper for spawning with type safety
pub fn spawn<F>(spawner: &dyn AsyncSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

/// Spawner used when the host does not supply one
#[cfg(feature = "tokio-runtime")]
pub fn default_spawner() -> std::sync::Arc<dyn AsyncSpawner> {
    std::sync::Arc::new(spawners::tokio_impl::TokioSpawner::current())
}

/// Default spawner implementations
pub mod spawners {
    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::super::*;
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner
        pub struct TokioSpawner {
            handle: Option<Handle>,
        }

        impl TokioSpawner {
            /// Spawns onto whichever runtime is current when a task starts
            pub fn current() -> Self {
                Self { handle: None }
            }

            /// Spawns onto a specific runtime, usable from threads outside it
            pub fn with_handle(handle: Handle) -> Self {
                Self {
                    handle: Some(handle),
                }
            }
        }

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = match &self.handle {
                    Some(runtime) => runtime.spawn(future),
                    None => ::tokio::spawn(future),
                };
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
}

pub mod async_utils {
    use super::*;
    use std::time::Duration;

    /// Races `future` against `limit`; `None` means it did not finish in time.
    ///
    /// Without a timer-capable runtime the future is awaited unguarded.
    pub async fn with_timeout<F>(future: F, limit: Option<Duration>) -> Option<F::Output>
    where
        F: Future,
    {
        match limit {
            #[cfg(feature = "tokio-runtime")]
            Some(limit) => tokio::time::timeout(limit, future).await.ok(),
            #[cfg(not(feature = "tokio-runtime"))]
            Some(_) => Some(future.await),
            None => Some(future.await),
        }
    }
}
