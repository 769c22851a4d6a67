use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    Closed,
    Saturated { capacity: usize },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "worker pool is shut down"),
            Self::Saturated { capacity } => {
                write!(f, "worker pool queue is full ({capacity} jobs waiting)")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Bounded pool for blocking jobs.
///
/// At most `max_workers` jobs run at once on tokio's blocking threads; at most
/// `queue_capacity` further jobs may wait for a slot before `submit` starts
/// refusing work. Must be used from inside a tokio runtime.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

struct Inner {
    permits: Arc<Semaphore>,
    max_workers: usize,
    queue_capacity: usize,
    queued: AtomicUsize,
}

impl WorkerPool {
    pub fn new(max_workers: usize, queue_capacity: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            inner: Arc::new(Inner {
                permits: Arc::new(Semaphore::new(max_workers)),
                max_workers,
                queue_capacity,
                queued: AtomicUsize::new(0),
            }),
        }
    }

    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.permits.is_closed() {
            return Err(PoolError::Closed);
        }
        let waiting = self.inner.queued.fetch_add(1, Ordering::AcqRel);
        if waiting >= self.inner.queue_capacity {
            self.inner.queued.fetch_sub(1, Ordering::AcqRel);
            return Err(PoolError::Saturated {
                capacity: self.inner.queue_capacity,
            });
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let permit = inner.permits.clone().acquire_owned().await;
            inner.queued.fetch_sub(1, Ordering::AcqRel);
            let _permit = match permit {
                Ok(p) => p,
                Err(_) => {
                    tracing::debug!("worker pool closed, dropping queued job");
                    return;
                }
            };
            if let Err(e) = tokio::task::spawn_blocking(job).await {
                tracing::error!(error = %e, "worker job panicked");
            }
        });
        Ok(())
    }

    /// Stops accepting jobs and drops the ones still waiting for a slot.
    /// Jobs already running finish normally.
    pub fn close(&self) {
        self.inner.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.permits.is_closed()
    }

    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    pub fn active(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.inner.max_workers - self.inner.permits.available_permits()
    }

    pub fn queued(&self) -> usize {
        self.inner.queued.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_submitted_jobs() {
        let pool = WorkerPool::new(4, 16);
        let counter = Arc::new(AtomicU64::new(0));
        let mut done = Vec::new();
        for _ in 0..10 {
            let counter = counter.clone();
            let (tx, rx) = oneshot::channel();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(());
            })
            .unwrap();
            done.push(rx);
        }
        for rx in done {
            rx.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn queue_bound_rejects_excess() {
        let pool = WorkerPool::new(1, 1);
        pool.submit(|| std::thread::sleep(Duration::from_millis(300))).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pool.active(), 1);

        pool.submit(|| {}).unwrap();
        let err = pool.submit(|| {}).unwrap_err();
        assert_eq!(err, PoolError::Saturated { capacity: 1 });
    }

    #[tokio::test]
    async fn closed_pool_refuses_jobs() {
        let pool = WorkerPool::new(2, 8);
        pool.close();
        assert!(pool.is_closed());
        assert_eq!(pool.submit(|| {}), Err(PoolError::Closed));
    }

    #[test]
    fn zero_workers_is_clamped() {
        assert_eq!(WorkerPool::new(0, 1).max_workers(), 1);
    }
}
