use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::config::RateLimitConfig;

/// Sequential batch executor: fixed-size slices, one at a time, with a pause
/// between consecutive batches (never before the first or after the last).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProcessor {
    batch_size: usize,
    delay: Duration,
}

impl BatchProcessor {
    /// A zero batch size is treated as one.
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self { batch_size: batch_size.max(1), delay }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.batch_size, cfg.delay())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `len` items split into.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Apply `per_batch` to each slice in order and return the per-batch outputs.
    pub async fn run<T, O, F, Fut>(&self, items: &[T], mut per_batch: F) -> Vec<O>
    where
        T: Clone,
        F: FnMut(Vec<T>) -> Fut,
        Fut: Future<Output = O>,
    {
        let total = self.batch_count(items.len());
        let mut outputs = Vec::with_capacity(total);
        for (idx, chunk) in items.chunks(self.batch_size).enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                tracing::debug!(delay_ms = self.delay.as_millis() as u64, "waiting between batches");
                sleep(self.delay).await;
            }
            tracing::debug!("batch {}/{} ({} items)", idx + 1, total, chunk.len());
            outputs.push(per_batch(chunk.to_vec()).await);
        }
        outputs
    }

    /// Like [`run`](Self::run) but flattens the per-batch results, preserving order.
    pub async fn run_flat<T, R, F, Fut>(&self, items: &[T], per_batch: F) -> Vec<R>
    where
        T: Clone,
        F: FnMut(Vec<T>) -> Fut,
        Fut: Future<Output = Vec<R>>,
    {
        self.run(items, per_batch).await.into_iter().flatten().collect()
    }
}

/// Split `items` into batches of `batch_size`, run `per_batch` on each in
/// order, sleep `delay_ms` between batches, and return the flattened results.
pub async fn process_batch<T, R, F, Fut>(items: &[T], batch_size: usize, delay_ms: u64, per_batch: F) -> Vec<R>
where
    T: Clone,
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Vec<R>>,
{
    BatchProcessor::new(batch_size, Duration::from_millis(delay_ms))
        .run_flat(items, per_batch)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    async fn timed(len: usize, batch_size: usize, delay_ms: u64) -> (Vec<usize>, Vec<Instant>, Instant) {
        let items: Vec<usize> = (0..len).collect();
        let starts = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();
        let out = process_batch(&items, batch_size, delay_ms, |batch| {
            let starts = starts.clone();
            async move {
                starts.lock().unwrap().push(Instant::now());
                batch.into_iter().map(|i| i * 10).collect::<Vec<_>>()
            }
        })
        .await;
        let starts = starts.lock().unwrap().clone();
        (out, starts, started)
    }

    #[tokio::test(start_paused = true)]
    async fn delays_only_between_batches() {
        let (out, starts, begin) = timed(7, 3, 1000).await;
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50, 60]);
        assert_eq!(starts.len(), 3);
        // first batch runs immediately, then ceil(7/3) - 1 = 2 delays
        assert!(starts[0] - begin < Duration::from_millis(1));
        let elapsed = begin.elapsed();
        assert!(elapsed >= Duration::from_millis(2000) && elapsed < Duration::from_millis(2100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn single_batch_never_sleeps() {
        let (out, starts, begin) = timed(3, 3, 5000).await;
        assert_eq!(out.len(), 3);
        assert_eq!(starts.len(), 1);
        assert_eq!(begin.elapsed(), Duration::ZERO);

        let (out, starts, _) = timed(0, 3, 5000).await;
        assert!(out.is_empty());
        assert!(starts.is_empty());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let p = BatchProcessor::new(0, Duration::ZERO);
        assert_eq!(p.batch_size(), 1);
        assert_eq!(p.batch_count(4), 4);
        assert_eq!(BatchProcessor::new(50, Duration::ZERO).batch_count(101), 3);
    }
}
