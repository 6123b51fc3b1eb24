use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::reveal::{RevealId, TickOutcome};

/// Drives one reveal: waits the cadence, runs one tick, repeats until a terminal outcome.
///
/// The next wait only starts after the previous tick has committed, so ticks of one reveal never
/// overlap. Dropping the ticker aborts the pending wait.
#[derive(Debug)]
pub struct RevealTicker {
    id: RevealId,
    handle: JoinHandle<()>,
}

impl RevealTicker {
    pub fn spawn<F, Fut>(id: RevealId, cadence: Duration, mut step: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickOutcome> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(cadence).await;
                if step().await.is_terminal() {
                    break;
                }
            }
            tracing::trace!(reveal_id = %id, "reveal ticker stopped");
        });

        Self { id, handle }
    }

    pub fn id(&self) -> RevealId {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RevealTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_ticker(limit: usize) -> (RevealTicker, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let ticker = RevealTicker::spawn(RevealId::new(1), Duration::from_millis(24), move || {
            let counter = Arc::clone(&counter);
            async move {
                let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if call >= limit {
                    TickOutcome::Stale
                } else {
                    TickOutcome::Advanced {
                        revealed_chars: call,
                    }
                }
            }
        });
        (ticker, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_fixed_cadence_until_terminal() {
        let (ticker, calls) = counting_ticker(3);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(24)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(ticker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_stops_pending_ticks() {
        let (ticker, calls) = counting_ticker(usize::MAX);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(ticker);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
