use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::{sleep, Instant};

#[derive(Debug, Error)]
#[error("timed out after {timeout:?} waiting for {what}")]
pub struct WaitTimeout {
    pub what: String,
    pub timeout: Duration,
}

/// Polls `probe` every `poll_interval` until it yields a value or `timeout` elapses.
/// The probe always runs at least once.
pub async fn wait_for<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout {
                what: what.to_string(),
                timeout,
            });
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

pub async fn wait_until<F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut predicate: F,
) -> Result<(), WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_for(what, timeout, poll_interval, || {
        let check = predicate();
        async move { check.await.then_some(()) }
    })
    .await
}
