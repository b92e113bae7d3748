//! Ctrl-C handling
//!
//! The conversion runs on the blocking pool while the runtime waits for
//! either its result or an interrupt. An interrupt ends the run cleanly.

use anyhow::Result;
use std::future::Future;
use tracing::warn;

/// How a run ended
#[derive(Debug)]
pub enum Outcome<T> {
    Finished(T),
    Interrupted,
}

/// Run `work` until it returns or `interrupt` resolves, whichever comes first
pub async fn run_until<T, F, I>(work: F, interrupt: I) -> Result<Outcome<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
    I: Future<Output = ()>,
{
    let task = tokio::task::spawn_blocking(work);
    tokio::select! {
        joined = task => Ok(Outcome::Finished(joined??)),
        () = interrupt => Ok(Outcome::Interrupted),
    }
}

/// Resolves on the first Ctrl-C; never resolves if the handler cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_work_finishes() {
        let outcome = run_until(|| Ok(5), std::future::pending::<()>()).await.unwrap();
        assert!(matches!(outcome, Outcome::Finished(5)));
    }

    #[tokio::test]
    async fn test_interrupt_wins_over_slow_work() {
        let work = || {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        };
        let outcome = run_until(work, async {}).await.unwrap();
        assert!(matches!(outcome, Outcome::Interrupted));
    }

    #[tokio::test]
    async fn test_work_error_propagates() {
        let work = || Err::<(), _>(anyhow::anyhow!("listing unreadable"));
        let err = run_until(work, std::future::pending::<()>()).await.unwrap_err();
        assert_eq!(err.to_string(), "listing unreadable");
    }
}
