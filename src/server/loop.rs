// Server loop module
// Accepts connections until shutdown, then drains the ones in flight

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How long shutdown waits for in-flight connections
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Accept connections until `shutdown` is notified
///
/// The listener is closed as soon as shutdown starts; connections already
/// accepted get up to [`DRAIN_TIMEOUT`] to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    drop(listener);
    let remaining = drain_connections(&state.active_connections, DRAIN_TIMEOUT).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until `counter` reaches zero or `timeout` passes, returning what is left
async fn drain_connections(counter: &AtomicUsize, timeout: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let remaining = counter.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let counter = AtomicUsize::new(0);
        assert_eq!(drain_connections(&counter, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_timeout() {
        let counter = AtomicUsize::new(2);
        assert_eq!(drain_connections(&counter, Duration::from_millis(300)).await, 2);
    }

    #[tokio::test]
    async fn test_drain_sees_connections_finish() {
        let counter = Arc::new(AtomicUsize::new(1));
        let finisher = Arc::clone(&counter);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            finisher.store(0, Ordering::SeqCst);
        });
        assert_eq!(drain_connections(&counter, Duration::from_secs(5)).await, 0);
    }
}
