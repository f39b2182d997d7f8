//! Client disconnect detection

use tokio_util::sync::CancellationToken;

use super::connection::ClientConnection;

/// "Client gone" signal for one request
///
/// Once the connection has closed the signal stays raised for the rest of the
/// request.
#[derive(Debug, Clone)]
pub struct CancellationWatcher {
    token: CancellationToken,
}

impl CancellationWatcher {
    /// Start watching `connection`; call before streaming begins
    pub fn attach<C: ClientConnection + ?Sized>(connection: &C) -> Self {
        Self {
            token: connection.on_close(),
        }
    }

    pub fn is_client_gone(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the client has gone
    pub async fn client_gone(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::connection::response_channel;

    #[tokio::test]
    async fn test_signal_is_level_triggered() {
        let (mut conn, pending) = response_channel();
        let watcher = CancellationWatcher::attach(&conn);
        assert!(!watcher.is_client_gone());

        conn.write_status(200);
        drop(pending);
        watcher.client_gone().await;
        assert!(watcher.is_client_gone());
        assert!(watcher.is_client_gone());
    }

    #[tokio::test]
    async fn test_watchers_share_the_close_event() {
        let (conn, pending) = response_channel();
        let first = CancellationWatcher::attach(&conn);
        let second = CancellationWatcher::attach(&conn);

        drop(conn);
        drop(pending);
        assert!(first.is_client_gone());
        assert!(second.is_client_gone());
    }
}
