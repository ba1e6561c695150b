pub mod ask;
pub mod catalog;
pub mod chat;
pub mod check_sql;
pub mod config;
pub mod dispatch;
pub mod load;
pub mod vote;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels a token on Ctrl-C for as long as it is alive.
pub struct InterruptGuard {
    watcher: JoinHandle<()>,
}

impl InterruptGuard {
    pub fn watch(token: &CancellationToken) -> Self {
        let token = token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received, cancelling request");
                token.cancel();
            }
        });
        Self { watcher }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
