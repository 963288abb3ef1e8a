//! Stop signal shared by the mining loop, the sync loop and the API server.
//!
//! The signal is latched in a `watch` channel: once raised it stays raised,
//! so a listener created afterwards observes it straight away and a node that
//! is started after [`Node::stop`](crate::Node::stop) never spins up loops.

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Owner side of the node's stop signal.
pub struct ShutdownController {
    raised: watch::Sender<bool>,
}

/// Listener side, handed to each background task.
#[derive(Clone)]
pub struct StopListener {
    raised: watch::Receiver<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (raised, _) = watch::channel(false);
        Self { raised }
    }

    pub fn listener(&self) -> StopListener {
        StopListener {
            raised: self.raised.subscribe(),
        }
    }

    /// Raise the stop signal. Returns `false` if it was already raised.
    pub fn raise(&self) -> bool {
        self.raised.send_if_modified(|raised| !std::mem::replace(raised, true))
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.borrow()
    }

    /// Wait for SIGINT or SIGTERM, then raise the stop signal.
    pub async fn wait_for_os_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, relying on SIGINT");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let name = tokio::select! {
            _ = signal::ctrl_c() => "SIGINT",
            _ = terminate => "SIGTERM",
        };
        info!(signal = name, "stop requested by OS signal");
        self.raise();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl StopListener {
    pub fn is_stopped(&self) -> bool {
        *self.raised.borrow()
    }

    /// Resolve once the stop signal is raised, immediately if it already is.
    /// A dropped controller counts as a stop.
    pub async fn stopped(&mut self) {
        let _ = self.raised.wait_for(|raised| *raised).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listener_wakes_when_raised_from_another_task() {
        let controller = std::sync::Arc::new(ShutdownController::new());
        let mut listener = controller.listener();
        assert!(!listener.is_stopped());

        let raiser = std::sync::Arc::clone(&controller);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            raiser.raise();
        });

        tokio::time::timeout(Duration::from_secs(1), listener.stopped())
            .await
            .expect("listener should observe the stop");
        assert!(listener.is_stopped());
    }

    #[tokio::test]
    async fn late_listener_sees_an_earlier_stop() {
        let controller = ShutdownController::new();
        controller.raise();

        let mut late = controller.listener();
        assert!(late.is_stopped());
        tokio::time::timeout(Duration::from_millis(100), late.stopped())
            .await
            .expect("a stop raised before subscribing must not be missed");
    }

    #[test]
    fn raising_twice_reports_only_the_first() {
        let controller = ShutdownController::new();
        assert!(!controller.is_raised());
        assert!(controller.raise());
        assert!(!controller.raise());
        assert!(controller.is_raised());
    }

    #[tokio::test]
    async fn dropped_controller_releases_listeners() {
        let controller = ShutdownController::new();
        let mut listener = controller.listener();
        drop(controller);
        tokio::time::timeout(Duration::from_millis(100), listener.stopped())
            .await
            .expect("listener must not hang once the controller is gone");
    }
}
