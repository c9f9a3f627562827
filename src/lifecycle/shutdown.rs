//! Shutdown coordination for the key service.

use std::future::Future;
use tokio::sync::broadcast;

/// Handle shared by the signal handler, the key server and tests.
///
/// Any clone can fire it; every [`Shutdown::signalled`] future resolves.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Stop everything waiting on this handle.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with nothing waiting");
        }
    }

    /// Future that completes once [`Shutdown::trigger`] fires.
    ///
    /// The subscription is taken when this is called, not when the future is
    /// first polled, so a trigger in between is not missed.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
