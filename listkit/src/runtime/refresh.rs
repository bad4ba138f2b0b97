//! Refresh trigger channel.
//!
//! Features call [`RefreshSender::request`] when their state change needs a
//! fresh data load (e.g. a server-side filter). The host owns the
//! [`RefreshReceiver`] and answers each wakeup with
//! [`ListRuntime::refresh`](super::ListRuntime::refresh).

use tokio::sync::mpsc;

/// Sender half of the refresh channel.
///
/// Clone-able, can be moved into feature closures.
#[derive(Clone, Debug)]
pub struct RefreshSender {
    tx: Option<mpsc::Sender<()>>,
}

impl RefreshSender {
    /// A sender connected to nothing; requests are dropped.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Request a refresh.
    ///
    /// Non-blocking. Requests coalesce when one is already queued, and are
    /// ignored once the receiver is gone.
    pub fn request(&self) {
        match &self.tx {
            Some(tx) => {
                if tx.try_send(()).is_err() {
                    log::trace!("refresh request coalesced or receiver closed");
                }
            }
            None => log::debug!("refresh requested on a detached trigger"),
        }
    }

    /// Whether a receiver can still observe requests.
    pub fn is_connected(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

impl Default for RefreshSender {
    fn default() -> Self {
        Self::detached()
    }
}

/// Receiver half of the refresh channel.
#[derive(Debug)]
pub struct RefreshReceiver {
    rx: mpsc::Receiver<()>,
}

impl RefreshReceiver {
    /// Wait for the next refresh request. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Take a pending request without waiting.
    pub fn try_recv(&mut self) -> Option<()> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected refresh channel pair.
pub fn channel() -> (RefreshSender, RefreshReceiver) {
    // One slot is enough: a queued request already covers later ones.
    let (tx, rx) = mpsc::channel(1);
    (RefreshSender { tx: Some(tx) }, RefreshReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let (tx, mut rx) = channel();
        tx.request();
        tx.request();
        assert_eq!(rx.try_recv(), Some(()));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_detached_sender_is_inert() {
        let tx = RefreshSender::detached();
        tx.request();
        assert!(!tx.is_connected());
    }
}
