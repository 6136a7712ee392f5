//! Single-fire change notification
//!
//! A [`Watch`] is handed out by `exists`, `get` or `children` when requested.
//! It completes exactly once, after the first relevant change following the
//! read it was registered with. It carries no payload: re-query to learn the
//! new state.
//!
//! ```rust,ignore
//! let (version, watch) = client.exists("/key", true).await?;
//! if let Some(watch) = watch {
//!     watch.await?;
//!     let (new_version, _) = client.exists("/key", false).await?;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use tokio::sync::oneshot;

use crate::ConnectionError;
use crate::Error;
use crate::Result;

/// Caller side of a watch registration.
///
/// Resolves to `Ok(())` once fired, or to
/// [`ConnectionError::SessionClosed`] if the backend dropped the registration
/// without firing it.
#[derive(Debug)]
pub struct Watch {
    rx: oneshot::Receiver<()>,
    fired: Arc<AtomicBool>,
}

/// Backend side of a watch registration. Consumed on fire.
#[derive(Debug)]
pub(crate) struct WatchTrigger {
    tx: oneshot::Sender<()>,
    fired: Arc<AtomicBool>,
}

pub(crate) fn watch_pair() -> (WatchTrigger, Watch) {
    let (tx, rx) = oneshot::channel();
    let fired = Arc::new(AtomicBool::new(false));
    (
        WatchTrigger {
            tx,
            fired: fired.clone(),
        },
        Watch { rx, fired },
    )
}

impl WatchTrigger {
    pub(crate) fn fire(self) {
        self.fired.store(true, Ordering::Release);
        // Receiver may already be gone; nothing to deliver then
        let _ = self.tx.send(());
    }

    /// True once the caller dropped its [`Watch`].
    pub(crate) fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Watch {
    /// Waits for the watch to fire.
    pub async fn wait(self) -> Result<()> {
        self.await
    }

    /// Non-consuming probe: has the watch fired yet?
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Future for Watch {
    type Output = Result<()>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_err(|_| Error::Connection(ConnectionError::SessionClosed)))
    }
}
