use checkout_shared::models::events::CheckoutEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Logs every checkout event until the channel closes.
pub fn spawn_event_logger(mut rx: broadcast::Receiver<CheckoutEvent>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        info!("Checkout event logger started");
        let mut seen = 0;

        loop {
            match rx.recv().await {
                Ok(event) => {
                    seen += 1;
                    info!(order_id = event.order_id(), event = event.name(), "{:?}", event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Checkout event logger lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!("Checkout event logger stopped after {} events", seen);
        seen
    })
}
