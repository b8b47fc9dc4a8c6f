use std::sync::Arc;

use langdock_types::ActivationEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch::Receiver;

use crate::core::broker::ConnectionBroker;

pub async fn run_activation_pump(
    broker: Arc<ConnectionBroker>,
    mut events: UnboundedReceiver<ActivationEvent>,
    mut shutdown_rx: Receiver<()>,
) {
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::info!("Activation source closed.");
                    break;
                };
                let outcome = broker.on_category_activated(&event.category).await;
                tracing::debug!(
                    category = %event.category,
                    document = %event.metadata.path.display(),
                    ?outcome,
                    "activation handled"
                );
            }

            _ = shutdown_rx.changed() => {
                tracing::info!("Shutdown signal received. Stopping activation pump.");
                break;
            }
        }
    }
}
