/*
Bridges the document front end to the broker.

Subscribes to the activation source, replays what is already open, then
forwards every later activation until stopped.
*/
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::broker::{ConnectionBroker, ShutdownReport};

mod pump;
pub mod source;
pub mod tracker;

pub use source::ActivationSource;
pub use tracker::DocumentTracker;

pub struct Service {
    broker: Arc<ConnectionBroker>,
    shutdown_tx: watch::Sender<()>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Service {
    pub async fn start<S: ActivationSource>(broker: Arc<ConnectionBroker>, source: &S) -> Service {
        // subscribe before the sweep so nothing opened in between is lost
        let events = source.subscribe();
        let replay = source.current();
        info!(documents = replay.len(), "replaying open documents");
        for event in replay {
            broker.on_category_activated(&event.category).await;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let pump = tokio::spawn(pump::run_activation_pump(
            Arc::clone(&broker),
            events,
            shutdown_rx,
        ));

        Service {
            broker,
            shutdown_tx,
            pump: Mutex::new(Some(pump)),
        }
    }

    pub fn broker(&self) -> &Arc<ConnectionBroker> {
        &self.broker
    }

    /// Stops forwarding activations and closes every session. Calling it
    /// again returns an empty report.
    pub async fn stop(&self) -> ShutdownReport {
        let pump = self.pump.lock().await.take();
        if let Some(pump) = pump {
            // the pump may already be gone if the source closed
            let _ = self.shutdown_tx.send(());
            if let Err(err) = pump.await {
                warn!(error = %err, "activation pump ended abnormally");
            }
        }

        let report = self.broker.shutdown().await;
        info!(
            closed = report.closed.len(),
            failed = report.failed.len(),
            "service stopped"
        );
        report
    }
}
