use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::CategoryTable;
use crate::core::broker::ConnectionBroker;
use crate::core::resolver::EndpointResolver;
use crate::runtime::{DocumentTracker, Service};
use crate::server::params::Params;

pub mod params;

pub async fn start(params: Params) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(params.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();

    let table = Arc::new(
        CategoryTable::load_or_default(params.config.as_ref())
            .context("loading category table")?,
    );
    let resolver = EndpointResolver::from_env(Arc::clone(&table));
    for category in table.categories() {
        if let Some(endpoint) = resolver.resolve_category(category.as_str()) {
            info!(
                category = %category,
                endpoint = %endpoint,
                extensions = ?table.extensions(category.as_str()),
                "serving category"
            );
        }
    }

    let broker = Arc::new(ConnectionBroker::new(resolver));
    let tracker = DocumentTracker::new(Arc::clone(&table));
    let service = Service::start(broker, &tracker).await;

    tokio::select! {
        result = feed_documents(&tracker) => {
            if let Err(err) = result {
                warn!(error = %err, "document feed failed");
            }
        }
        _ = tokio::signal::ctrl_c() => info!("interrupt received"),
    }

    let report = service.stop().await;
    for (category, err) in &report.failed {
        warn!(category = %category, error = %err, "session did not close cleanly");
    }
    Ok(())
}

/// Reads `open <path>` / `close <path>` lines from stdin until EOF.
async fn feed_documents(tracker: &DocumentTracker) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(char::is_whitespace) {
            Some(("open", path)) => {
                if tracker.open(path.trim()).is_none() {
                    info!(document = path.trim(), "no category for document");
                }
            }
            Some(("close", path)) => {
                tracker.close(path.trim().as_ref());
            }
            _ => warn!(line, "expected `open <path>` or `close <path>`"),
        }
    }
    Ok(())
}
