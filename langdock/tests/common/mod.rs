use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use langdock::{
    CategoryTable, ConnectionBroker, EndpointConfig, EndpointResolver, GenericVars, Session,
    SessionState, VarSource,
};
use langdock_types::Category;
use tokio::net::{TcpListener, TcpStream};

pub const LOOPBACK: &str = "127.0.0.1";
pub const WAIT: Duration = Duration::from_secs(5);

pub fn vars(pairs: &[(&str, &str)]) -> Arc<dyn VarSource> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(vars)
}

/// A table of loopback categories: `(name, default port, file extension)`.
pub fn table(entries: &[(&str, u16, &str)]) -> CategoryTable {
    entries.iter().fold(
        CategoryTable::new(GenericVars::default()),
        |table, (name, port, extension)| {
            let category = Category::new(name);
            let config =
                EndpointConfig::new(&category, LOOPBACK, *port).with_extensions([*extension]);
            table.with(category, config)
        },
    )
}

pub fn broker(table: CategoryTable) -> Arc<ConnectionBroker> {
    broker_with_vars(table, vars(&[]))
}

pub fn broker_with_vars(table: CategoryTable, vars: Arc<dyn VarSource>) -> Arc<ConnectionBroker> {
    Arc::new(ConnectionBroker::new(EndpointResolver::new(Arc::new(table), vars)))
}

pub async fn backend() -> (TcpListener, u16) {
    let listener = TcpListener::bind((LOOPBACK, 0))
        .await
        .expect("failed to bind backend");
    let port = listener.local_addr().expect("no local addr").port();
    (listener, port)
}

/// A loopback port nothing is listening on.
pub async fn unreachable_port() -> u16 {
    let (listener, port) = backend().await;
    drop(listener);
    port
}

pub async fn accept(listener: &TcpListener) -> TcpStream {
    let (stream, _) = tokio::time::timeout(WAIT, listener.accept())
        .await
        .expect("backend saw no connection")
        .expect("accept failed");
    stream
}

/// True if a second connection shows up within a short grace period.
pub async fn saw_another_connection(listener: &TcpListener) -> bool {
    tokio::time::timeout(Duration::from_millis(200), listener.accept())
        .await
        .is_ok()
}

pub async fn settle(session: &Session) -> SessionState {
    tokio::time::timeout(WAIT, session.settled())
        .await
        .expect("session never settled")
}

pub async fn wait_for_session(broker: &ConnectionBroker, category: &str) -> Arc<Session> {
    tokio::time::timeout(WAIT, async {
        loop {
            if let Some(session) = broker.session(category).await {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no session registered")
}
