mod common;

use std::io::Write;
use std::sync::Arc;

use langdock::{ActivationSource, CategoryTable, DocumentTracker, Service};
use langdock_types::DocumentMeta;

use crate::common::{accept, backend, broker, settle, table, wait_for_session};

#[tokio::test]
async fn start_replays_documents_opened_before_subscription() {
    let (listener, port) = backend().await;
    let table = table(&[("rust", port, "rs")]);
    let tracker = DocumentTracker::new(Arc::new(table.clone()));
    assert!(tracker.open("/work/src/lib.rs").is_some());
    assert!(tracker.open("/work/src/main.rs").is_some());
    assert_eq!(tracker.current().len(), 2);

    let service = Service::start(broker(table), &tracker).await;
    let session = service
        .broker()
        .session("rust")
        .await
        .expect("replayed before start returns");
    assert!(settle(&session).await.is_active());
    let _backend_side = accept(&listener).await;
    assert_eq!(service.broker().len().await, 1);

    service.stop().await;
}

#[tokio::test]
async fn later_documents_activate_their_category() {
    let (rust_listener, rust_port) = backend().await;
    let (java_listener, java_port) = backend().await;
    let table = table(&[("rust", rust_port, "rs"), ("java", java_port, "java")]);
    let tracker = DocumentTracker::new(Arc::new(table.clone()));

    let service = Service::start(broker(table), &tracker).await;
    assert!(service.broker().is_empty().await);

    assert!(tracker.open("Main.java").is_some());
    tracker.open_with("cobol", DocumentMeta::file("legacy.cbl"));
    assert!(tracker.open("lib.rs").is_some());

    let java = wait_for_session(service.broker(), "java").await;
    let rust = wait_for_session(service.broker(), "rust").await;
    assert!(settle(&java).await.is_active());
    assert!(settle(&rust).await.is_active());
    let _java_side = accept(&java_listener).await;
    let _rust_side = accept(&rust_listener).await;
    assert!(service.broker().session("cobol").await.is_none());

    let report = service.stop().await;
    assert_eq!(report.closed.len(), 2);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn stop_twice_is_harmless() {
    let (_listener, port) = backend().await;
    let table = table(&[("rust", port, "rs")]);
    let tracker = DocumentTracker::new(Arc::new(table.clone()));
    assert_eq!(tracker.open("a.rs").map(|e| e.category), Some("rust".to_string()));

    let service = Service::start(broker(table), &tracker).await;
    let first = service.stop().await;
    assert_eq!(first.closed.len(), 1);
    assert!(service.broker().is_empty().await);

    let second = service.stop().await;
    assert!(second.is_empty());

    // the pump is gone, so new documents no longer reach the broker
    tracker.open("b.rs");
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(service.broker().is_empty().await);
}

#[tokio::test]
async fn category_table_loads_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[generic]
host_var = "LS_HOST"
port_var = "LS_PORT"

[categories.rust]
default_host = "language-server"
default_port = 5555
extensions = ["rs"]

[categories.java]
default_host = "java-server"
default_port = 5556
extensions = ["java"]
"#
    )
    .expect("write config");

    let table = CategoryTable::load_or_default(Some(file.path())).expect("valid config");
    assert!(table.contains("rust"));
    assert!(table.contains("java"));
    assert_eq!(table.generic().port_var, "LS_PORT");

    let tracker = DocumentTracker::new(Arc::new(table));
    let event = tracker.open("Main.java").expect("java document");
    assert_eq!(event.category, "java");
    assert_eq!(tracker.current().len(), 1);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = CategoryTable::load_or_default(Some(dir.path().join("absent.toml")))
        .expect_err("missing file");
    assert!(format!("{:#}", err).contains("absent.toml"));
}
