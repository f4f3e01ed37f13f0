//! End-to-end tests: exporter built from configuration, talking HTTP to a mock
//! ingestion endpoint and queueing on a temporary disk

use courier::config::{CourierConfig, ExporterConfig, StorageConfig};
use courier::core::export::Exporter;
use courier::core::schedule::DrainOutcome;
use courier::domain::{Batch, Envelope, ExportError, ExportResult};
use tempfile::TempDir;

fn config_for(endpoint: &str, storage: &TempDir) -> CourierConfig {
    CourierConfig {
        application: Default::default(),
        exporter: ExporterConfig {
            instrumentation_key: "ikey-http".to_string(),
            endpoint_url: endpoint.to_string(),
            timeout_seconds: 5,
            retry_interval_ms: 60_000,
            ..Default::default()
        },
        storage: StorageConfig {
            path: storage.path().to_path_buf(),
            ..Default::default()
        },
        logging: Default::default(),
    }
}

fn sample_batch() -> Batch {
    Batch::new(vec![
        Envelope::new("Microsoft.ApplicationInsights.Event")
            .with_instrumentation_key("ikey-http")
            .with_base_type("EventData")
            .with_property("attempt", 1i64),
        Envelope::new("Microsoft.ApplicationInsights.Event")
            .with_instrumentation_key("ikey-http")
            .with_base_type("EventData")
            .with_property("attempt", 2i64),
    ])
}

#[tokio::test]
async fn test_unavailable_endpoint_queues_then_drains() {
    let storage = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;

    let unavailable = server
        .mock("POST", "/v2.1/track")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let exporter = Exporter::from_config(&config_for(&server.url(), &storage)).unwrap();
    assert!(exporter.export(sample_batch()).await.is_success());
    unavailable.assert_async().await;
    assert_eq!(exporter.queue().stats().await.unwrap().records, 1);

    let accepted = server
        .mock("POST", "/v2.1/track")
        .with_status(200)
        .with_body(r#"{"itemsReceived":2,"itemsAccepted":2,"errors":[]}"#)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(
        exporter.scheduler().drain_once().await.unwrap(),
        DrainOutcome::Delivered { envelopes: 2 }
    );
    accepted.assert_async().await;
    assert_eq!(exporter.queue().stats().await.unwrap().records, 0);

    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_redirect_is_followed_to_new_endpoint() {
    let storage = TempDir::new().unwrap();
    let mut old = mockito::Server::new_async().await;
    let mut new = mockito::Server::new_async().await;

    let moved = old
        .mock("POST", "/v2.1/track")
        .with_status(307)
        .with_header("location", &format!("{}/v2.1/track", new.url()))
        .expect(1)
        .create_async()
        .await;
    let accepted = new
        .mock("POST", "/v2.1/track")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let exporter = Exporter::from_config(&config_for(&old.url(), &storage)).unwrap();

    assert!(exporter.export(sample_batch()).await.is_success());
    // The endpoint stays moved for later exports
    assert!(exporter.export(sample_batch()).await.is_success());

    moved.assert_async().await;
    accepted.assert_async().await;
    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bad_request_is_dropped() {
    let storage = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2.1/track")
        .with_status(400)
        .create_async()
        .await;

    let exporter = Exporter::from_config(&config_for(&server.url(), &storage)).unwrap();
    let result = exporter.export(sample_batch()).await;

    assert_eq!(
        result,
        ExportResult::Failed(ExportError::NonRetriable { status: 400 })
    );
    assert_eq!(exporter.queue().stats().await.unwrap().records, 0);
}

#[test]
fn test_invalid_instrumentation_key_is_a_configuration_error() {
    let storage = TempDir::new().unwrap();
    let mut config = config_for("https://dc.example.com", &storage);
    config.exporter.instrumentation_key = "has space".to_string();

    assert!(Exporter::from_config(&config).is_err());
}
