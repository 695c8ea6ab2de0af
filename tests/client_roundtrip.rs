//! Client against a live server
//!
//! Binds an ephemeral port, serves the API in the background and drives it
//! with [`AnalyticsClient`] over real HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use ragindex::client::{AnalyticsClient, ClientConfig, ClientError, EventFilters, EventMetadata};
use ragindex::http_server::{HttpServer, HttpServerConfig};
use ragindex::store::SqliteStore;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const KEY: &str = "roundtrip-key";

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    async fn start() -> Self {
        let config = HttpServerConfig {
            database_path: ":memory:".to_string(),
            clear_key: Some(KEY.to_string()),
            ..HttpServerConfig::default()
        };
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let server = HttpServer::with_store(config, store);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(listener, async {
                    let _ = signal.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_send_list_query_clear() {
    let server = RunningServer::start().await;
    let client = AnalyticsClient::new(ClientConfig::with_user_id(server.url(), "user-1"));

    let first = client
        .send_event("demo", "click", EventMetadata::default())
        .await
        .unwrap();
    assert!(first.success);

    let metadata = EventMetadata {
        timezone: Some("Europe/Rome".to_string()),
        url_params: Some(serde_json::json!({"ref": "home"})),
        ..Default::default()
    };
    let second = client.send_event("demo", "scroll", metadata).await.unwrap();
    assert!(second.id > first.id);

    let events = client.fetch_events(&EventFilters::default()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, second.id);
    assert_eq!(events[0].user_id, "user-1");
    assert_eq!(events[0].timezone.as_deref(), Some("Europe/Rome"));

    let filtered = client
        .fetch_events(&EventFilters {
            action_name: Some("click".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, first.id);

    let one = client.fetch_event(first.id).await.unwrap();
    assert_eq!(one.action_name, "click");

    let result = client
        .execute_query("SELECT COUNT(*) AS total FROM analytics")
        .await
        .unwrap();
    assert_eq!(result.results[0]["total"], 2);
    assert_eq!(result.meta.columns, vec!["total"]);

    let cleared = client.clear(KEY).await.unwrap();
    assert_eq!(cleared.deleted, 2);

    server.stop().await;
}

#[tokio::test]
async fn test_server_errors_carry_status_and_message() {
    let server = RunningServer::start().await;
    let client = AnalyticsClient::new(ClientConfig::new(server.url()));

    let err = client.clear("wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(matches!(err, ClientError::Server { ref message, .. } if message == "Unauthorized"));

    let err = client
        .execute_query("SELECT 1; DROP TABLE analytics")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));

    let err = client.fetch_event(12345).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Server { status: 404, ref message } if message == "Not found"
    ));

    server.stop().await;
}

#[tokio::test]
async fn test_clients_sharing_an_id_file_report_one_user() {
    let server = RunningServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let id_file = dir.path().join("user_id");

    for action in ["open", "close"] {
        let config = ClientConfig::with_user_id_file(server.url(), &id_file).unwrap();
        let client = AnalyticsClient::new(config);
        client
            .send_event("demo", action, EventMetadata::default())
            .await
            .unwrap();
    }

    let reader = AnalyticsClient::new(ClientConfig::new(server.url()));
    let events = reader.fetch_events(&EventFilters::default()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].user_id, events[1].user_id);

    let stored = std::fs::read_to_string(&id_file).unwrap();
    assert_eq!(stored.trim(), events[0].user_id);

    server.stop().await;
}
