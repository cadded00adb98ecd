//! End-to-end tests against a live listener.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use webhook_receiver::config::EndpointConfig;
use webhook_receiver::http::{ServerError, WebhookServer};
use webhook_receiver::WebhookConfig;

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.task.await.unwrap().unwrap();
    }
}

async fn start(config: &WebhookConfig) -> RunningServer {
    let server = WebhookServer::new(config).unwrap();
    assert!(!server.is_https());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(server.run(listener, async move {
        let _ = rx.await;
    }));

    RunningServer { addr, shutdown, task }
}

fn two_endpoint_config() -> WebhookConfig {
    WebhookConfig {
        endpoints: vec![
            EndpointConfig {
                name: "local".into(),
                path: "/local".into(),
                allowed_sources: vec!["127.0.0.1".into()],
            },
            EndpointConfig {
                name: "private".into(),
                path: "/private".into(),
                allowed_sources: vec!["10.0.0.0/8".into()],
            },
        ],
        ..WebhookConfig::default()
    }
}

#[tokio::test]
async fn test_live_post_is_acknowledged() {
    let server = start(&two_endpoint_config()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/local"))
        .json(&serde_json::json!({"alert": "disk full"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok", "endpoint": "local"}));

    server.stop().await;
}

#[tokio::test]
async fn test_live_rejections() {
    let server = start(&two_endpoint_config()).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/local")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.text().await.unwrap(), "Only POST allowed");

    let response = client
        .post(server.url("/private"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    let response = client
        .post(server.url("/missing"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_live_body_cap() {
    let config = WebhookConfig {
        max_body_bytes: 32,
        ..WebhookConfig::default()
    };
    let server = start(&config).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/webhook"))
        .body(vec![b'x'; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);

    server.stop().await;
}

#[test]
fn test_invalid_port_is_rejected_at_construction() {
    let config = WebhookConfig {
        port: "not-a-port".into(),
        ..WebhookConfig::default()
    };
    assert!(matches!(
        WebhookServer::new(&config),
        Err(ServerError::InvalidPort(port)) if port == "not-a-port"
    ));
}

#[test]
fn test_server_binds_all_interfaces_on_port() {
    let config = WebhookConfig {
        port: "9321".into(),
        ..WebhookConfig::default()
    };
    let server = WebhookServer::new(&config).unwrap();
    assert_eq!(server.address(), "0.0.0.0:9321".parse().unwrap());
    assert_eq!(server.endpoint_count(), 1);
}

#[tokio::test]
async fn test_https_with_missing_certificate_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = WebhookConfig {
        https_enabled: true,
        tls_cert_file: Some(dir.path().join("cert.pem")),
        tls_key_file: Some(dir.path().join("key.pem")),
        ..WebhookConfig::default()
    };
    let server = WebhookServer::new(&config).unwrap();
    assert!(server.is_https());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let err = server
        .run(listener, std::future::pending::<()>())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServerError::Tls(webhook_receiver::net::TlsError::MissingCertificate(_))
    ));
}
