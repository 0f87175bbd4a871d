use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};
use vidnavigator::{ClientBuilder, FileResponse, VidNavigatorError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Counts "client released" events.
#[derive(Clone, Default)]
struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for ReleaseCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.0 == "client released" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn not_found_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/f_1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "missing" })))
        .mount(&server)
        .await;
    server
}

async fn fetch_then_close(server: &MockServer) -> vidnavigator::Result<FileResponse> {
    let client = ClientBuilder::new()
        .api_key("vn_test_key")
        .base_url(server.uri())
        .build()?;
    let file = client.get_file("f_1").await?;
    client.close();
    Ok(file)
}

#[tokio::test]
async fn released_once_when_call_fails_inside_scope() {
    let counter = ReleaseCounter::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(counter.clone()));
    let server = not_found_server().await;

    let result = fetch_then_close(&server).await;

    assert!(matches!(result, Err(VidNavigatorError::NotFound { .. })));
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn explicit_close_releases_once() {
    let counter = ReleaseCounter::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(counter.clone()));
    let server = MockServer::start().await;

    let client = ClientBuilder::new()
        .api_key("vn_test_key")
        .base_url(server.uri())
        .build()
        .unwrap();
    assert_eq!(counter.count(), 0);

    client.close();
    assert_eq!(counter.count(), 1);
}
