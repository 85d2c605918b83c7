mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use session_transport::{Error, SessionTransport, TeardownHook, TransportConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{capture_logs, drain_logs};

#[tokio::test]
async fn failed_refresh_rejects_all_callers_and_tears_down_once() {
    let server = MockServer::start().await;

    for route in ["/projects", "/customers", "/resources"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("invalid session")
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let teardowns = Arc::new(AtomicUsize::new(0));
    let hook = {
        let teardowns = teardowns.clone();
        Arc::new(move || {
            teardowns.fetch_add(1, Ordering::SeqCst);
        }) as TeardownHook
    };
    let transport =
        SessionTransport::with_teardown(TransportConfig::from_values(server.uri()), hook)
            .expect("transport construction should succeed");
    transport.token_holder().set("T1").await;

    let (lines, guard) = capture_logs();
    let (a, b, c) = tokio::join!(
        transport.get("/projects"),
        transport.get("/customers"),
        transport.get("/resources"),
    );
    drop(guard);

    for result in [a, b, c] {
        match result {
            Err(Error::SessionExpired(reason)) => {
                assert!(
                    reason.contains("invalid session"),
                    "reason should carry the backend message, got '{}'",
                    reason
                );
            }
            Err(other) => panic!("expected Error::SessionExpired, got {}", other),
            Ok(resp) => panic!("expected Error::SessionExpired, got status {}", resp.status()),
        }
    }

    assert_eq!(
        transport.token_holder().get().await,
        None,
        "token must be dropped after a failed refresh"
    );
    assert_eq!(
        teardowns.load(Ordering::SeqCst),
        1,
        "teardown hook must fire exactly once for the whole cycle"
    );

    let logs = drain_logs(&lines);
    let failure_events = logs
        .iter()
        .filter(|line| line.contains("refresh.failure"))
        .count();
    assert_eq!(failure_events, 1, "got {:?}", logs);
    assert!(
        logs.iter().any(|line| line.contains("session.teardown")),
        "expected teardown event, got {:?}",
        logs
    );
}

#[tokio::test]
async fn failure_without_hook_still_clears_the_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid session"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = SessionTransport::new(TransportConfig::from_values(server.uri()))
        .expect("transport construction should succeed");
    transport.token_holder().set("T1").await;

    let result = transport.get("/projects").await;
    assert!(matches!(result, Err(Error::SessionExpired(_))));
    assert_eq!(transport.token_holder().get().await, None);
}
