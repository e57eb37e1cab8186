//! End-to-end sessions over the real HTTP transport against a mock robot.

use std::sync::Arc;
use std::time::Duration;

use robolink_control::{ConnectionPhase, ControlStateMachine, DispatchOutcome};
use robolink_core::{Actuator, Endpoint, Sequence};
use robolink_transport::HttpTransportFactory;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": status }))
}

async fn robot() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/heartbeat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/is_moving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "connected": true,
            "moving": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stop"))
        .respond_with(ok("all stopped"))
        .mount(&server)
        .await;
    server
}

fn endpoint_of(server: &MockServer) -> Endpoint {
    let addr = server.address();
    Endpoint::new(addr.ip().to_string(), addr.port()).unwrap()
}

#[tokio::test]
async fn horn_on_off_carries_sequences_one_and_two() {
    let server = robot().await;
    Mock::given(method("GET"))
        .and(path("/horn/on"))
        .and(header("sequence", "1"))
        .respond_with(ok("horn ON"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/horn/off"))
        .and(header("sequence", "2"))
        .respond_with(ok("horn OFF"))
        .expect(1)
        .mount(&server)
        .await;

    let handle = ControlStateMachine::new(Arc::new(HttpTransportFactory::default())).spawn();
    let dispatcher = handle.dispatcher();
    handle.connect(endpoint_of(&server)).await.unwrap();

    let on = dispatcher.activate_actuator(Actuator::Horn).await;
    assert!(matches!(on, DispatchOutcome::Delivered(ref r) if r.status == "horn ON"));
    assert!(handle.snapshot().actuators.horn);

    let off = dispatcher.release_actuator(Actuator::Horn).await;
    assert!(off.is_delivered());

    let state = handle.snapshot();
    assert!(!state.actuators.horn);
    assert_eq!(state.last_sequence, Some(Sequence::new(2)));
    assert_eq!(state.phase, ConnectionPhase::Connected);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_command_enters_error() {
    let server = robot().await;
    Mock::given(method("GET"))
        .and(path("/forward/on"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = ControlStateMachine::new(Arc::new(HttpTransportFactory::default())).spawn();
    let endpoint = endpoint_of(&server);
    handle.connect(endpoint.clone()).await.unwrap();

    let outcome = handle
        .dispatcher()
        .press_direction(robolink_core::Direction::Forward)
        .await;

    assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    let state = handle.snapshot();
    assert_eq!(state.phase, ConnectionPhase::Error);
    assert_eq!(
        state.error_message,
        Some(format!("failed to reach {endpoint} while executing forward/on."))
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreachable_robot_is_reported_by_monitors() {
    // Reserve a free port, then release it so nothing is listening.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let handle = ControlStateMachine::new(Arc::new(HttpTransportFactory::default())).spawn();
    let mut updates = handle.subscribe();

    handle
        .connect(Endpoint::new("127.0.0.1", port).unwrap())
        .await
        .unwrap();

    let reached_error = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if updates.borrow_and_update().phase == ConnectionPhase::Error {
                break;
            }
            updates.changed().await.unwrap();
        }
    })
    .await;

    assert!(reached_error.is_ok());
    assert!(!handle.snapshot().connected);
    handle.shutdown().await.unwrap();
}
