//! End-to-end session flows against a mock backend: startup hydration,
//! greeting, command dispatch, and the always-on poll loops.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vigil::capability::{CapabilityProbe, FixedCapabilities, HardwarePort};
use vigil::history::Sender;
use vigil::speech::SpeechSynth;
use vigil::test_utils::{RecordingView, ScriptedHardware, ScriptedSynth};
use vigil::view::{HudView, NullView};
use vigil::{BackendClient, HudConfig, HudSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREETING: &str = "Systems initialized. Welcome back, Sir.";

/// Poll quickly so tests observe loop behavior without real-time waits.
fn fast_config() -> HudConfig {
    HudConfig {
        stats_interval_ms: 50,
        notifications_interval_ms: 25,
        ..HudConfig::default()
    }
}

/// Mount empty defaults for the endpoints the poll loops hit immediately.
async fn mount_quiet_polls(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/system"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn start_session(
    server: &MockServer,
    view: Arc<dyn HudView>,
    synth: Arc<ScriptedSynth>,
    hardware: Arc<ScriptedHardware>,
) -> HudSession {
    let backend = Arc::new(BackendClient::with_base_url(format!(
        "{}/api",
        server.uri()
    )));
    HudSession::start_with_backend(
        fast_config(),
        backend,
        view,
        Arc::new(FixedCapabilities::all()) as Arc<dyn CapabilityProbe>,
        hardware as Arc<dyn HardwarePort>,
        Some(synth as Arc<dyn SpeechSynth>),
    )
    .await
    .expect("session starts")
}

#[tokio::test]
async fn hydration_seeds_the_transcript_and_greets() {
    let server = MockServer::start().await;
    mount_quiet_polls(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sender": "user", "text": "good morning", "timestamp": "08:00:01"},
            {"sender": "assistant", "text": "Good morning, Sir.", "timestamp": "08:00:02"}
        ])))
        .mount(&server)
        .await;

    let view = Arc::new(RecordingView::default());
    let synth = Arc::new(ScriptedSynth::new());
    let session = start_session(
        &server,
        Arc::clone(&view) as Arc<dyn HudView>,
        Arc::clone(&synth),
        Arc::new(ScriptedHardware::new()),
    )
    .await;

    let history = session.history_snapshot();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text, "good morning");
    assert_eq!(history[1].sender, Sender::Assistant);

    // Hydrated messages replay to the view, then the greeting lands —
    // shown and spoken, but never persisted.
    let messages = view.messages();
    assert_eq!(messages[0], "good morning");
    assert_eq!(messages[1], "Good morning, Sir.");
    assert_eq!(messages[2], GREETING);
    assert!(!history.iter().any(|m| m.text == GREETING));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(synth.started(), vec![GREETING]);
}

#[tokio::test]
async fn failed_hydration_starts_an_empty_session() {
    let server = MockServer::start().await;
    mount_quiet_polls(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let view = Arc::new(RecordingView::default());
    let session = start_session(
        &server,
        Arc::clone(&view) as Arc<dyn HudView>,
        Arc::new(ScriptedSynth::new()),
        Arc::new(ScriptedHardware::new()),
    )
    .await;

    assert!(session.history_snapshot().is_empty());
    // No error surfaces to the user; the greeting is the first message.
    assert_eq!(view.messages(), vec![GREETING]);
}

#[tokio::test]
async fn chat_reply_with_action_lands_in_history_and_opens_the_camera() {
    let server = MockServer::start().await;
    mount_quiet_polls(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "Online, Sir.", "action": "open_camera"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let view = Arc::new(RecordingView::default());
    let synth = Arc::new(ScriptedSynth::new());
    let hardware = Arc::new(ScriptedHardware::new());
    let session = start_session(
        &server,
        Arc::clone(&view) as Arc<dyn HudView>,
        Arc::clone(&synth),
        Arc::clone(&hardware),
    )
    .await;

    session.dispatch("bring systems online").await;

    let history = session.history_snapshot();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].text, "bring systems online");
    assert_eq!(history[1].sender, Sender::Assistant);
    assert_eq!(history[1].text, "Online, Sir.");

    assert!(hardware.calls().contains(&"open_camera".to_owned()));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(synth.started().contains(&"Online, Sir.".to_owned()));
}

#[tokio::test]
async fn scan_command_never_reaches_the_chat_endpoint() {
    let server = MockServer::start().await;
    mount_quiet_polls(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let hardware = Arc::new(ScriptedHardware::new());
    let session = start_session(
        &server,
        Arc::new(NullView),
        Arc::new(ScriptedSynth::new()),
        Arc::clone(&hardware),
    )
    .await;

    session.dispatch("Scan the room for intruders").await;

    let history = session.history_snapshot();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "Scan the room for intruders");
    assert_eq!(hardware.calls(), vec!["open_camera"]);
}

#[tokio::test]
async fn notification_display_list_stays_bounded_across_ticks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let payload: Vec<serde_json::Value> = (0..7)
        .map(|i| json!({"app": "mail", "title": format!("msg{i}"), "body": "b"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let session = start_session(
        &server,
        Arc::new(NullView),
        Arc::new(ScriptedSynth::new()),
        Arc::new(ScriptedHardware::new()),
    )
    .await;

    // Several 25ms notification ticks, each delivering 7 items.
    tokio::time::sleep(Duration::from_millis(150)).await;

    let titles: Vec<String> = session
        .notifications_snapshot()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles.len(), 5, "display list is trimmed to 5");
    assert_eq!(titles, vec!["msg6", "msg5", "msg4", "msg3", "msg2"]);
}
