//! End-to-end state machine coverage: search → fetch → render state,
//! plus a full chat round-trip, with the network stubbed by wiremock.
//!
//! The test owns the receiving end of the event channel and pumps events
//! into the app by hand, standing in for the select! loop.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::timeout;

use booklens::config::AppConfig;
use booklens::core::gemini::GeminiClient;
use booklens::tui::app::{AppState, FETCH_ERROR_MESSAGE};
use booklens::tui::events::{AppEvent, LoadingState, PanelFocus};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn book_payload(title: &str) -> String {
    serde_json::json!({
        "title": title,
        "author": "Mara Voss",
        "synopsis": "A forensic pathologist returns to her island hometown.",
        "characters": [{"name": "Elin", "role": "Lead", "description": "..."}],
        "reviews": [{"source": "The Herald", "quote": "Chilling.", "rating": 5}],
        "themes": ["Inheritance"],
        "emotionalArc": [{"chapter": 1, "tension": 20}, {"chapter": 9, "tension": 95}]
    })
    .to_string()
}

fn candidate_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Build an app whose fetch/chat traffic goes to `server`, handing the
/// event-channel receiver back to the test.
fn app_for(server: &MockServer) -> (AppState, mpsc::UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = GeminiClient::new("test-key", "gemini-2.5-flash").with_base_url(server.uri());
    let services = booklens::tui::services::Services::new(client, tx);

    // The app's own receiver stays silent; the test pumps events itself.
    let (_unused_tx, unused_rx) = mpsc::unbounded_channel();
    let app = AppState::new(&AppConfig::default(), unused_rx, services);
    (app, rx)
}

async fn pump(app: &mut AppState, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
    let event = timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for backend event")
        .expect("event channel closed");
    app.handle_event(event);
}

fn key(app: &mut AppState, code: KeyCode) {
    app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
        code,
        KeyModifiers::NONE,
    ))));
}

fn type_str(app: &mut AppState, text: &str) {
    for c in text.chars() {
        key(app, KeyCode::Char(c));
    }
}

#[tokio::test]
async fn default_fetch_reaches_success_with_requested_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response(&book_payload("It's in the Blood"))),
        )
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);

    // App start: LOADING synchronously, before any network completion
    app.start_fetch("It's in the Blood".to_string());
    assert_eq!(app.status(), LoadingState::Loading);

    pump(&mut app, &mut rx).await;
    assert_eq!(app.status(), LoadingState::Success);
    assert_eq!(app.book().unwrap().title, "It's in the Blood");

    // Required fields all arrived non-empty
    let book = app.book().unwrap();
    assert!(!book.author.is_empty());
    assert!(!book.synopsis.is_empty());
    assert!(!book.characters.is_empty());
    assert!(!book.emotional_arc.is_empty());
}

#[tokio::test]
async fn failed_fetch_reaches_error_and_retry_recovers() {
    let server = MockServer::start().await;

    // First request fails, later ones succeed
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response(&book_payload("It's in the Blood"))),
        )
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);

    app.start_fetch("It's in the Blood".to_string());
    pump(&mut app, &mut rx).await;
    assert_eq!(app.status(), LoadingState::Error);
    assert_eq!(app.error_message(), Some(FETCH_ERROR_MESSAGE));
    assert!(app.book().is_none());

    // Retry ('r' from the error screen) re-issues the default query
    key(&mut app, KeyCode::Char('r'));
    assert_eq!(app.status(), LoadingState::Loading);
    pump(&mut app, &mut rx).await;
    assert_eq!(app.status(), LoadingState::Success);
}

#[tokio::test]
async fn search_submission_replaces_record_wholesale() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response(&book_payload("Second Book"))),
        )
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.start_fetch("first".to_string());
    pump(&mut app, &mut rx).await;

    // '/' focuses search; typed text + Enter submits
    key(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "Second Book");
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.status(), LoadingState::Loading);
    assert!(app.book().is_none());

    pump(&mut app, &mut rx).await;
    assert_eq!(app.book().unwrap().title, "Second Book");
    // Chat greeting references the newly bound title
    assert_eq!(app.chat().messages().len(), 1);
    assert!(app.chat().messages()[0].text.contains("Second Book"));
}

#[tokio::test]
async fn chat_round_trip_appends_user_and_model_messages() {
    let server = MockServer::start().await;

    // Content requests carry a generationConfig; chat turns carry a
    // systemInstruction. Match on that to serve both from one server.
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response(&book_payload("It's in the Blood"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({ "systemInstruction": {} })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_response("The sheriff, though he hides it well.")),
        )
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.start_fetch("It's in the Blood".to_string());
    pump(&mut app, &mut rx).await;
    assert_eq!(app.status(), LoadingState::Success);

    let transcript_before = app.chat().messages().len();

    // Tab → chat focus, i → insert mode, type, Enter → send
    key(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), PanelFocus::Chat);
    key(&mut app, KeyCode::Char('i'));
    type_str(&mut app, "Who is the villain?");
    key(&mut app, KeyCode::Enter);
    assert!(app.chat().is_typing());

    pump(&mut app, &mut rx).await;
    let messages = app.chat().messages();
    assert_eq!(messages.len(), transcript_before + 2);
    assert_eq!(messages[transcript_before].text, "Who is the villain?");
    assert!(!messages[transcript_before + 1].text.is_empty());
    assert!(!app.chat().is_typing());

    // Page-level state untouched by chat traffic
    assert_eq!(app.status(), LoadingState::Success);
}
