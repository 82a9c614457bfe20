//! End-to-end turns against a mock completion endpoint and an on-disk transcript.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use terminal_agent::console::{Console, ScriptedInput};
use terminal_agent::session::{new_session_id, ChatSettings, Session, TurnOutcome};
use terminal_agent::{
    DelegateError, HttpCompletionClient, Message, TranscriptStore, WorkflowPlanner,
};

const HI_THERE: &str = r#"{"choices":[{"message":{"content":"hi there"}}]}"#;

struct FailingPlanner;

#[async_trait]
impl WorkflowPlanner for FailingPlanner {
    async fn plan(&self, _task: &str) -> Result<String, DelegateError> {
        Err(DelegateError::Planner("timeout".to_string()))
    }
}

fn session(url: String, store: TranscriptStore) -> Session {
    Session::new(
        store,
        Arc::new(HttpCompletionClient::new(url, "Bearer test-key")),
        Arc::new(FailingPlanner),
        "you are a powerful assistant",
        ChatSettings {
            model: "mistral-small".to_string(),
            temperature: 1.0,
        },
    )
}

#[tokio::test]
async fn hello_round_trip_persists_two_rows() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(HI_THERE)
        .create_async()
        .await;

    let store = TranscriptStore::open_in_memory(new_session_id()).unwrap();
    let mut session = session(format!("{}/v1/chat/completions", server.url()), store);

    let outcome = session.handle_input("hello").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Completed { .. }));
    assert_eq!(
        session.conversation().messages(),
        &[
            Message::system("you are a powerful assistant"),
            Message::user("hello"),
            Message::assistant("hi there"),
        ]
    );
    assert_eq!(session.store().count().unwrap(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_keeps_only_the_user_row() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .with_body("server error")
        .create_async()
        .await;

    let store = TranscriptStore::open_in_memory(new_session_id()).unwrap();
    let mut session = session(server.url(), store);

    let outcome = session.handle_input("hello").await.unwrap();
    assert!(matches!(
        outcome,
        TurnOutcome::RemoteFailure { status: 500, ref body, .. } if body == "server error"
    ));
    assert_eq!(session.conversation().len(), 2);

    let records = session
        .store()
        .records_for_session(session.session_id())
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].role, "user");
}

#[tokio::test]
async fn full_run_writes_ordered_rows_for_one_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(HI_THERE)
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("chat_history.db");
    let session_id = new_session_id();
    let store = TranscriptStore::open(&db_path, session_id.clone()).unwrap();

    let mut input = ScriptedInput::from_lines([
        "hello",
        "workflow: find today's weather",
        "and tomorrow?",
        "exit",
    ]);
    let mut console = Console::new(Vec::new());
    session(server.url(), store)
        .run(&mut input, &mut console)
        .await
        .unwrap();

    let output = String::from_utf8(console.into_inner()).unwrap();
    assert!(output.contains("timeout"));
    assert!(output.contains("Goodbye!"));

    // The run closed its store; reopen and inspect what it left behind.
    let reopened = TranscriptStore::open(&db_path, new_session_id()).unwrap();
    let records = reopened.records_for_session(&session_id).unwrap();
    let roles: Vec<&str> = records.iter().map(|r| r.role.as_str()).collect();
    assert_eq!(roles, vec!["user", "assistant", "assistant", "user", "assistant"]);
    assert!(records[2].message.contains("timeout"));

    for pair in records.windows(2) {
        assert!(pair[0].id < pair[1].id);
        let earlier = DateTime::parse_from_rfc3339(&pair[0].timestamp).unwrap();
        let later = DateTime::parse_from_rfc3339(&pair[1].timestamp).unwrap();
        assert!(earlier <= later);
    }
    assert!(records.iter().all(|r| r.session_id == session_id));
    assert_eq!(reopened.count().unwrap(), 5);
}

#[tokio::test]
async fn exit_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("chat_history.db");
    let store = TranscriptStore::open(&db_path, new_session_id()).unwrap();

    let mut input = ScriptedInput::from_lines(["EXIT"]);
    let mut console = Console::new(Vec::new());
    session("http://127.0.0.1:9".to_string(), store)
        .run(&mut input, &mut console)
        .await
        .unwrap();

    let reopened = TranscriptStore::open(&db_path, new_session_id()).unwrap();
    assert_eq!(reopened.count().unwrap(), 0);
}
