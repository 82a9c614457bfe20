//! Interactive chat session
//!
//! One `Session` owns everything a run needs: the session id, the running
//! conversation, the transcript store, the completion backend and the
//! workflow planner. Turns are handled strictly one after another.
//!
//! ```text
//! AwaitingInput -> Dispatching -> Completing | Delegating -> Rendering -> AwaitingInput
//!               \-> Terminated (exit / quit / Ctrl-C / EOF)
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::console::{Console, InputEvent, LineSource};
use crate::error::CompletionError;
use crate::llm_client::CompletionBackend;
use crate::memory::{Conversation, Message, Role};
use crate::spinner::Spinner;
use crate::transcript_db::TranscriptStore;
use crate::workflow::WorkflowPlanner;

pub const WORKFLOW_PREFIX: &str = "workflow:";
pub const WORKFLOW_ERROR_PREFIX: &str = "[Error running workflow agent]";
const USER_PROMPT: &str = "You: ";
const SPINNER_LABEL: &str = "Thinking...";

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
}

/// What a single input line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    Workflow(&'a str),
    Chat(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let has_prefix = trimmed
            .get(..WORKFLOW_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(WORKFLOW_PREFIX));
        if has_prefix {
            return Command::Workflow(trimmed[WORKFLOW_PREFIX.len()..].trim());
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            return Command::Exit;
        }
        Command::Chat(trimmed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank line; nothing sent or stored.
    Ignored,
    Exit,
    Completed {
        reply: String,
        elapsed: Duration,
    },
    /// Non-success status. The user message stays in the conversation unanswered.
    RemoteFailure {
        status: u16,
        body: String,
        elapsed: Duration,
    },
    Workflow {
        content: String,
        failed: bool,
        elapsed: Duration,
    },
}

pub struct Session {
    session_id: String,
    conversation: Conversation,
    store: TranscriptStore,
    backend: Arc<dyn CompletionBackend>,
    planner: Arc<dyn WorkflowPlanner>,
    settings: ChatSettings,
}

impl Session {
    /// The session id is the one the store stamps on every row.
    pub fn new(
        store: TranscriptStore,
        backend: Arc<dyn CompletionBackend>,
        planner: Arc<dyn WorkflowPlanner>,
        system_prompt: impl Into<String>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            session_id: store.session_id().to_string(),
            conversation: Conversation::new(system_prompt),
            store,
            backend,
            planner,
            settings,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub async fn handle_input(&mut self, line: &str) -> anyhow::Result<TurnOutcome> {
        self.dispatch(Command::parse(line)).await
    }

    async fn dispatch(&mut self, command: Command<'_>) -> anyhow::Result<TurnOutcome> {
        match command {
            Command::Empty => Ok(TurnOutcome::Ignored),
            Command::Exit => Ok(TurnOutcome::Exit),
            Command::Workflow(task) => self.delegate(task).await,
            Command::Chat(text) => self.complete(text).await,
        }
    }

    async fn complete(&mut self, text: &str) -> anyhow::Result<TurnOutcome> {
        self.conversation.push(Message::user(text));
        self.store.append(Role::User, text)?;

        let started = Instant::now();
        let spinner = Spinner::start(SPINNER_LABEL);
        let result = self
            .backend
            .complete(
                self.conversation.messages(),
                &self.settings.model,
                self.settings.temperature,
            )
            .await;
        spinner.stop();
        let elapsed = started.elapsed();

        match result {
            Ok(reply) => {
                debug!("Completion took {} ms", elapsed.as_millis());
                self.conversation.push(Message::assistant(reply.clone()));
                self.store.append(Role::Assistant, &reply)?;
                Ok(TurnOutcome::Completed { reply, elapsed })
            }
            Err(CompletionError::Remote { status, body }) => {
                warn!("Completion failed with status {}; turn dropped", status);
                Ok(TurnOutcome::RemoteFailure {
                    status,
                    body,
                    elapsed,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Workflow turns never touch the conversation; only the result is stored.
    async fn delegate(&mut self, task: &str) -> anyhow::Result<TurnOutcome> {
        info!("Delegating workflow task ({} chars)", task.len());

        let started = Instant::now();
        let spinner = Spinner::start(SPINNER_LABEL);
        let result = self.planner.plan(task).await;
        spinner.stop();
        let elapsed = started.elapsed();

        let (content, failed) = match result {
            Ok(plan) => (plan, false),
            Err(e) => {
                warn!("Workflow planner failed: {}", e);
                (format!("{} {}", WORKFLOW_ERROR_PREFIX, e), true)
            }
        };
        self.store.append(Role::Assistant, &content)?;

        Ok(TurnOutcome::Workflow {
            content,
            failed,
            elapsed,
        })
    }

    /// Runs until exit, interrupt or a fatal error. The store is closed on every path.
    pub async fn run<W: Write>(
        mut self,
        input: &mut dyn LineSource,
        console: &mut Console<W>,
    ) -> anyhow::Result<()> {
        info!(
            "Session {} started with model {} (temperature {})",
            self.session_id, self.settings.model, self.settings.temperature
        );
        let result = self.run_loop(input, console).await;
        let turns = self
            .conversation
            .messages()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count();
        let closed = self.close();
        info!("Session ended after {} completed turn(s)", turns);

        match (result, closed) {
            (Err(e), Err(close_err)) => {
                warn!("Transcript store did not close: {}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), closed) => closed,
        }
    }

    async fn run_loop<W: Write>(
        &mut self,
        input: &mut dyn LineSource,
        console: &mut Console<W>,
    ) -> anyhow::Result<()> {
        loop {
            console.blank()?;
            let line = match input.read_line(USER_PROMPT)? {
                InputEvent::Line(line) => line,
                InputEvent::Interrupted | InputEvent::Eof => {
                    console.session_ended()?;
                    return Ok(());
                }
            };

            let command = Command::parse(&line);
            if matches!(command, Command::Workflow(_)) {
                console.designing_workflow()?;
            }

            match self.dispatch(command).await? {
                TurnOutcome::Ignored => continue,
                TurnOutcome::Exit => {
                    console.goodbye()?;
                    return Ok(());
                }
                outcome => render(console, &outcome)?,
            }
        }
    }

    pub fn close(self) -> anyhow::Result<()> {
        self.store.close()
    }
}

pub fn render<W: Write>(console: &mut Console<W>, outcome: &TurnOutcome) -> std::io::Result<()> {
    match outcome {
        TurnOutcome::Ignored | TurnOutcome::Exit => Ok(()),
        TurnOutcome::Completed { reply, elapsed } => {
            console.assistant(reply)?;
            console.elapsed(elapsed.as_millis())
        }
        TurnOutcome::RemoteFailure {
            status,
            body,
            elapsed,
        } => {
            console.remote_error(*status, body)?;
            console.elapsed(elapsed.as_millis())
        }
        TurnOutcome::Workflow {
            content, elapsed, ..
        } => {
            console.workflow_result(content)?;
            console.elapsed(elapsed.as_millis())
        }
    }
}
