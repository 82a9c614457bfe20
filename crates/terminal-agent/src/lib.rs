// terminal-agent/crates/terminal-agent/src/lib.rs

pub mod config;
pub mod console;
pub mod error;
pub mod llm_client;
pub mod memory;
pub mod session;
pub mod spinner;
pub mod telemetry;
pub mod transcript_db;
pub mod workflow;

// Public API exports
pub use config::Config;
pub use error::{CompletionError, DelegateError};
pub use llm_client::{CompletionBackend, HttpCompletionClient};
pub use memory::{Conversation, Message, Role};
pub use session::{ChatSettings, Session, TurnOutcome};
pub use transcript_db::{TranscriptRecord, TranscriptStore};
pub use workflow::{DuckDuckGoSearch, SearchPlanner, WorkflowPlanner};
