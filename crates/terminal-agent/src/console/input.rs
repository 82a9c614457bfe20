//! Line input: an interactive editor for the binary, a scripted queue for tests and pipes.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or end of input.
    Eof,
}

pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<InputEvent>;
}

/// Replays a fixed list of events, then reports `Eof` forever.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| InputEvent::Line(l.into())))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<InputEvent> {
        self.prompts.push(prompt.to_string());
        Ok(self.events.pop_front().unwrap_or(InputEvent::Eof))
    }
}

#[cfg(feature = "cli")]
pub use editor::EditorInput;

#[cfg(feature = "cli")]
mod editor {
    use super::{InputEvent, LineSource};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// rustyline-backed prompt with in-memory history.
    pub struct EditorInput {
        editor: DefaultEditor,
    }

    impl EditorInput {
        pub fn new() -> anyhow::Result<Self> {
            Ok(Self {
                editor: DefaultEditor::new()?,
            })
        }
    }

    impl LineSource for EditorInput {
        fn read_line(&mut self, prompt: &str) -> anyhow::Result<InputEvent> {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    Ok(InputEvent::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
                Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
                Err(err) => Err(err.into()),
            }
        }
    }
}
