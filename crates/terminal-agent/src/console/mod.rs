//! User-facing terminal output. Diagnostics go through `tracing`, never here.
pub mod input;
pub mod prompt;

pub use input::{InputEvent, LineSource, ScriptedInput};
#[cfg(feature = "cli")]
pub use input::EditorInput;
pub use prompt::{ask_temperature, select_model};

use colored::{Color, Colorize};
use std::io::{self, Stdout, Write};

const RULE_WIDTH: usize = 60;

pub struct Console<W: Write> {
    out: W,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        self.out.flush()
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    /// A horizontal rule with a centred title.
    pub fn rule(&mut self, title: &str, color: Color) -> io::Result<()> {
        let title_len = title.chars().count() + 2;
        let side = RULE_WIDTH.saturating_sub(title_len) / 2;
        let bar = "─".repeat(side);
        writeln!(
            self.out,
            "{} {} {}",
            bar.color(color),
            title.color(color).bold(),
            bar.color(color)
        )?;
        self.out.flush()
    }

    pub fn welcome(&mut self) -> io::Result<()> {
        self.rule("AI Terminal Agent", Color::Blue)?;
        self.line("Welcome to your private terminal agent!".cyan().bold().to_string())?;
        self.line(
            "Type a message to chat, 'workflow: <task>' to plan with web search, 'exit' or 'quit' to leave."
                .bright_black()
                .to_string(),
        )?;
        self.blank()
    }

    /// Content framed in a box, sized to its widest line.
    pub fn panel(&mut self, title: &str, content: &str, color: Color) -> io::Result<()> {
        let lines: Vec<&str> = if content.is_empty() {
            vec![""]
        } else {
            content.lines().collect()
        };
        let title_len = title.chars().count();
        let width = lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(title_len + 2);

        let top = format!("╭─ {} {}╮", title, "─".repeat(width - title_len - 1));
        writeln!(self.out, "{}", top.color(color))?;
        for line in lines {
            let pad = width - line.chars().count();
            writeln!(
                self.out,
                "{} {}{} {}",
                "│".color(color),
                line,
                " ".repeat(pad),
                "│".color(color)
            )?;
        }
        let bottom = format!("╰{}╯", "─".repeat(width + 2));
        writeln!(self.out, "{}", bottom.color(color))?;
        self.out.flush()
    }

    pub fn assistant(&mut self, content: &str) -> io::Result<()> {
        self.panel("Assistant", content, Color::Cyan)
    }

    pub fn workflow_result(&mut self, content: &str) -> io::Result<()> {
        self.panel("Workflow Planner", content, Color::Magenta)
    }

    pub fn designing_workflow(&mut self) -> io::Result<()> {
        self.line("Designing Workflow...".cyan().bold().to_string())
    }

    pub fn remote_error(&mut self, status: u16, body: &str) -> io::Result<()> {
        self.line(format!("Error: {}", status).red().to_string())?;
        self.line(body)
    }

    pub fn elapsed(&mut self, millis: u128) -> io::Result<()> {
        self.line(
            format!("Total response time: {} ms", millis)
                .blue()
                .bold()
                .to_string(),
        )
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        self.line(text.yellow().to_string())
    }

    pub fn goodbye(&mut self) -> io::Result<()> {
        self.line("Goodbye!".red().bold().to_string())
    }

    pub fn session_ended(&mut self) -> io::Result<()> {
        self.blank()?;
        self.line("Session ended.".red().bold().to_string())
    }
}

#[cfg(test)]
pub(crate) fn rendered(console: Console<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).expect("console output is UTF-8")
}
