//! Startup prompts: model choice and sampling temperature.

use colored::Colorize;
use std::io::Write;

use crate::config::{Config, MODEL_SLOTS, TEMPERATURE_RANGE};
use crate::console::{Console, InputEvent, LineSource};

/// Shows the numbered model menu and asks until a configured slot is chosen.
/// `None` when the user interrupts or input ends.
pub fn select_model<W: Write>(
    console: &mut Console<W>,
    input: &mut dyn LineSource,
    config: &Config,
) -> anyhow::Result<Option<String>> {
    console.line("Select a model to use:".yellow().bold().to_string())?;
    for (idx, model) in config.models.iter().enumerate() {
        let label = match model {
            Some(name) => name.clone(),
            None => "(not configured)".bright_black().to_string(),
        };
        console.line(format!("{}. {}", idx + 1, label))?;
    }
    console.blank()?;

    let prompt = format!("Enter model number (1-{}): ", MODEL_SLOTS);
    loop {
        let line = match input.read_line(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Interrupted | InputEvent::Eof => return Ok(None),
        };
        let choice = line.trim().parse::<usize>().ok();
        match choice.and_then(|c| config.model(c)) {
            Some(model) => return Ok(Some(model.to_string())),
            None => console.warning(&format!(
                "Please select one of the configured models (1-{})",
                MODEL_SLOTS
            ))?,
        }
    }
}

/// Asks for a temperature; blank input takes `default`.
pub fn ask_temperature<W: Write>(
    console: &mut Console<W>,
    input: &mut dyn LineSource,
    default: f32,
) -> anyhow::Result<Option<f32>> {
    let prompt = format!("Enter temperature (or leave blank) [{}]: ", default);
    loop {
        let line = match input.read_line(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Interrupted | InputEvent::Eof => return Ok(None),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Some(default));
        }
        match trimmed.parse::<f32>() {
            Ok(value) if TEMPERATURE_RANGE.contains(&value) => return Ok(Some(value)),
            _ => console.warning(&format!(
                "Temperature must be a number between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ))?,
        }
    }
}
