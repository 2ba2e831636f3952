use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Blocking, modal questions put to the user while an action runs.
pub trait Interaction {
    /// `None` means the user cancelled.
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String>;
    fn request_confirmation(&mut self, prompt: &str) -> bool;
}

/// Answers from a fixed script, recording every prompt it was shown.
///
/// An exhausted script cancels text prompts and rejects confirmations.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInteraction {
    texts: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    prompts: Vec<String>,
    defaults: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.texts.push_back(Some(text.into()));
        self
    }

    pub fn with_cancel(mut self) -> Self {
        self.texts.push_back(None);
        self
    }

    pub fn with_confirmation(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Defaults offered to text prompts, in order.
    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }
}

impl Interaction for ScriptedInteraction {
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.defaults.push(default.to_string());
        self.texts.pop_front().flatten()
    }

    fn request_confirmation(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }
}

/// Line-oriented prompts for the non-interactive CLI.
///
/// A blank answer keeps the offered default; a lone `-` answers with an empty string.
pub struct LineInteraction<R, W> {
    input: R,
    output: W,
}

impl LineInteraction<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineInteraction<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, label: &str) -> Option<String> {
        if let Err(err) = write!(self.output, "{label} ").and_then(|_| self.output.flush()) {
            tracing::warn!(?err, "failed to write prompt");
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                tracing::warn!(?err, "failed to read prompt answer");
                None
            }
        }
    }
}

/// Typed at a text prompt to answer with nothing instead of keeping the default.
pub const CLEAR_ANSWER: &str = "-";

impl<R: BufRead, W: Write> Interaction for LineInteraction<R, W> {
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String> {
        let label = if default.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt} [{default}] ('{CLEAR_ANSWER}' clears)")
        };
        let answer = self.ask(&label)?;
        if answer.trim() == CLEAR_ANSWER {
            Some(String::new())
        } else if answer.is_empty() && !default.is_empty() {
            Some(default.to_string())
        } else {
            Some(answer)
        }
    }

    fn request_confirmation(&mut self, prompt: &str) -> bool {
        self.ask(&format!("{prompt} [y/N]"))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }
}
