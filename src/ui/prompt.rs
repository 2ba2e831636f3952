use std::io::Stdout;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use unicode_segmentation::UnicodeSegmentation;

use crate::app::Interaction;

use super::centered_rect;

/// Longest note the prompt accepts.
const MAX_INPUT_CHARS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Text,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Text(String),
    Cancelled,
    Confirmed(bool),
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub kind: PromptKind,
    pub message: String,
    pub input: String,
}

impl PromptState {
    pub fn text(message: &str, default: &str) -> Self {
        Self {
            kind: PromptKind::Text,
            message: message.to_string(),
            input: default.to_string(),
        }
    }

    pub fn confirm(message: &str) -> Self {
        Self {
            kind: PromptKind::Confirm,
            message: message.to_string(),
            input: String::new(),
        }
    }

    /// Feeds one key; returns the answer once the prompt is dismissed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptAnswer> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match self.kind {
            PromptKind::Text => match key.code {
                KeyCode::Esc => Some(PromptAnswer::Cancelled),
                KeyCode::Enter => Some(PromptAnswer::Text(self.input.clone())),
                KeyCode::Backspace => {
                    pop_grapheme(&mut self.input);
                    None
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.input.clear();
                    None
                }
                KeyCode::Char(ch)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    if self.input.chars().count() < MAX_INPUT_CHARS {
                        self.input.push(ch);
                    }
                    None
                }
                _ => None,
            },
            PromptKind::Confirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Some(PromptAnswer::Confirmed(true))
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Some(PromptAnswer::Confirmed(false))
                }
                _ => None,
            },
        }
    }
}

/// Removes the last user-perceived character; false when `text` was empty.
pub fn pop_grapheme(text: &mut String) -> bool {
    match text.grapheme_indices(true).next_back() {
        Some((idx, _)) => {
            text.truncate(idx);
            true
        }
        None => false,
    }
}

pub fn draw_prompt(frame: &mut Frame, prompt: &PromptState) {
    let area = centered_rect(60, 30, frame.size());
    frame.render_widget(Clear, area);
    let (title, body, hint) = match prompt.kind {
        PromptKind::Text => {
            let mut input = prompt.input.clone();
            input.push('▌');
            ("Note", Line::from(input), "Enter to save • Esc to cancel")
        }
        PromptKind::Confirm => (
            "Confirm",
            Line::from(Span::styled(
                "[y]es / [n]o",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            "y or Enter to confirm • n or Esc to keep",
        ),
    };
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            prompt.message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        body,
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    ])
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Modal prompts drawn over the last rendered frame.
///
/// Runs its own read loop, so nothing else (including a pending search)
/// is processed until the prompt is dismissed.
pub struct TerminalPrompt<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
    backdrop: &'a Buffer,
}

impl<'a> TerminalPrompt<'a> {
    pub fn new(
        terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
        backdrop: &'a Buffer,
    ) -> Self {
        Self { terminal, backdrop }
    }

    fn run(&mut self, mut prompt: PromptState) -> PromptAnswer {
        loop {
            let backdrop = self.backdrop;
            let drawn = self.terminal.draw(|frame| {
                frame.buffer_mut().merge(backdrop);
                draw_prompt(frame, &prompt);
            });
            if let Err(err) = drawn {
                tracing::error!(?err, "failed to draw prompt");
                return PromptAnswer::Cancelled;
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(answer) = prompt.handle_key(key) {
                        return answer;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(?err, "failed to read prompt input");
                    return PromptAnswer::Cancelled;
                }
            }
        }
    }
}

impl Interaction for TerminalPrompt<'_> {
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String> {
        match self.run(PromptState::text(prompt, default)) {
            PromptAnswer::Text(text) => Some(text),
            _ => None,
        }
    }

    fn request_confirmation(&mut self, prompt: &str) -> bool {
        matches!(
            self.run(PromptState::confirm(prompt)),
            PromptAnswer::Confirmed(true)
        )
    }
}
