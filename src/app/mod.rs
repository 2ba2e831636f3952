use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use regex::Regex;
use time::OffsetDateTime;

use crate::catalog::{self, CatalogError, CatalogSource, Club};
use crate::config::AppConfig;
use crate::highlight::build_highlight_regex;
use crate::search::Debouncer;
use crate::storage::{KeyValueStore, PersistError};
use crate::ui::{self, prompt::pop_grapheme, Chrome, TerminalPrompt};

pub mod interaction;
pub mod render;
pub mod state;

pub use interaction::{Interaction, LineInteraction, ScriptedInteraction};
pub use render::{CardView, FavoritesView, GridView, PaginationView, Screen};
pub use state::{ClubBrowser, NoteOrigin, Redraw, PAGE_SIZE};

/// Cards per grid row; vertical cursor moves jump by this much.
pub const GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
enum Action {
    Quit,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    PreviousPage,
    NextPage,
    ToggleFavorite,
    EditNote,
    DeleteNote,
    StartSearch,
    ToggleDrawer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Search,
    Favorites,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub at: OffsetDateTime,
}

pub struct App<S: KeyValueStore> {
    pub config: Arc<AppConfig>,
    browser: ClubBrowser<S>,
    screen: Screen,
    catalog_rx: Option<Receiver<Result<Vec<Club>, CatalogError>>>,
    image_base: Option<PathBuf>,
    focus: Focus,
    drawer_open: bool,
    card_cursor: usize,
    favorite_cursor: usize,
    search_input: String,
    page_entry: String,
    debouncer: Debouncer,
    highlight: Option<Regex>,
    status: Option<StatusMessage>,
    should_quit: bool,
    tick_rate: Duration,
}

impl<S: KeyValueStore> App<S> {
    /// Starts loading `source` in the background; the grid shows a loading state until it lands.
    pub fn new<C: CatalogSource>(config: Arc<AppConfig>, store: S, source: C) -> Self {
        let image_base = source.base_dir().map(|dir| dir.to_path_buf());
        let catalog_rx = catalog::spawn_loader(source);
        let mut app = Self::from_browser(config, ClubBrowser::new(store));
        app.catalog_rx = Some(catalog_rx);
        app.image_base = image_base;
        app
    }

    pub fn from_browser(config: Arc<AppConfig>, browser: ClubBrowser<S>) -> Self {
        let screen = Screen::describe(&browser);
        let debouncer = Debouncer::new(config.search.debounce_duration());
        let search_input = browser.query().to_string();
        let mut app = Self {
            config,
            browser,
            screen,
            catalog_rx: None,
            image_base: None,
            focus: Focus::Grid,
            drawer_open: false,
            card_cursor: 0,
            favorite_cursor: 0,
            search_input,
            page_entry: String::new(),
            debouncer,
            highlight: None,
            status: None,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        };
        app.refresh_highlight();
        app
    }

    pub fn browser(&self) -> &ClubBrowser<S> {
        &self.browser
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub fn card_cursor(&self) -> usize {
        self.card_cursor
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn chrome(&self) -> Chrome<'_> {
        Chrome {
            screen: &self.screen,
            focus: self.focus,
            drawer_open: self.drawer_open,
            card_cursor: self.card_cursor,
            favorite_cursor: self.favorite_cursor,
            search_input: &self.search_input,
            search_pending: self.debouncer.is_pending(),
            highlight: self.highlight.as_ref(),
            status: self.status.as_ref(),
        }
    }

    /// Picks up the catalog result and fires a due search.
    pub fn on_tick(&mut self, now: Instant) {
        self.poll_catalog();
        if self.debouncer.poll(now) {
            self.run_search();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, interaction: &mut dyn Interaction, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key, now),
            Focus::Favorites => self.handle_favorites_key(key, interaction),
            Focus::Grid => {
                if let Some(digit) = page_digit(key) {
                    self.enter_page_digit(digit);
                    return;
                }
                self.page_entry.clear();
                if let Some(action) = grid_action(key) {
                    self.handle_action(action, interaction);
                }
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Grid;
            }
            KeyCode::Enter => {
                self.debouncer.cancel();
                self.run_search();
                self.focus = Focus::Grid;
            }
            KeyCode::Backspace => {
                if pop_grapheme(&mut self.search_input) {
                    self.debouncer.schedule(now);
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if !self.search_input.is_empty() {
                    self.search_input.clear();
                    self.debouncer.schedule(now);
                }
            }
            KeyCode::Char(ch)
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                self.search_input.push(ch);
                self.debouncer.schedule(now);
            }
            _ => {}
        }
    }

    fn handle_favorites_key(&mut self, key: KeyEvent, interaction: &mut dyn Interaction) {
        let entries = self
            .screen
            .favorites
            .as_ref()
            .map(|view| view.entries().len())
            .unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('F') => self.close_drawer(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.favorite_cursor + 1 < entries {
                    self.favorite_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.favorite_cursor = self.favorite_cursor.saturating_sub(1);
            }
            KeyCode::Char('e') | KeyCode::Char('n') => {
                let Some(name) = self.selected_favorite() else {
                    return;
                };
                let result = self
                    .browser
                    .edit_note(&name, NoteOrigin::FavoritesPanel, interaction);
                self.finish(result, || format!("Note saved for {name}"));
            }
            KeyCode::Char('d') | KeyCode::Char('x') => {
                let Some(name) = self.selected_favorite() else {
                    return;
                };
                let result = self.browser.remove_favorite(&name, interaction);
                self.finish(result, || format!("Removed {name} from favorites"));
            }
            _ => {}
        }
    }

    fn handle_action(&mut self, action: Action, interaction: &mut dyn Interaction) {
        tracing::trace!(%action, "grid action");
        match action {
            Action::Quit => self.should_quit = true,
            Action::CursorLeft => self.move_cursor(-1),
            Action::CursorRight => self.move_cursor(1),
            Action::CursorUp => self.move_cursor(-(GRID_COLUMNS as isize)),
            Action::CursorDown => self.move_cursor(GRID_COLUMNS as isize),
            Action::PreviousPage => {
                let redraw = self.browser.previous_page();
                self.apply_page_change(redraw);
            }
            Action::NextPage => {
                let redraw = self.browser.next_page();
                self.apply_page_change(redraw);
            }
            Action::ToggleFavorite => {
                let Some(name) = self.selected_card().map(|card| card.name.clone()) else {
                    return;
                };
                let result = self.browser.toggle_favorite(&name);
                let now_favorite = self.browser.favorites().contains(&name);
                self.finish(result, || {
                    if now_favorite {
                        format!("Added {name} to favorites")
                    } else {
                        format!("Removed {name} from favorites")
                    }
                });
            }
            Action::EditNote => {
                let Some(name) = self.selected_card().map(|card| card.name.clone()) else {
                    return;
                };
                let result = self.browser.edit_note(&name, NoteOrigin::Grid, interaction);
                self.finish(result, || format!("Note saved for {name}"));
            }
            Action::DeleteNote => {
                let Some(card) = self.selected_card() else {
                    return;
                };
                if !card.shows_delete_note() {
                    return;
                }
                let name = card.name.clone();
                let result = self.browser.delete_note(&name, interaction);
                self.finish(result, || format!("Deleted note for {name}"));
            }
            Action::StartSearch => {
                if self.browser.is_ready() {
                    self.focus = Focus::Search;
                }
            }
            Action::ToggleDrawer => {
                if self.drawer_open {
                    self.close_drawer();
                } else if self.browser.is_ready() {
                    self.drawer_open = true;
                    self.focus = Focus::Favorites;
                    self.clamp_cursors();
                }
            }
        }
    }

    /// Digits typed back to back build one page number; a digit that would
    /// overshoot the last page starts a new number instead.
    fn enter_page_digit(&mut self, digit: char) {
        let page_count = self.browser.page_count();
        let valid = |entry: &str| {
            entry
                .parse::<usize>()
                .ok()
                .filter(|page| (1..=page_count).contains(page))
        };
        self.page_entry.push(digit);
        let mut target = valid(&self.page_entry);
        if target.is_none() {
            self.page_entry = digit.to_string();
            target = valid(&self.page_entry);
        }
        match target {
            Some(page) => self.jump_to_page(page),
            None => self.page_entry.clear(),
        }
    }

    fn jump_to_page(&mut self, page: usize) {
        tracing::trace!(page, "page entry");
        let redraw = self.browser.go_to_page(page);
        self.apply_page_change(redraw);
    }

    fn finish<F>(&mut self, result: Result<Redraw, PersistError>, message: F)
    where
        F: FnOnce() -> String,
    {
        match result {
            Ok(redraw) if redraw.is_empty() => {}
            Ok(redraw) => {
                self.apply_redraw(redraw);
                self.set_status(message());
            }
            Err(err) => {
                tracing::error!(%err, "failed to persist change");
                self.apply_redraw(Redraw::all());
                self.set_status(format!("Not saved: {err}"));
            }
        }
    }

    fn apply_page_change(&mut self, redraw: Redraw) {
        if redraw.is_empty() {
            return;
        }
        self.card_cursor = 0;
        self.apply_redraw(redraw);
    }

    fn apply_redraw(&mut self, redraw: Redraw) {
        self.screen.refresh(&self.browser, redraw);
        self.clamp_cursors();
    }

    fn run_search(&mut self) {
        let redraw = self.browser.apply_search(&self.search_input);
        self.card_cursor = 0;
        self.refresh_highlight();
        self.apply_redraw(redraw);
    }

    fn refresh_highlight(&mut self) {
        self.highlight = if self.config.search.highlight_matches {
            build_highlight_regex(self.browser.query())
        } else {
            None
        };
    }

    fn poll_catalog(&mut self) {
        let Some(rx) = self.catalog_rx.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(CatalogError::Disconnected),
        };
        self.catalog_rx = None;
        if let Ok(clubs) = &result {
            if self.config.catalog.prefetch_images {
                let _prefetch = catalog::prefetch_images(clubs, self.image_base.as_deref());
            }
        }
        let redraw = self.browser.install_catalog(result);
        self.apply_redraw(redraw);
    }

    fn close_drawer(&mut self) {
        self.drawer_open = false;
        self.focus = Focus::Grid;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.screen.cards().len() as isize;
        if len == 0 {
            return;
        }
        let next = self.card_cursor as isize + delta;
        if (0..len).contains(&next) {
            self.card_cursor = next as usize;
        }
    }

    fn clamp_cursors(&mut self) {
        let cards = self.screen.cards().len();
        self.card_cursor = self.card_cursor.min(cards.saturating_sub(1));
        let favorites = self
            .screen
            .favorites
            .as_ref()
            .map(|view| view.entries().len())
            .unwrap_or(0);
        self.favorite_cursor = self.favorite_cursor.min(favorites.saturating_sub(1));
    }

    fn selected_card(&self) -> Option<&CardView> {
        self.screen.cards().get(self.card_cursor)
    }

    fn selected_favorite(&self) -> Option<String> {
        self.screen
            .favorites
            .as_ref()?
            .entries()
            .get(self.favorite_cursor)
            .map(|entry| entry.name.clone())
    }

    fn set_status(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            at: OffsetDateTime::now_utc(),
        });
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            let backdrop = terminal
                .draw(|frame| ui::draw_app(frame, &self.chrome()))
                .context("rendering frame")?
                .buffer
                .clone();

            if self.should_quit {
                break;
            }

            let timeout = self
                .debouncer
                .remaining(Instant::now())
                .map_or(self.tick_rate, |left| left.min(self.tick_rate));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => {
                        let mut prompt = TerminalPrompt::new(terminal, &backdrop);
                        self.handle_key(key, &mut prompt, Instant::now());
                    }
                    Event::Resize(_, _) => {
                        // next draw picks up the new size
                    }
                    _ => {}
                }
            }

            self.on_tick(Instant::now());
        }
        Ok(())
    }
}

fn page_digit(key: KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(ch @ '0'..='9') => Some(ch),
        _ => None,
    }
}

fn grid_action(key: KeyEvent) -> Option<Action> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('h') | KeyCode::Left => Action::CursorLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::CursorRight,
        KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
        KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
        KeyCode::Char('[') | KeyCode::PageUp => Action::PreviousPage,
        KeyCode::Char(']') | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('f') | KeyCode::Char(' ') => Action::ToggleFavorite,
        KeyCode::Char('n') => Action::EditNote,
        KeyCode::Char('x') => Action::DeleteNote,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Tab | KeyCode::Char('F') => Action::ToggleDrawer,
        _ => return None,
    };
    Some(action)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("restoring screen state")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, FAVORITES_KEY, NOTES_KEY};

    struct InstantCatalog(Vec<Club>);

    impl CatalogSource for InstantCatalog {
        fn load(&self) -> Result<Vec<Club>, CatalogError> {
            Ok(self.0.clone())
        }
    }

    fn lettered(names: &str) -> Vec<Club> {
        names
            .chars()
            .map(|ch| Club::new(ch.to_string(), format!("Club {ch}"), String::new()))
            .collect()
    }

    fn app_with(store: MemoryStore, names: &str) -> App<MemoryStore> {
        let mut browser = ClubBrowser::new(store);
        browser.install_catalog(Ok(lettered(names)));
        App::from_browser(Arc::new(AppConfig::default()), browser)
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode, now: Instant) {
        let mut none = ScriptedInteraction::new();
        app.handle_key(KeyEvent::from(code), &mut none, now);
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str, now: Instant) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch), now);
        }
    }

    #[test]
    fn catalog_arrives_through_the_loader_channel() {
        let store = MemoryStore::new();
        let config = AppConfig::default();
        assert!(config.catalog.prefetch_images);
        let mut app = App::new(Arc::new(config), store, InstantCatalog(lettered("ABC")));
        assert_eq!(app.screen().grid, GridView::Loading);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.screen().grid == GridView::Loading && Instant::now() < deadline {
            app.on_tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.screen().cards().len(), 3);
        assert!(app.screen().pagination.is_some());
    }

    #[test]
    fn typing_debounces_search_until_quiet() {
        let mut app = app_with(MemoryStore::new(), "ABCDEFGH");
        let start = Instant::now();
        press(&mut app, KeyCode::Char('/'), start);
        assert_eq!(app.focus(), Focus::Search);

        type_text(&mut app, "g", start);
        app.on_tick(start + Duration::from_millis(100));
        assert_eq!(app.browser().query(), "");

        type_text(&mut app, "h", start + Duration::from_millis(200));
        app.on_tick(start + Duration::from_millis(300));
        assert_eq!(app.browser().query(), "");

        app.on_tick(start + Duration::from_millis(450));
        assert_eq!(app.browser().query(), "gh");
        assert!(app.screen().cards().is_empty());
    }

    #[test]
    fn enter_searches_immediately_and_cancels_the_pending_run() {
        let mut app = app_with(MemoryStore::new(), "ABCDEFGH");
        let start = Instant::now();
        press(&mut app, KeyCode::Char(']'), start);
        assert_eq!(app.browser().current_page(), 2);

        press(&mut app, KeyCode::Char('/'), start);
        type_text(&mut app, "b", start);
        press(&mut app, KeyCode::Enter, start);
        assert_eq!(app.focus(), Focus::Grid);
        assert_eq!(app.browser().query(), "b");
        assert_eq!(app.browser().current_page(), 1);
        assert_eq!(app.screen().cards().len(), 1);
        assert!(!app.chrome().search_pending);
    }

    #[test]
    fn favorite_key_toggles_the_selected_card() {
        let store = MemoryStore::new();
        let mut app = app_with(store.clone(), "ABCDEFGH");
        let now = Instant::now();
        press(&mut app, KeyCode::Right, now);
        press(&mut app, KeyCode::Char('f'), now);

        assert_eq!(store.raw(FAVORITES_KEY).as_deref(), Some(r#"["B"]"#));
        assert!(app.screen().cards()[1].favorite);
        assert_eq!(app.status_message(), Some("Added B to favorites"));
        assert_eq!(
            app.screen().favorites.as_ref().map(|view| view.entries().len()),
            Some(1)
        );
    }

    #[test]
    fn note_keys_go_through_the_interaction() {
        let store = MemoryStore::new();
        let mut app = app_with(store.clone(), "ABC");
        let now = Instant::now();
        let mut answers = ScriptedInteraction::new()
            .with_text("Great club")
            .with_confirmation(true);

        app.handle_key(KeyEvent::from(KeyCode::Char('n')), &mut answers, now);
        assert_eq!(store.raw(NOTES_KEY).as_deref(), Some(r#"{"A":"Great club"}"#));
        assert!(app.screen().cards()[0].shows_delete_note());

        app.handle_key(KeyEvent::from(KeyCode::Char('x')), &mut answers, now);
        assert_eq!(store.raw(NOTES_KEY).as_deref(), Some("{}"));
        assert_eq!(
            answers.prompts(),
            ["Add a note for A:", "Delete your note for A?"]
        );
    }

    #[test]
    fn delete_note_needs_a_visible_note() {
        let store = MemoryStore::new();
        let mut app = app_with(store.clone(), "ABC");
        let mut answers = ScriptedInteraction::new().with_confirmation(true);
        app.handle_key(KeyEvent::from(KeyCode::Char('x')), &mut answers, Instant::now());
        assert!(answers.prompts().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn drawer_removes_favorites_after_confirmation() {
        let store = MemoryStore::new().with_value(FAVORITES_KEY, r#"["C","A"]"#);
        let mut app = app_with(store.clone(), "ABC");
        let now = Instant::now();
        press(&mut app, KeyCode::Tab, now);
        assert!(app.is_drawer_open());
        assert_eq!(app.focus(), Focus::Favorites);

        press(&mut app, KeyCode::Down, now);
        let mut confirm = ScriptedInteraction::new().with_confirmation(true);
        app.handle_key(KeyEvent::from(KeyCode::Char('d')), &mut confirm, now);
        assert_eq!(confirm.prompts(), ["Remove A from favorites?"]);
        assert_eq!(store.raw(FAVORITES_KEY).as_deref(), Some(r#"["C"]"#));
        assert!(!app.screen().cards()[0].favorite);

        press(&mut app, KeyCode::Esc, now);
        assert!(!app.is_drawer_open());
        assert_eq!(app.focus(), Focus::Grid);
    }

    #[test]
    fn failed_write_reports_status_and_keeps_change() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut app = app_with(store, "AB");
        press(&mut app, KeyCode::Char('f'), Instant::now());
        assert!(app.browser().favorites().contains("A"));
        assert!(app
            .status_message()
            .is_some_and(|message| message.starts_with("Not saved")));
    }

    #[test]
    fn page_keys_reset_cursor_and_ignore_out_of_range() {
        let mut app = app_with(MemoryStore::new(), "ABCDEFGH");
        let now = Instant::now();
        press(&mut app, KeyCode::Down, now);
        assert_eq!(app.card_cursor(), 3);
        press(&mut app, KeyCode::Char('2'), now);
        assert_eq!(app.browser().current_page(), 2);
        assert_eq!(app.card_cursor(), 0);
        press(&mut app, KeyCode::Char('9'), now);
        assert_eq!(app.browser().current_page(), 2);
        press(&mut app, KeyCode::Char('['), now);
        assert_eq!(app.browser().current_page(), 1);
        press(&mut app, KeyCode::Char('q'), now);
        assert!(app.should_quit());
    }

    #[test]
    fn consecutive_digits_reach_double_digit_pages() {
        let clubs: Vec<Club> = (1..=60)
            .map(|i| Club::new(format!("Club {i:02}"), "", ""))
            .collect();
        let mut browser = ClubBrowser::new(MemoryStore::new());
        browser.install_catalog(Ok(clubs));
        let mut app = App::from_browser(Arc::new(AppConfig::default()), browser);
        let now = Instant::now();
        assert_eq!(app.browser().page_count(), 10);

        press(&mut app, KeyCode::Char('1'), now);
        press(&mut app, KeyCode::Char('0'), now);
        assert_eq!(app.browser().current_page(), 10);
        assert_eq!(app.screen().cards()[0].name, "Club 55");
        let pagination = app.screen().pagination.as_ref().expect("pagination");
        assert!(pagination.pages[9].active);

        press(&mut app, KeyCode::Char('3'), now);
        assert_eq!(app.browser().current_page(), 3);

        press(&mut app, KeyCode::Char(']'), now);
        press(&mut app, KeyCode::Char('0'), now);
        assert_eq!(app.browser().current_page(), 4);
    }

    #[test]
    fn pending_search_waits_out_a_note_prompt() {
        let store = MemoryStore::new();
        let mut app = app_with(store.clone(), "ABCDEFGH");
        let start = Instant::now();
        press(&mut app, KeyCode::Char(']'), start);
        assert_eq!(app.browser().current_page(), 2);

        press(&mut app, KeyCode::Char('/'), start);
        type_text(&mut app, "b", start);
        press(&mut app, KeyCode::Esc, start);
        assert!(app.chrome().search_pending);

        let mut answers = ScriptedInteraction::new().with_text("Great club");
        let mid = start + Duration::from_millis(100);
        app.handle_key(KeyEvent::from(KeyCode::Char('n')), &mut answers, mid);
        assert_eq!(answers.prompts(), ["Add a note for G:"]);
        assert_eq!(app.browser().query(), "");

        app.on_tick(start + Duration::from_millis(300));
        assert_eq!(store.raw(NOTES_KEY).as_deref(), Some(r#"{"G":"Great club"}"#));
        assert_eq!(app.browser().query(), "b");
        assert_eq!(app.browser().current_page(), 1);
        assert_eq!(app.screen().cards().len(), 1);
    }
}
