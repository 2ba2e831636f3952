use bitflags::bitflags;

use crate::app::interaction::Interaction;
use crate::catalog::{CatalogError, Club};
use crate::search::NameQuery;
use crate::storage::{
    load_favorites, load_notes, save_favorites, save_notes, KeyValueStore, PersistError,
};

pub use crate::storage::{Favorites, Notes};

pub const PAGE_SIZE: usize = 6;

bitflags! {
    /// Screen regions an action invalidated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Redraw: u8 {
        const GRID = 0b001;
        const PAGINATION = 0b010;
        const FAVORITES = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NoteOrigin {
    Grid,
    FavoritesPanel,
}

#[derive(Debug, Clone)]
pub enum CatalogState {
    Loading,
    Ready(Vec<Club>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    pub items: Vec<&'a Club>,
    pub page: usize,
    pub page_count: usize,
    pub filtered_count: usize,
}

pub fn page_count(filtered_count: usize) -> usize {
    filtered_count.div_ceil(PAGE_SIZE)
}

/// Keeps a stored page inside `1..=max(page_count, 1)`.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

fn filter_clubs<'a>(clubs: &'a [Club], query: &str) -> Vec<&'a Club> {
    let query = NameQuery::parse(query);
    clubs
        .iter()
        .filter(|club| query.matches(&club.name))
        .collect()
}

/// Slices `[(page - 1) * PAGE_SIZE, page * PAGE_SIZE)` out of the clubs matching `query`.
///
/// A page past the end yields no items. Page 0 is read as page 1.
pub fn compute_view<'a>(clubs: &'a [Club], query: &str, page: usize) -> PageView<'a> {
    let filtered = filter_clubs(clubs, query);
    let filtered_count = filtered.len();
    let page = page.max(1);
    let items = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    PageView {
        items,
        page,
        page_count: page_count(filtered_count),
        filtered_count,
    }
}

/// Owns the catalog, both persisted collections and the view state.
///
/// Every mutating action writes through to the store before returning the
/// regions that need redrawing. A failed write leaves the in-memory state
/// changed and reports the error.
pub struct ClubBrowser<S> {
    store: S,
    catalog: CatalogState,
    favorites: Favorites,
    notes: Notes,
    view: ViewState,
}

impl<S: KeyValueStore> ClubBrowser<S> {
    pub fn new(store: S) -> Self {
        let favorites = load_favorites(&store);
        let notes = load_notes(&store);
        tracing::debug!(
            favorites = favorites.len(),
            notes = notes.len(),
            "restored persisted collections"
        );
        Self {
            store,
            catalog: CatalogState::Loading,
            favorites,
            notes,
            view: ViewState::default(),
        }
    }

    /// Accepts the first catalog load result; later ones are ignored.
    pub fn install_catalog(&mut self, result: Result<Vec<Club>, CatalogError>) -> Redraw {
        if !matches!(self.catalog, CatalogState::Loading) {
            tracing::warn!("catalog already installed, ignoring another load result");
            return Redraw::empty();
        }
        self.catalog = match result {
            Ok(clubs) => CatalogState::Ready(clubs),
            Err(err) => {
                tracing::error!(%err, "catalog load failed");
                CatalogState::Failed(err.to_string())
            }
        };
        self.reclamp();
        Redraw::all()
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.catalog, CatalogState::Ready(_))
    }

    pub fn clubs(&self) -> &[Club] {
        match &self.catalog {
            CatalogState::Ready(clubs) => clubs,
            _ => &[],
        }
    }

    pub fn find_club(&self, name: &str) -> Option<&Club> {
        self.clubs().iter().find(|club| club.name == name)
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    pub fn query(&self) -> &str {
        &self.view.query
    }

    pub fn current_page(&self) -> usize {
        self.view.current_page
    }

    /// The stored page, clamped to the current result set.
    pub fn current_view(&self) -> PageView<'_> {
        let matching = filter_clubs(self.clubs(), &self.view.query).len();
        let page = clamp_page(self.view.current_page, page_count(matching));
        compute_view(self.clubs(), &self.view.query, page)
    }

    pub fn page_count(&self) -> usize {
        self.current_view().page_count
    }

    pub fn toggle_favorite(&mut self, name: &str) -> Result<Redraw, PersistError> {
        let now_favorite = self.favorites.toggle(name);
        tracing::debug!(club = name, favorite = now_favorite, "favorite toggled");
        save_favorites(&self.store, &self.favorites)?;
        Ok(Redraw::all())
    }

    pub fn edit_note(
        &mut self,
        name: &str,
        origin: NoteOrigin,
        interaction: &mut dyn Interaction,
    ) -> Result<Redraw, PersistError> {
        let prompt = match origin {
            NoteOrigin::Grid => format!("Add a note for {name}:"),
            NoteOrigin::FavoritesPanel => format!("Edit your note for {name}:"),
        };
        let current = self.notes.get(name).unwrap_or_default().to_string();
        let Some(text) = interaction.request_text(&prompt, &current) else {
            tracing::debug!(club = name, %origin, "note edit cancelled");
            return Ok(Redraw::empty());
        };
        self.notes.set(name, text.trim().to_string());
        tracing::debug!(club = name, %origin, "note saved");
        let mut redraw = Redraw::GRID;
        if origin == NoteOrigin::FavoritesPanel || self.favorites.contains(name) {
            redraw |= Redraw::FAVORITES;
        }
        save_notes(&self.store, &self.notes)?;
        Ok(redraw)
    }

    pub fn delete_note(
        &mut self,
        name: &str,
        interaction: &mut dyn Interaction,
    ) -> Result<Redraw, PersistError> {
        if !interaction.request_confirmation(&format!("Delete your note for {name}?")) {
            return Ok(Redraw::empty());
        }
        if !self.notes.remove(name) {
            return Ok(Redraw::empty());
        }
        tracing::debug!(club = name, "note deleted");
        let mut redraw = Redraw::GRID;
        if self.favorites.contains(name) {
            redraw |= Redraw::FAVORITES;
        }
        save_notes(&self.store, &self.notes)?;
        Ok(redraw)
    }

    /// Drops `name` from favorites after confirmation. Its note is kept.
    pub fn remove_favorite(
        &mut self,
        name: &str,
        interaction: &mut dyn Interaction,
    ) -> Result<Redraw, PersistError> {
        if !interaction.request_confirmation(&format!("Remove {name} from favorites?")) {
            return Ok(Redraw::empty());
        }
        if !self.favorites.remove(name) {
            return Ok(Redraw::empty());
        }
        tracing::debug!(club = name, "favorite removed");
        save_favorites(&self.store, &self.favorites)?;
        Ok(Redraw::FAVORITES | Redraw::GRID)
    }

    pub fn go_to_page(&mut self, page: usize) -> Redraw {
        let page_count = self.page_count();
        if page == 0 || page > page_count || page == self.view.current_page {
            return Redraw::empty();
        }
        self.view.current_page = page;
        Redraw::GRID | Redraw::PAGINATION
    }

    pub fn previous_page(&mut self) -> Redraw {
        match self.view.current_page.checked_sub(1) {
            Some(page) if page >= 1 => self.go_to_page(page),
            _ => Redraw::empty(),
        }
    }

    pub fn next_page(&mut self) -> Redraw {
        self.go_to_page(self.view.current_page + 1)
    }

    /// Filters the full catalog by `query` and returns to page 1.
    pub fn apply_search(&mut self, query: &str) -> Redraw {
        self.view.query = query.trim().to_string();
        self.view.current_page = 1;
        tracing::debug!(
            query = %self.view.query,
            matches = self.current_view().filtered_count,
            "search applied"
        );
        Redraw::GRID | Redraw::PAGINATION
    }

    fn reclamp(&mut self) {
        self.view.current_page = self.current_view().page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::interaction::ScriptedInteraction;
    use crate::storage::{MemoryStore, FAVORITES_KEY, NOTES_KEY};

    fn lettered(names: &str) -> Vec<Club> {
        names
            .chars()
            .map(|ch| Club::new(ch.to_string(), format!("Club {ch}"), format!("{ch}.png")))
            .collect()
    }

    fn browser_with(clubs: Vec<Club>, store: MemoryStore) -> ClubBrowser<MemoryStore> {
        let mut browser = ClubBrowser::new(store);
        browser.install_catalog(Ok(clubs));
        browser
    }

    fn names(view: &PageView<'_>) -> Vec<String> {
        view.items.iter().map(|club| club.name.clone()).collect()
    }

    #[test]
    fn page_sizes_follow_the_remaining_item_count() {
        for len in [0usize, 1, 5, 6, 7, 12, 13, 20] {
            let clubs: Vec<Club> = (0..len)
                .map(|i| Club::new(format!("club-{i}"), "", ""))
                .collect();
            let pages = page_count(len);
            for page in 1..=pages + 2 {
                let view = compute_view(&clubs, "", page);
                let expected = PAGE_SIZE.min(len.saturating_sub(PAGE_SIZE * (page - 1)));
                assert_eq!(view.items.len(), expected, "len {len} page {page}");
            }
        }
    }

    #[test]
    fn eight_clubs_span_two_pages() {
        let clubs = lettered("ABCDEFGH");
        let first = compute_view(&clubs, "", 1);
        assert_eq!(names(&first), vec!["A", "B", "C", "D", "E", "F"]);
        assert_eq!(first.page_count, 2);

        let second = compute_view(&clubs, "", 2);
        assert_eq!(names(&second), vec!["G", "H"]);
        assert_eq!(second.filtered_count, 8);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let clubs = lettered("ABCDEFGH");
        for page in [3, 4] {
            let view = compute_view(&clubs, "", page);
            assert!(view.items.is_empty(), "page {page}");
            assert_eq!(view.page, page);
            assert_eq!(view.page_count, 2);
        }
        assert_eq!(names(&compute_view(&clubs, "", 0)), names(&compute_view(&clubs, "", 1)));
    }

    #[test]
    fn stored_page_is_clamped_into_range() {
        assert_eq!(clamp_page(9, 2), 2);
        assert_eq!(clamp_page(0, 2), 1);
        assert_eq!(clamp_page(3, 0), 1);

        let mut browser = ClubBrowser::new(MemoryStore::new());
        browser.view.current_page = 9;
        browser.install_catalog(Ok(lettered("ABCDEFGH")));
        assert_eq!(browser.current_page(), 2);
        assert_eq!(names(&browser.current_view()), vec!["G", "H"]);

        browser.view.query = "z".into();
        let none = browser.current_view();
        assert_eq!(none.page, 1);
        assert_eq!(none.page_count, 0);
        assert!(none.items.is_empty());
    }

    #[test]
    fn toggling_twice_restores_membership_and_writes_twice() {
        let store = MemoryStore::new();
        let mut browser = browser_with(lettered("ABC"), store.clone());

        assert_eq!(browser.toggle_favorite("B").expect("toggle"), Redraw::all());
        assert!(browser.favorites().contains("B"));
        browser.toggle_favorite("B").expect("toggle");
        assert!(!browser.favorites().contains("B"));
        assert!(browser.favorites().is_empty());
        assert_eq!(store.writes(), 2);
        assert_eq!(store.raw(FAVORITES_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn adding_a_note_persists_trimmed_text() {
        let store = MemoryStore::new();
        let mut browser = browser_with(lettered("ABCDEFGH"), store.clone());
        let mut interaction = ScriptedInteraction::new().with_text("  Great club  ");

        let redraw = browser
            .edit_note("C", NoteOrigin::Grid, &mut interaction)
            .expect("edit");
        assert_eq!(redraw, Redraw::GRID);
        assert_eq!(interaction.prompts(), ["Add a note for C:"]);
        assert_eq!(interaction.defaults(), [""]);
        insta::assert_snapshot!(store.raw(NOTES_KEY).unwrap_or_default(), @r#"{"C":"Great club"}"#);
    }

    #[test]
    fn cancelled_note_prompt_writes_nothing() {
        let store = MemoryStore::new();
        let mut browser = browser_with(lettered("AB"), store.clone());
        let mut interaction = ScriptedInteraction::new().with_cancel();

        let redraw = browser
            .edit_note("A", NoteOrigin::Grid, &mut interaction)
            .expect("edit");
        assert!(redraw.is_empty());
        assert!(browser.notes().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn empty_note_keeps_its_key() {
        let store = MemoryStore::new();
        let mut browser = browser_with(lettered("AB"), store.clone());
        let mut interaction = ScriptedInteraction::new().with_text("   ");

        browser
            .edit_note("A", NoteOrigin::Grid, &mut interaction)
            .expect("edit");
        assert_eq!(browser.notes().get("A"), Some(""));
        assert_eq!(store.raw(NOTES_KEY).as_deref(), Some(r#"{"A":""}"#));
    }

    #[test]
    fn deleted_note_is_gone_and_readding_starts_blank() {
        let store = MemoryStore::new().with_value(NOTES_KEY, r#"{"A":"old text"}"#);
        let mut browser = browser_with(lettered("AB"), store.clone());

        let mut confirm = ScriptedInteraction::new().with_confirmation(true);
        assert_eq!(browser.delete_note("A", &mut confirm).expect("delete"), Redraw::GRID);
        assert_eq!(confirm.prompts(), ["Delete your note for A?"]);
        assert!(!browser.notes().contains("A"));
        assert_eq!(store.raw(NOTES_KEY).as_deref(), Some("{}"));

        let mut readd = ScriptedInteraction::new().with_text("new");
        browser
            .edit_note("A", NoteOrigin::Grid, &mut readd)
            .expect("edit");
        assert_eq!(readd.defaults(), [""]);
    }

    #[test]
    fn rejected_confirmations_are_no_ops() {
        let store = MemoryStore::new()
            .with_value(NOTES_KEY, r#"{"A":"keep"}"#)
            .with_value(FAVORITES_KEY, r#"["A"]"#);
        let mut browser = browser_with(lettered("AB"), store.clone());
        let mut reject = ScriptedInteraction::new()
            .with_confirmation(false)
            .with_confirmation(false);

        assert!(browser.delete_note("A", &mut reject).expect("delete").is_empty());
        assert!(browser.remove_favorite("A", &mut reject).expect("remove").is_empty());
        assert_eq!(browser.notes().get("A"), Some("keep"));
        assert!(browser.favorites().contains("A"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn removing_a_favorite_keeps_its_note() {
        let store = MemoryStore::new()
            .with_value(NOTES_KEY, r#"{"B":"bring shoes"}"#)
            .with_value(FAVORITES_KEY, r#"["A","B"]"#);
        let mut browser = browser_with(lettered("AB"), store.clone());
        let mut confirm = ScriptedInteraction::new().with_confirmation(true);

        let redraw = browser.remove_favorite("B", &mut confirm).expect("remove");
        assert_eq!(redraw, Redraw::FAVORITES | Redraw::GRID);
        assert_eq!(confirm.prompts(), ["Remove B from favorites?"]);
        assert_eq!(store.raw(FAVORITES_KEY).as_deref(), Some(r#"["A"]"#));
        assert_eq!(browser.notes().get("B"), Some("bring shoes"));
    }

    #[test]
    fn panel_note_edits_redraw_the_panel_too() {
        let store = MemoryStore::new().with_value(NOTES_KEY, r#"{"A":"first"}"#);
        let mut browser = browser_with(lettered("AB"), store);
        let mut interaction = ScriptedInteraction::new().with_text("second");

        let redraw = browser
            .edit_note("A", NoteOrigin::FavoritesPanel, &mut interaction)
            .expect("edit");
        assert_eq!(redraw, Redraw::GRID | Redraw::FAVORITES);
        assert_eq!(interaction.prompts(), ["Edit your note for A:"]);
        assert_eq!(interaction.defaults(), ["first"]);
    }

    #[test]
    fn search_counts_pages_and_resets_to_first_page() {
        let mut clubs = lettered("ABCDEFGH");
        clubs.extend((0..7).map(|i| Club::new(format!("Chess {i}"), "", "")));
        let mut browser = browser_with(clubs, MemoryStore::new());
        browser.go_to_page(3);
        assert_eq!(browser.current_page(), 3);

        let redraw = browser.apply_search("  CHESS ");
        assert_eq!(redraw, Redraw::GRID | Redraw::PAGINATION);
        assert_eq!(browser.current_page(), 1);
        let view = browser.current_view();
        assert_eq!(view.filtered_count, 7);
        assert_eq!(view.page_count, 2);

        browser.apply_search("");
        assert_eq!(browser.current_view().filtered_count, 15);
    }

    #[test]
    fn searches_are_never_cumulative() {
        let mut browser = browser_with(lettered("ABCDEFGH"), MemoryStore::new());
        browser.apply_search("a");
        assert_eq!(browser.current_view().filtered_count, 1);
        browser.apply_search("h");
        assert_eq!(names(&browser.current_view()), vec!["H"]);
    }

    #[test]
    fn page_navigation_is_guarded_at_the_edges() {
        let mut browser = browser_with(lettered("ABCDEFGH"), MemoryStore::new());
        assert!(browser.previous_page().is_empty());
        assert_eq!(browser.next_page(), Redraw::GRID | Redraw::PAGINATION);
        assert_eq!(browser.current_page(), 2);
        assert!(browser.next_page().is_empty());
        assert!(browser.go_to_page(2).is_empty());
        assert!(browser.go_to_page(7).is_empty());
        assert!(browser.go_to_page(0).is_empty());
        assert_eq!(browser.previous_page(), Redraw::GRID | Redraw::PAGINATION);
        assert_eq!(browser.current_page(), 1);

        browser.apply_search("z");
        assert!(browser.next_page().is_empty());
        assert!(browser.previous_page().is_empty());
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut browser = browser_with(lettered("AB"), store.clone());

        let err = browser.toggle_favorite("A").expect_err("write fails");
        assert!(matches!(err, PersistError::Write { key: FAVORITES_KEY, .. }));
        assert!(browser.favorites().contains("A"));
        assert_eq!(store.raw(FAVORITES_KEY), None);
    }

    #[test]
    fn catalog_is_installed_only_once() {
        let mut browser = ClubBrowser::new(MemoryStore::new());
        assert!(!browser.is_ready());
        assert_eq!(browser.install_catalog(Ok(lettered("AB"))), Redraw::all());
        assert!(browser
            .install_catalog(Ok(lettered("XYZ")))
            .is_empty());
        assert_eq!(browser.clubs().len(), 2);
        assert!(browser.find_club("B").is_some());
        assert!(browser.find_club("X").is_none());
    }

    #[test]
    fn failed_catalog_leaves_nothing_to_browse() {
        let mut browser = ClubBrowser::new(MemoryStore::new());
        browser.install_catalog(Err(CatalogError::Disconnected));
        assert!(matches!(
            browser.catalog(),
            CatalogState::Failed(message) if message.contains("stopped")
        ));
        assert!(browser.clubs().is_empty());
        assert_eq!(browser.page_count(), 0);
    }
}
