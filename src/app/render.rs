//! Pure descriptions of what each screen region shows.
//!
//! Nothing here touches the terminal; `ui` turns these into widgets and the
//! CLI prints them.

use crate::app::state::{CatalogState, ClubBrowser, Redraw};
use crate::storage::KeyValueStore;

pub const FAVORITE_ON_LABEL: &str = "♥ Favorited";
pub const FAVORITE_OFF_LABEL: &str = "♡ Add to Favorites";
pub const ADD_NOTE_LABEL: &str = "Add Note";
pub const EDIT_NOTE_LABEL: &str = "Edit Note";
pub const DELETE_NOTE_LABEL: &str = "Delete Note";
pub const NO_FAVORITES_PLACEHOLDER: &str = "No favorites yet.";
pub const CATALOG_FAILED_MESSAGE: &str = "Failed to load clubs.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub name: String,
    pub description: String,
    pub image: String,
    pub favorite: bool,
    pub note: Option<String>,
}

impl CardView {
    pub fn favorite_label(&self) -> &'static str {
        if self.favorite {
            FAVORITE_ON_LABEL
        } else {
            FAVORITE_OFF_LABEL
        }
    }

    pub fn note_label(&self) -> &'static str {
        if self.note.is_some() {
            EDIT_NOTE_LABEL
        } else {
            ADD_NOTE_LABEL
        }
    }

    pub fn shows_delete_note(&self) -> bool {
        self.note.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridView {
    Loading,
    Failed { reason: String },
    Cards(Vec<CardView>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub pages: Vec<PageButton>,
    pub current: usize,
    pub page_count: usize,
    pub filtered_count: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub name: String,
    pub image: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesView {
    Placeholder,
    Entries(Vec<FavoriteEntry>),
}

impl FavoritesView {
    pub fn entries(&self) -> &[FavoriteEntry] {
        match self {
            FavoritesView::Entries(entries) => entries,
            FavoritesView::Placeholder => &[],
        }
    }
}

/// Cached descriptions of every region, refreshed per `Redraw` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub grid: GridView,
    pub pagination: Option<PaginationView>,
    pub favorites: Option<FavoritesView>,
}

impl Screen {
    pub fn describe<S: KeyValueStore>(browser: &ClubBrowser<S>) -> Self {
        Self {
            grid: describe_grid(browser),
            pagination: describe_pagination(browser),
            favorites: describe_favorites(browser),
        }
    }

    pub fn refresh<S: KeyValueStore>(&mut self, browser: &ClubBrowser<S>, redraw: Redraw) {
        if redraw.contains(Redraw::GRID) {
            self.grid = describe_grid(browser);
        }
        if redraw.contains(Redraw::PAGINATION) {
            self.pagination = describe_pagination(browser);
        }
        if redraw.contains(Redraw::FAVORITES) {
            self.favorites = describe_favorites(browser);
        }
    }

    pub fn cards(&self) -> &[CardView] {
        match &self.grid {
            GridView::Cards(cards) => cards,
            _ => &[],
        }
    }
}

pub fn describe_grid<S: KeyValueStore>(browser: &ClubBrowser<S>) -> GridView {
    match browser.catalog() {
        CatalogState::Loading => GridView::Loading,
        CatalogState::Failed(reason) => GridView::Failed {
            reason: reason.clone(),
        },
        CatalogState::Ready(_) => {
            let view = browser.current_view();
            let cards = view
                .items
                .into_iter()
                .map(|club| CardView {
                    name: club.name.clone(),
                    description: club.description.clone(),
                    image: club.image.clone(),
                    favorite: browser.favorites().contains(&club.name),
                    note: browser.notes().visible(&club.name).map(str::to_string),
                })
                .collect();
            GridView::Cards(cards)
        }
    }
}

/// `None` unless the catalog loaded.
pub fn describe_pagination<S: KeyValueStore>(browser: &ClubBrowser<S>) -> Option<PaginationView> {
    if !browser.is_ready() {
        return None;
    }
    let view = browser.current_view();
    let pages = (1..=view.page_count)
        .map(|number| PageButton {
            number,
            active: number == view.page,
        })
        .collect();
    Some(PaginationView {
        pages,
        current: view.page,
        page_count: view.page_count,
        filtered_count: view.filtered_count,
        prev_enabled: view.page > 1,
        next_enabled: view.page < view.page_count,
    })
}

/// Favorites in insertion order; names missing from the catalog are skipped.
pub fn describe_favorites<S: KeyValueStore>(browser: &ClubBrowser<S>) -> Option<FavoritesView> {
    if !browser.is_ready() {
        return None;
    }
    let entries: Vec<FavoriteEntry> = browser
        .favorites()
        .iter()
        .filter_map(|name| browser.find_club(name))
        .map(|club| FavoriteEntry {
            name: club.name.clone(),
            image: club.image.clone(),
            note: browser.notes().visible(&club.name).map(str::to_string),
        })
        .collect();
    if entries.is_empty() {
        Some(FavoritesView::Placeholder)
    } else {
        Some(FavoritesView::Entries(entries))
    }
}
