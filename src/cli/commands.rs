use std::fmt::Write as _;
use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::render::{FavoritesView, GridView, Screen, NO_FAVORITES_PLACEHOLDER};
use crate::app::{App, ClubBrowser, Interaction, LineInteraction, NoteOrigin, ScriptedInteraction};
use crate::catalog::{CatalogSource, FileCatalog};
use crate::config::AppConfig;
use crate::storage::{KeyValueStore, SqliteStore};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only show clubs whose name contains these words (case-insensitive)
    #[arg()]
    pub query: Vec<String>,
    /// Page to print
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug, Clone)]
pub struct FavoriteArgs {
    /// Club name (exact, or a case-insensitive match)
    pub name: String,
}

#[derive(Args, Debug, Clone)]
pub struct NoteArgs {
    /// Club name (exact, or a case-insensitive match)
    pub name: String,
    /// Note text. If omitted, reads piped stdin or prompts.
    #[arg(long, conflicts_with = "delete")]
    pub text: Option<String>,
    /// Delete the note instead of setting it
    #[arg(long)]
    pub delete: bool,
    /// Skip the delete confirmation
    #[arg(long)]
    pub yes: bool,
}

pub fn run_tui(config: Arc<AppConfig>, store: SqliteStore) -> Result<()> {
    let source = FileCatalog::new(config.catalog.path.clone());
    let mut app = App::new(config, store, source);
    app.run()
}

pub fn list_clubs<S: KeyValueStore>(config: &AppConfig, store: S, args: ListArgs) -> Result<()> {
    let mut browser = open_browser(config, store)?;
    let output = render_list(&mut browser, &args)?;
    print!("{output}");
    Ok(())
}

pub fn show_favorites<S: KeyValueStore>(config: &AppConfig, store: S) -> Result<()> {
    let browser = open_browser(config, store)?;
    print!("{}", format_favorites(&Screen::describe(&browser)));
    Ok(())
}

pub fn toggle_favorite<S: KeyValueStore>(
    config: &AppConfig,
    store: S,
    args: FavoriteArgs,
) -> Result<()> {
    let mut browser = open_browser(config, store)?;
    let output = apply_favorite_toggle(&mut browser, &args.name)?;
    print!("{output}");
    Ok(())
}

pub fn edit_note<S: KeyValueStore>(config: &AppConfig, store: S, args: NoteArgs) -> Result<()> {
    let mut browser = open_browser(config, store)?;
    let mut interaction = note_interaction(&args)?;
    let output = apply_note(&mut browser, &args, interaction.as_mut())?;
    print!("{output}");
    Ok(())
}

/// Loads the catalog synchronously; a CLI run has nothing to show until it lands.
fn open_browser<S: KeyValueStore>(config: &AppConfig, store: S) -> Result<ClubBrowser<S>> {
    let source = FileCatalog::new(config.catalog.path.clone());
    let clubs = source
        .load()
        .with_context(|| format!("loading catalog {}", source.path().display()))?;
    let mut browser = ClubBrowser::new(store);
    browser.install_catalog(Ok(clubs));
    Ok(browser)
}

fn render_list<S: KeyValueStore>(browser: &mut ClubBrowser<S>, args: &ListArgs) -> Result<String> {
    browser.apply_search(&args.query.join(" "));
    if args.page != 1 && browser.go_to_page(args.page).is_empty() {
        bail!(
            "page {} is out of range (1-{})",
            args.page,
            browser.page_count().max(1)
        );
    }
    Ok(format_page(&Screen::describe(browser)))
}

fn apply_favorite_toggle<S: KeyValueStore>(
    browser: &mut ClubBrowser<S>,
    requested: &str,
) -> Result<String> {
    let name = resolve_club(browser, requested)?;
    browser
        .toggle_favorite(&name)
        .with_context(|| format!("saving favorites after toggling {name}"))?;
    if browser.favorites().contains(&name) {
        Ok(format!("Added {name} to favorites\n"))
    } else {
        Ok(format!("Removed {name} from favorites\n"))
    }
}

fn apply_note<S: KeyValueStore>(
    browser: &mut ClubBrowser<S>,
    args: &NoteArgs,
    interaction: &mut dyn Interaction,
) -> Result<String> {
    let name = resolve_club(browser, &args.name)?;
    if args.delete {
        if !browser.notes().contains(&name) {
            return Ok(format!("No note for {name}\n"));
        }
        let redraw = browser
            .delete_note(&name, interaction)
            .with_context(|| format!("saving notes after deleting {name}"))?;
        return Ok(if redraw.is_empty() {
            format!("Kept note for {name}\n")
        } else {
            format!("Deleted note for {name}\n")
        });
    }

    let redraw = browser
        .edit_note(&name, NoteOrigin::Grid, interaction)
        .with_context(|| format!("saving note for {name}"))?;
    if redraw.is_empty() {
        return Ok(format!("Note for {name} unchanged\n"));
    }
    Ok(match browser.notes().visible(&name) {
        Some(note) => format!("Note for {name}: {note}\n"),
        None => format!("Cleared note for {name}\n"),
    })
}

fn note_interaction(args: &NoteArgs) -> Result<Box<dyn Interaction>> {
    if args.delete {
        if args.yes {
            return Ok(Box::new(ScriptedInteraction::new().with_confirmation(true)));
        }
        return Ok(Box::new(LineInteraction::stdio()));
    }
    if let Some(text) = &args.text {
        return Ok(Box::new(ScriptedInteraction::new().with_text(text.clone())));
    }
    match read_stdin()? {
        Some(text) => Ok(Box::new(ScriptedInteraction::new().with_text(text))),
        None => Ok(Box::new(LineInteraction::stdio())),
    }
}

/// Exact name first, then a unique case-insensitive match.
fn resolve_club<S: KeyValueStore>(browser: &ClubBrowser<S>, requested: &str) -> Result<String> {
    let requested = requested.trim();
    if let Some(club) = browser.find_club(requested) {
        return Ok(club.name.clone());
    }
    let folded = requested.to_lowercase();
    let mut candidates = browser
        .clubs()
        .iter()
        .filter(|club| club.name.to_lowercase() == folded);
    match (candidates.next(), candidates.next()) {
        (Some(club), None) => Ok(club.name.clone()),
        (Some(_), Some(_)) => bail!("club name '{requested}' is ambiguous, use the exact name"),
        (None, _) => bail!("no club named '{requested}'"),
    }
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading note from stdin")?;
    Ok(Some(buf))
}

fn format_page(screen: &Screen) -> String {
    let mut out = String::new();
    match &screen.grid {
        GridView::Loading => out.push_str("Loading clubs…\n"),
        GridView::Failed { reason } => {
            let _ = writeln!(&mut out, "Failed to load clubs: {reason}");
        }
        GridView::Cards(cards) if cards.is_empty() => {
            out.push_str("No clubs match your search.\n");
        }
        GridView::Cards(cards) => {
            for card in cards {
                let _ = writeln!(&mut out, "{}  [{}]", card.name, card.favorite_label());
                if !card.description.is_empty() {
                    let _ = writeln!(&mut out, "    {}", card.description);
                }
                if let Some(note) = &card.note {
                    let _ = writeln!(&mut out, "    note: {note}");
                }
            }
        }
    }
    if let Some(pagination) = &screen.pagination {
        if pagination.page_count > 0 {
            let noun = if pagination.filtered_count == 1 { "club" } else { "clubs" };
            let _ = writeln!(
                &mut out,
                "Page {}/{} ({} {noun})",
                pagination.current, pagination.page_count, pagination.filtered_count
            );
        }
    }
    out
}

fn format_favorites(screen: &Screen) -> String {
    let Some(FavoritesView::Entries(entries)) = &screen.favorites else {
        return format!("{NO_FAVORITES_PLACEHOLDER}\n");
    };
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(&mut out, "♥ {}", entry.name);
        if let Some(note) = &entry.note {
            let _ = writeln!(&mut out, "    note: {note}");
        }
    }
    out
}
