use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod prefetch;

pub use prefetch::{prefetch_images, resolve_image, ImageSource};

/// One directory entry. `name` doubles as the identifier for favorites and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl Club {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog {path} not found")]
    Missing { path: PathBuf },
    #[error("reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog loader stopped before delivering a result")]
    Disconnected,
}

pub trait CatalogSource: Send + 'static {
    fn load(&self) -> Result<Vec<Club>, CatalogError>;

    /// Directory that relative image paths are resolved against.
    fn base_dir(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Vec<Club>, CatalogError> {
        let raw = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogError::Missing {
                    path: self.path.clone(),
                }
            } else {
                CatalogError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let clubs: Vec<Club> =
            serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(count = clubs.len(), path = %self.path.display(), "catalog loaded");
        Ok(clubs)
    }

    fn base_dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Loads the catalog on a worker thread; the receiver yields exactly one result.
pub fn spawn_loader<S: CatalogSource>(source: S) -> Receiver<Result<Vec<Club>, CatalogError>> {
    let (tx, rx) = bounded(1);
    let spawned = thread::Builder::new()
        .name("catalog-loader".into())
        .spawn(move || {
            let result = source.load();
            if tx.send(result).is_err() {
                tracing::debug!("catalog receiver dropped before load finished");
            }
        });
    if let Err(err) = spawned {
        tracing::error!(?err, "failed to spawn catalog loader thread");
    }
    rx
}

/// Writes a starter catalog on first run so a fresh install has something to browse.
pub fn seed_default_catalog(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating catalog directory {}", parent.display()))?;
    }
    tracing::info!(path = %path.display(), "seeding first-run catalog");
    let clubs = [
        Club::new(
            "Astronomy Club",
            "Night-sky observing sessions and telescope workshops.",
            "images/astronomy.jpg",
        ),
        Club::new(
            "Book Circle",
            "One novel a month, one lively discussion.",
            "images/books.jpg",
        ),
        Club::new(
            "Chess Society",
            "Casual blitz on Tuesdays, rated tournaments each term.",
            "images/chess.jpg",
        ),
        Club::new(
            "Debate Union",
            "Parliamentary-style debates and public speaking practice.",
            "images/debate.jpg",
        ),
        Club::new(
            "Drama Guild",
            "Two stage productions a year plus improv nights.",
            "images/drama.jpg",
        ),
        Club::new(
            "Hiking Crew",
            "Weekend trail trips for every fitness level.",
            "images/hiking.jpg",
        ),
        Club::new(
            "Photography Club",
            "Photo walks, darkroom access and critique sessions.",
            "images/photography.jpg",
        ),
        Club::new(
            "Robotics Team",
            "Build competition robots from CAD to code.",
            "images/robotics.jpg",
        ),
    ];
    let json = serde_json::to_vec_pretty(&clubs).context("serialising starter catalog")?;
    fs::write(path, json).with_context(|| format!("writing catalog {}", path.display()))?;
    Ok(true)
}
