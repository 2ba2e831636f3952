use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use super::Club;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Local(PathBuf),
    Remote(String),
    Unsupported(String),
}

pub fn resolve_image(uri: &str, base_dir: Option<&Path>) -> ImageSource {
    let uri = uri.trim();
    if uri.is_empty() {
        return ImageSource::Unsupported(String::new());
    }
    if let Some(path) = uri.strip_prefix("file://") {
        return ImageSource::Local(PathBuf::from(path));
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return ImageSource::Remote(uri.to_string());
    }
    if let Some((scheme, _)) = uri.split_once(':') {
        // `C:\...` style drive letters are paths, anything longer is a scheme
        if scheme.len() > 1 && scheme.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return ImageSource::Unsupported(uri.to_string());
        }
    }
    let path = Path::new(uri);
    if path.is_absolute() {
        return ImageSource::Local(path.to_path_buf());
    }
    match base_dir {
        Some(base) => ImageSource::Local(base.join(path)),
        None => ImageSource::Local(path.to_path_buf()),
    }
}

/// Reads every local image once so the first card draw does not pay for cold storage.
///
/// Fire-and-forget: nothing waits on the handle and every failure is only logged.
pub fn prefetch_images(clubs: &[Club], base_dir: Option<&Path>) -> Option<JoinHandle<usize>> {
    let targets: Vec<ImageSource> = clubs
        .iter()
        .map(|club| resolve_image(&club.image, base_dir))
        .collect();
    if targets.is_empty() {
        return None;
    }
    let spawned = thread::Builder::new()
        .name("image-prefetch".into())
        .spawn(move || warm(targets));
    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::debug!(?err, "image prefetch thread not started");
            None
        }
    }
}

fn warm(targets: Vec<ImageSource>) -> usize {
    let mut warmed = 0;
    for target in targets {
        match target {
            ImageSource::Local(path) => match fs::read(&path) {
                Ok(bytes) => {
                    warmed += 1;
                    tracing::trace!(path = %path.display(), bytes = bytes.len(), "image warmed");
                }
                Err(err) => {
                    tracing::debug!(?err, path = %path.display(), "image prefetch failed");
                }
            },
            ImageSource::Remote(uri) => {
                tracing::trace!(%uri, "skipping remote image prefetch");
            }
            ImageSource::Unsupported(uri) => {
                tracing::trace!(%uri, "skipping unsupported image uri");
            }
        }
    }
    tracing::debug!(warmed, "image prefetch finished");
    warmed
}
