use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Ordered list of files waiting to be converted. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobList {
    files: Vec<PathBuf>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    /// Picker semantics: the new selection replaces whatever was listed.
    pub fn replace_with<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.clear();
        self.files.extend(paths.into_iter().map(Into::into));
    }

    /// Drop semantics: non-video paths are discarded and the rest replace the list.
    /// Returns the rejected paths. Leaves the list untouched when nothing survives.
    pub fn accept_dropped<I, P>(&mut self, paths: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let (accepted, rejected): (Vec<PathBuf>, Vec<PathBuf>) = paths
            .into_iter()
            .map(Into::into)
            .partition(|path| is_video_file(path));

        if accepted.is_empty() {
            return Err(Error::NoVideoFiles);
        }

        self.files = accepted;
        Ok(rejected)
    }

    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}
