//! Defines types of file collections and the FileCollection trait

use itertools::Itertools;
use std::env::{join_paths, JoinPathsError};
use std::ffi::OsString;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

/// A collection of files.
pub trait FileCollection: Send + Sync {
    /// Gets the files that make up this file collection, in order and without duplicates
    fn files(&self) -> Vec<PathBuf>;

    /// Gets whether this file collection contains any files
    fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    /// Create a PATH-like string (`:` or `;` separated) based on the files in this collection
    fn as_path(&self) -> Result<OsString, JoinPathsError> {
        join_paths(self.files())
    }
}

/// An ordered set of paths. Adding a path that's already present has no effect.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Creates a new, empty file set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path to the end of this set, unless it's already present
    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if self.contains(path) {
            false
        } else {
            self.paths.push(path.to_path_buf());
            true
        }
    }

    /// Whether this set contains a path
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.paths.iter().any(|p| p == path.as_ref())
    }

    /// The number of paths in this set
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl FileCollection for FileSet {
    fn files(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for FileSet {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self {
            paths: iter
                .into_iter()
                .map(|p| p.as_ref().to_path_buf())
                .unique()
                .collect(),
        }
    }
}

impl<P: AsRef<Path>> Extend<P> for FileSet {
    fn extend<T: IntoIterator<Item = P>>(&mut self, iter: T) {
        for path in iter {
            self.insert(path);
        }
    }
}

impl<F: FileCollection> AddAssign<&F> for FileSet {
    fn add_assign(&mut self, rhs: &F) {
        self.extend(rhs.files());
    }
}

impl<F: FileCollection> Add<&F> for FileSet {
    type Output = FileSet;

    fn add(mut self, rhs: &F) -> Self::Output {
        self += rhs;
        self
    }
}

impl IntoIterator for FileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl FileCollection for Vec<PathBuf> {
    fn files(&self) -> Vec<PathBuf> {
        self.iter().cloned().unique().collect()
    }
}
