//! One-level directory listing and entry filtering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::infra::config::Config;

/// Immediate children of a directory, directories and files kept apart.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read directory {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to list {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Io { path, .. } | ScanError::Walk { path, .. } => path,
            ScanError::NotADirectory(path) => path,
        }
    }

    /// Collapse into an IO error for callers that only report IO failures.
    pub fn into_io(self) -> io::Error {
        match self {
            ScanError::Io { source, .. } => source,
            ScanError::NotADirectory(path) => io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a directory", path.display()),
            ),
            ScanError::Walk { source, .. } => source
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk failed")),
        }
    }
}

/// Lists exactly the direct children of a directory.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    show_hidden: bool,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self { show_hidden: true }
    }
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            show_hidden: config.scan.show_hidden,
        }
    }

    pub fn with_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    /// List the immediate children of `path`, sorted by file name.
    pub fn list_immediate_children(&self, path: &Path) -> Result<DirListing, ScanError> {
        let metadata = fs::metadata(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(path.to_path_buf()));
        }

        let mut builder = WalkBuilder::new(path);
        builder
            .standard_filters(false)
            .hidden(!self.show_hidden)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut listing = DirListing::default();
        for result in builder.build() {
            let entry = result.map_err(|source| ScanError::Walk {
                path: path.to_path_buf(),
                source,
            })?;
            if entry.depth() == 0 {
                continue;
            }
            let child = entry.path().to_path_buf();
            let is_dir = match entry.file_type() {
                Some(kind) if kind.is_symlink() => child.is_dir(),
                Some(kind) => kind.is_dir(),
                None => false,
            };
            if is_dir {
                listing.directories.push(child);
            } else {
                listing.files.push(child);
            }
        }

        tracing::debug!(
            path = %path.display(),
            directories = listing.directories.len(),
            files = listing.files.len(),
            "listed directory"
        );
        Ok(listing)
    }
}

/// Decides which scanned entries make it into the picker.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    suffixes: Vec<String>,
    ignore: Option<GlobSet>,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            suffixes: vec![".csv".into(), ".tsv".into()],
            ignore: None,
        }
    }
}

impl EntryFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        let suffixes = config
            .scan
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{ext}"))
            .collect();

        let mut builder = GlobSetBuilder::new();
        let mut patterns = 0usize;
        for pattern in &config.ignore.paths {
            for expanded in expand_dir_pattern(pattern) {
                builder.add(Glob::new(&expanded).context("invalid ignore path pattern")?);
                patterns += 1;
            }
        }
        for glob in &config.ignore.globs {
            builder.add(Glob::new(glob).context("invalid ignore glob")?);
            patterns += 1;
        }
        let ignore = if patterns == 0 {
            None
        } else {
            Some(builder.build().context("failed to build ignore matcher")?)
        };

        Ok(Self { suffixes, ignore })
    }

    /// Exact, case-sensitive suffix match on the file name.
    pub fn is_tabular(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Whether a path relative to the chosen root is excluded by ignore rules.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.ignore.as_ref().is_some_and(|set| set.is_match(relative))
    }
}

fn expand_dir_pattern(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![
        trimmed.to_owned(),
        format!("{trimmed}/**"),
        format!("**/{trimmed}"),
        format!("**/{trimmed}/**"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_immediate_children_sorted() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("b_dir/nested"))?;
        fs::create_dir_all(root.join("a_dir"))?;
        fs::write(root.join("z.csv"), "x,y\n")?;
        fs::write(root.join("m.txt"), "")?;
        fs::write(root.join("b_dir/nested/deep.csv"), "x,y\n")?;

        let listing = DirectoryScanner::new().list_immediate_children(root)?;
        assert_eq!(listing.directories, vec![root.join("a_dir"), root.join("b_dir")]);
        assert_eq!(listing.files, vec![root.join("m.txt"), root.join("z.csv")]);
        Ok(())
    }

    #[test]
    fn hidden_entries_follow_configuration() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join(".hidden.csv"), "x,y\n")?;

        let shown = DirectoryScanner::new().list_immediate_children(temp.path())?;
        assert_eq!(shown.files.len(), 1);

        let hidden = DirectoryScanner::new()
            .with_hidden(false)
            .list_immediate_children(temp.path())?;
        assert!(hidden.files.is_empty());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        let err = DirectoryScanner::new()
            .list_immediate_children(&missing)
            .unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
        assert_eq!(err.path(), missing.as_path());
        assert_eq!(err.into_io().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.csv");
        fs::write(&file, "x,y\n").unwrap();
        let err = DirectoryScanner::new().list_immediate_children(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn tabular_filter_is_case_sensitive_suffix_match() {
        let filter = EntryFilter::default();
        assert!(filter.is_tabular(Path::new("/d/points.csv")));
        assert!(filter.is_tabular(Path::new("/d/points.tsv")));
        assert!(!filter.is_tabular(Path::new("/d/points.CSV")));
        assert!(!filter.is_tabular(Path::new("/d/points.csv.bak")));
    }

    #[test]
    fn ignore_rules_match_relative_paths() -> anyhow::Result<()> {
        let mut config = Config::default();
        config.ignore.paths.push("archive/".into());
        config.ignore.globs.push("**/*.draft.csv".into());
        config.scan.extensions = vec!["csv".into()];

        let filter = EntryFilter::from_config(&config)?;
        assert!(filter.is_ignored(Path::new("survey/archive")));
        assert!(filter.is_ignored(Path::new("survey/archive/old.csv")));
        assert!(filter.is_ignored(Path::new("survey/wells.draft.csv")));
        assert!(!filter.is_ignored(Path::new("survey/wells.csv")));
        assert!(!filter.is_tabular(Path::new("survey/wells.tsv")));
        Ok(())
    }
}
