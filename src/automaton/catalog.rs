//! Discovery of `.tab` files and cycling between them

use super::rules::RuleTable;
use crate::error::RuleFileError;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;
use std::path::{Path, PathBuf};

/// File name of the transition function selected at startup when present
pub const DEFAULT_RULE_FILE: &str = "default.tab";

/// Extension of transition function files
pub const RULE_FILE_EXTENSION: &str = "tab";

/// Outcome of moving through the catalog
#[derive(Debug)]
pub enum CatalogMove {
    /// The file at the new index, loaded
    Loaded(RuleTable),
    /// `next` was called on the last file; the index is unchanged
    EndOfCatalog,
    /// The catalog has no files
    Empty,
}

/// Sorted rule files of one directory and the index of the active one
#[derive(Debug, Clone, Default)]
pub struct RuleFileCatalog {
    directory: PathBuf,
    files: Vec<String>,
    index: usize,
    max_states: usize,
}

impl RuleFileCatalog {
    /// A catalog without files
    pub fn empty(max_states: usize) -> Self {
        Self {
            max_states,
            ..Self::default()
        }
    }

    /// List every `*.tab` file in `directory`, sorted by name.
    ///
    /// `default.tab` is selected if present, otherwise the first file.
    pub fn discover<P: AsRef<Path>>(directory: P, max_states: usize) -> Result<Self> {
        let directory = directory.as_ref();
        let dir = std::fs::read_dir(directory)
            .with_context(|| format!("Failed to read directory: {}", directory.display()))?;

        let mut files = Vec::new();
        for entry in dir {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && path.extension().is_some_and(|ext| ext == RULE_FILE_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        Ok(Self::from_files(directory, files, max_states))
    }

    /// Build a catalog from file names relative to `directory`
    pub fn from_files<P, I, S>(directory: P, files: I, max_states: usize) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<String> = files.into_iter().map(Into::into).sorted().dedup().collect();
        let index = files
            .iter()
            .position(|name| name == DEFAULT_RULE_FILE)
            .unwrap_or(0);
        debug!("Rule file catalog: [{}], active index {}", files.iter().join(", "), index);

        Self {
            directory: directory.into(),
            files,
            index,
            max_states,
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Name of the active file
    pub fn current(&self) -> Option<&str> {
        self.files.get(self.index).map(String::as_str)
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current().map(|name| self.directory.join(name))
    }

    /// Load the active file
    pub fn load_current(&self) -> Result<Option<RuleTable>, RuleFileError> {
        self.current_path()
            .map(|path| RuleTable::load(path, self.max_states))
            .transpose()
    }

    /// Advance to the next file. The catalog does not wrap forwards.
    pub fn next(&mut self) -> Result<CatalogMove, RuleFileError> {
        if self.files.is_empty() {
            return Ok(CatalogMove::Empty);
        }
        if self.index + 1 >= self.files.len() {
            return Ok(CatalogMove::EndOfCatalog);
        }
        self.index += 1;
        self.load_moved()
    }

    /// Step back to the previous file, wrapping from the first to the last
    pub fn prev(&mut self) -> Result<CatalogMove, RuleFileError> {
        if self.files.is_empty() {
            return Ok(CatalogMove::Empty);
        }
        self.index = if self.index > 0 {
            self.index - 1
        } else {
            self.files.len() - 1
        };
        self.load_moved()
    }

    fn load_moved(&self) -> Result<CatalogMove, RuleFileError> {
        Ok(match self.load_current()? {
            Some(table) => CatalogMove::Loaded(table),
            None => CatalogMove::Empty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_tables(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), "2\n0 0 0 0 0 1\n").unwrap();
        }
    }

    fn loaded_name(step: CatalogMove) -> String {
        match step {
            CatalogMove::Loaded(table) => table.source_name().unwrap().to_string(),
            other => panic!("expected a loaded table, got {:?}", other),
        }
    }

    #[test]
    fn test_default_file_selected_first() {
        let catalog = RuleFileCatalog::from_files(".", ["b.tab", "a.tab", "default.tab"], 16);
        assert_eq!(catalog.files(), ["a.tab", "b.tab", "default.tab"]);
        assert_eq!(catalog.current(), Some("default.tab"));
        assert_eq!(catalog.index(), 2);
    }

    #[test]
    fn test_first_file_selected_without_default() {
        let catalog = RuleFileCatalog::from_files(".", ["zeta.tab", "alpha.tab"], 16);
        assert_eq!(catalog.current(), Some("alpha.tab"));
    }

    #[test]
    fn test_discover_ignores_other_files() {
        let temp_dir = tempdir().unwrap();
        write_tables(temp_dir.path(), &["b.tab", "a.tab", "default.tab"]);
        std::fs::write(temp_dir.path().join("default.cas"), "1\n").unwrap();
        std::fs::create_dir(temp_dir.path().join("dir.tab")).unwrap();

        let catalog = RuleFileCatalog::discover(temp_dir.path(), 16).unwrap();
        assert_eq!(catalog.files(), ["a.tab", "b.tab", "default.tab"]);
        assert_eq!(catalog.current(), Some("default.tab"));
    }

    #[test]
    fn test_cycling() {
        let temp_dir = tempdir().unwrap();
        write_tables(temp_dir.path(), &["b.tab", "a.tab", "default.tab"]);
        let mut catalog = RuleFileCatalog::discover(temp_dir.path(), 16).unwrap();

        // default.tab is last, so moving forward ends the catalog
        assert!(matches!(catalog.next().unwrap(), CatalogMove::EndOfCatalog));
        assert_eq!(catalog.current(), Some("default.tab"));

        assert_eq!(loaded_name(catalog.prev().unwrap()), "b.tab");
        assert_eq!(loaded_name(catalog.prev().unwrap()), "a.tab");
        // wraps backwards
        assert_eq!(loaded_name(catalog.prev().unwrap()), "default.tab");
        assert_eq!(loaded_name(catalog.prev().unwrap()), "b.tab");
        assert_eq!(loaded_name(catalog.next().unwrap()), "default.tab");
    }

    #[test]
    fn test_empty_catalog() {
        let temp_dir = tempdir().unwrap();
        let mut catalog = RuleFileCatalog::discover(temp_dir.path(), 16).unwrap();

        assert!(catalog.is_empty());
        assert_eq!(catalog.current(), None);
        assert!(catalog.load_current().unwrap().is_none());
        assert!(matches!(catalog.next().unwrap(), CatalogMove::Empty));
        assert!(matches!(catalog.prev().unwrap(), CatalogMove::Empty));
    }

    #[test]
    fn test_broken_file_reported_on_switch() {
        let temp_dir = tempdir().unwrap();
        write_tables(temp_dir.path(), &["a.tab"]);
        std::fs::write(temp_dir.path().join("b.tab"), "3 2\n").unwrap();
        let mut catalog = RuleFileCatalog::discover(temp_dir.path(), 16).unwrap();

        assert!(matches!(
            catalog.next(),
            Err(RuleFileError::UnsupportedDimension { dim: 3, .. })
        ));
    }
}
