//! Interfaces to the host game: its file system, its translation store and its UI language sources.

use crate::{
    table::{CsvTable, Table},
    types::Error,
};
use encoding_rs::SHIFT_JIS;
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    fs::{read, read_dir},
    path::{Path, PathBuf},
};

/// Game data archive reader.
pub trait GameFileSystem {
    /// Names of every file with the given extension (e.g. `.ks`).
    fn list_files(&self, extension: &str) -> Vec<String>;

    /// Raw bytes of a file, looked up by name.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFile`] - if there's no such file.
    fn read_file(&self, name: &str) -> Result<Vec<u8>, Error>;

    /// Opens a `.nei` table.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFile`] - if there's no such table.
    fn open_table(&self, name: &str) -> Result<Box<dyn Table>, Error>;
}

/// Read-only view of the translations the game already has, keyed by `<category>/<key>`.
pub trait TranslationLookup {
    fn try_get_translation(&self, key: &str) -> Option<String>;
}

/// A UI localization source, exported as-is.
pub trait LanguageSource {
    fn name(&self) -> &str;

    fn languages(&self) -> Vec<String>;

    fn categories(&self) -> Vec<String>;

    /// The whole category as CSV text.
    fn export_csv(&self, category: &str) -> String;
}

/// A lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslations;

impl TranslationLookup for NoTranslations {
    fn try_get_translation(&self, _key: &str) -> Option<String> {
        None
    }
}

impl TranslationLookup for HashMap<String, String> {
    fn try_get_translation(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl TranslationLookup for IndexMap<String, String> {
    fn try_get_translation(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.len() >= extension.len()
        && name.as_bytes()[name.len() - extension.len()..]
            .eq_ignore_ascii_case(extension.as_bytes())
}

fn file_name_of(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Game data held in memory. File names are matched case-insensitively, by their last path component.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: IndexMap<String, (String, Vec<u8>)>,
    tables: IndexMap<String, CsvTable>,
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&mut self, name: &str, bytes: Vec<u8>) {
        self.files.insert(
            file_name_of(name).to_lowercase(),
            (name.to_owned(), bytes),
        );
    }

    /// Stores script text Shift-JIS encoded, the way it is in the archives.
    pub fn insert_script(&mut self, name: &str, text: &str) {
        let (encoded, _, _) = SHIFT_JIS.encode(text);
        self.insert_file(name, encoded.into_owned());
    }

    pub fn insert_table(&mut self, name: &str, table: CsvTable) {
        self.tables.insert(name.to_lowercase(), table);
    }
}

impl GameFileSystem for MemoryFileSystem {
    fn list_files(&self, extension: &str) -> Vec<String> {
        self.files
            .values()
            .map(|(name, _)| name)
            .filter(|name| has_extension(name, extension))
            .cloned()
            .collect()
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, Error> {
        self.files
            .get(&file_name_of(name).to_lowercase())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::MissingFile(name.to_owned()))
    }

    fn open_table(&self, name: &str) -> Result<Box<dyn Table>, Error> {
        self.tables
            .get(&name.to_lowercase())
            .map(|table| Box::new(table.clone()) as Box<dyn Table>)
            .ok_or_else(|| Error::MissingFile(name.to_owned()))
    }
}

/// Game data extracted to a directory tree.
///
/// Files are found by name anywhere under the root. `.nei` tables are read from their CSV export, `<stem>.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
    files: Vec<String>,
    by_name: HashMap<String, PathBuf>,
}

impl DirectoryFileSystem {
    /// Indexes every file under `root`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if a directory can't be read.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        let mut paths: Vec<PathBuf> = Vec::new();
        Self::walk(&root, &mut paths)?;
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        let mut by_name = HashMap::with_capacity(paths.len());

        for path in paths {
            let relative = path
                .strip_prefix(&root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");

            by_name
                .entry(file_name_of(&relative).to_lowercase())
                .or_insert_with(|| path.clone());
            files.push(relative);
        }

        Ok(Self {
            root,
            files,
            by_name,
        })
    }

    fn walk(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), Error> {
        for entry in read_dir(dir)
            .map_err(|e| Error::Io(dir.to_path_buf(), e))?
            .flatten()
        {
            let path = entry.path();

            if path.is_dir() {
                Self::walk(&path, paths)?;
            } else {
                paths.push(path);
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, name: &str) -> Option<&PathBuf> {
        self.by_name.get(&file_name_of(name).to_lowercase())
    }
}

impl GameFileSystem for DirectoryFileSystem {
    fn list_files(&self, extension: &str) -> Vec<String> {
        self.files
            .iter()
            .filter(|name| has_extension(name, extension))
            .cloned()
            .collect()
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, Error> {
        let path = self
            .locate(name)
            .ok_or_else(|| Error::MissingFile(name.to_owned()))?;

        read(path).map_err(|e| Error::Io(path.clone(), e))
    }

    fn open_table(&self, name: &str) -> Result<Box<dyn Table>, Error> {
        let export = Path::new(file_name_of(name)).with_extension("csv");
        let export = export.to_string_lossy();

        let path = self
            .locate(&export)
            .ok_or_else(|| Error::MissingFile(name.to_owned()))?;
        let bytes = read(path).map_err(|e| Error::Io(path.clone(), e))?;

        Ok(Box::new(CsvTable::from_bytes(&bytes)))
    }
}

/// A language source held in memory: category name to exported CSV.
#[derive(Debug, Default, Clone)]
pub struct MemoryLanguageSource {
    pub name: String,
    pub languages: Vec<String>,
    pub categories: IndexMap<String, String>,
}

impl LanguageSource for MemoryLanguageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    fn export_csv(&self, category: &str) -> String {
        self.categories.get(category).cloned().unwrap_or_default()
    }
}
