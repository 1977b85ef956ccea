use crate::{
    constants::{CSV_HEADER, CSV_TEXT_TYPE, UTF8_BOM},
    functions::{
        contains_japanese, decode_shift_jis, escape_csv_item, quote_csv_item,
        strip_bom,
    },
    game::TranslationLookup,
    types::Error,
};
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::{
    fs::File,
    io::{BufWriter, Write},
    mem::take,
    path::{Path, PathBuf},
};

/// Read access to a `.nei` table: a grid of cells addressed by column and row.
pub trait Table {
    /// Number of rows, including the header row.
    fn rows(&self) -> usize;

    /// Whether the cell exists and isn't empty.
    fn has_data(&self, column: usize, row: usize) -> bool;

    /// Cell contents; empty for missing cells.
    fn string(&self, column: usize, row: usize) -> String;

    /// Cell contents as an integer; `0` for missing or non-numeric cells.
    fn integer(&self, column: usize, row: usize) -> i32 {
        self.string(column, row).trim().parse().unwrap_or_default()
    }
}

/// In-memory table parsed from comma-separated text.
///
/// Quoted fields may contain commas, doubled quotes and newlines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CsvTable {
    cells: Vec<Vec<String>>,
}

impl CsvTable {
    #[must_use]
    pub fn new(cells: Vec<Vec<String>>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(split_csv(text))
    }

    /// Parses CSV bytes, UTF-8 with an optional BOM, or Shift-JIS otherwise.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bytes = strip_bom(bytes);

        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(text),
            Err(_) => Self::parse(&decode_shift_jis(bytes)),
        }
    }

    fn cell(&self, column: usize, row: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }
}

impl Table for CsvTable {
    fn rows(&self) -> usize {
        self.cells.len()
    }

    fn has_data(&self, column: usize, row: usize) -> bool {
        self.cell(column, row).is_some_and(|c| !c.is_empty())
    }

    fn string(&self, column: usize, row: usize) -> String {
        self.cell(column, row).unwrap_or_default().to_owned()
    }
}

/// Splits CSV text into rows of fields.
#[must_use]
pub fn split_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();

    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(char) = chars.next() {
        if quoted {
            if char == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            } else {
                field.push(char);
            }

            continue;
        }

        match char {
            '"' if field.is_empty() => quoted = true,
            ',' => row.push(take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(take(&mut field));
                rows.push(take(&mut row));
            }
            _ => field.push(char),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// A localization key and the source text it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub key: String,
    pub text: String,
}

impl TableEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Entries projected from one table row.
pub type RowEntries = SmallVec<[TableEntry; 4]>;

/// One `(column, key prefix)` projection rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRule {
    pub column: usize,
    pub key_prefix: String,
}

/// Projects a set of columns to keys.
///
/// By default the key of a cell is `prefix + cell text`. With a special key column, it's `prefix + value of that column` instead,
/// so the key stays stable while the projected text changes (e.g. descriptions keyed by their title).
#[derive(Debug, Clone, Default)]
pub struct ColumnProjection {
    rules: Vec<ProjectionRule>,
    special_key_column: Option<usize>,
}

impl ColumnProjection {
    #[must_use]
    pub fn new<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(column, key_prefix)| ProjectionRule {
                    column,
                    key_prefix: key_prefix.to_owned(),
                })
                .collect(),
            special_key_column: None,
        }
    }

    /// Keys every rule by the value of `column` instead of the projected text.
    #[must_use]
    pub fn keyed_by(mut self, column: usize) -> Self {
        self.special_key_column = Some(column);
        self
    }

    #[must_use]
    pub fn project(&self, table: &dyn Table, row: usize) -> RowEntries {
        let key_cell = self
            .special_key_column
            .map(|column| table.string(column, row));

        self.rules
            .iter()
            .map(|rule| {
                let text = table.string(rule.column, row);
                let key = match &key_cell {
                    Some(key_cell) => format!("{}{key_cell}", rule.key_prefix),
                    None => format!("{}{text}", rule.key_prefix),
                };

                TableEntry::new(key, text)
            })
            .collect()
    }
}

/// A CSV output file in the `Key,Type,Desc,Japanese,English` layout.
///
/// Keeps the set of keys written so far, so rows mapping to the same key are written once per file.
pub struct CsvSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written_keys: IndexSet<String>,
}

impl CsvSink {
    /// Creates the file, truncating it, and writes the BOM and header line.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if the file can't be created or written.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file =
            File::create(&path).map_err(|e| Error::Io(path.clone(), e))?;

        let mut sink = Self {
            path,
            writer: BufWriter::new(file),
            written_keys: IndexSet::new(),
        };

        sink.write_raw(&UTF8_BOM)?;
        sink.write_line(CSV_HEADER)?;
        Ok(sink)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::Io(self.path.clone(), e))
    }

    /// Writes a verbatim line, e.g. a section separator.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if writing fails.
    pub fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.write_raw(line.as_bytes())?;
        self.write_raw(b"\n")
    }

    /// Records `key` as written. Returns `false` if it already was.
    pub fn claim_key(&mut self, key: &str) -> bool {
        if self.written_keys.contains(key) {
            return false;
        }

        self.written_keys.insert(key.to_owned());
        true
    }

    /// Writes `"<key>",Text,,"<text>",` unless the key was already written to this file.
    ///
    /// Returns whether a line was written.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if writing fails.
    pub fn write_entry(&mut self, key: &str, text: &str) -> Result<bool, Error> {
        if !self.claim_key(key) {
            return Ok(false);
        }

        let line = format!(
            "{},{CSV_TEXT_TYPE},,{},",
            quote_csv_item(key),
            quote_csv_item(text)
        );
        self.write_line(&line)?;
        Ok(true)
    }

    /// Writes `<key>,Text,,<source>,<english>` with plain escaping, as item and command files use.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if writing fails.
    pub fn write_plain_entry(
        &mut self,
        key: &str,
        source: &str,
        english: &str,
    ) -> Result<(), Error> {
        let line = format!(
            "{},{CSV_TEXT_TYPE},,{},{}",
            escape_csv_item(key),
            escape_csv_item(source),
            escape_csv_item(english)
        );
        self.write_line(&line)
    }

    /// Flushes buffered lines to disk.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if flushing fails.
    pub fn finish(mut self) -> Result<PathBuf, Error> {
        self.writer
            .flush()
            .map_err(|e| Error::Io(self.path.clone(), e))?;
        Ok(self.path)
    }
}

/// Turns table rows into CSV entries, applying the skip-translated filter.
pub struct TableExtractor<'a> {
    lookup: &'a dyn TranslationLookup,
    skip_translated: bool,
}

impl<'a> TableExtractor<'a> {
    #[must_use]
    pub fn new(lookup: &'a dyn TranslationLookup, skip_translated: bool) -> Self {
        Self {
            lookup,
            skip_translated,
        }
    }

    /// Whether an entry should be left out because it's already translated, or isn't Japanese at all.
    #[must_use]
    pub fn is_skipped(&self, file_key: &str, key: &str, text: &str) -> bool {
        self.skip_translated
            && (self
                .lookup
                .try_get_translation(&format!("{file_key}/{key}"))
                .is_some()
                || !contains_japanese(text))
    }

    /// Projects every populated row of `table` (rows from 1 with data in column 0) and writes the entries to `sink`.
    ///
    /// `file_key` is the translation category the entries belong to, used for the skip-translated lookup.
    ///
    /// Returns the number of written lines.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if writing fails.
    pub fn extract<F>(
        &self,
        sink: &mut CsvSink,
        table: &dyn Table,
        file_key: &str,
        mut project: F,
    ) -> Result<usize, Error>
    where
        F: FnMut(&dyn Table, usize) -> RowEntries,
    {
        let mut written: usize = 0;

        for row in 1..table.rows() {
            if !table.has_data(0, row) {
                continue;
            }

            for TableEntry { key, text } in project(table, row) {
                if self.is_skipped(file_key, &key, &text) || text.is_empty() {
                    continue;
                }

                let key = key.replace('×', "_");

                if sink.write_entry(&key, &text)? {
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    /// [`TableExtractor::extract`] with a [`ColumnProjection`].
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if writing fails.
    pub fn extract_columns(
        &self,
        sink: &mut CsvSink,
        table: &dyn Table,
        file_key: &str,
        projection: &ColumnProjection,
    ) -> Result<usize, Error> {
        self.extract(sink, table, file_key, |table, row| {
            projection.project(table, row)
        })
    }
}
