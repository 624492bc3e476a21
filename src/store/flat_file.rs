use super::{
    apply_patch, belongs_to, key_of, key_value, next_key, prepare_insert, FieldPatch, Key,
    RecordKind, RecordStore,
};
use crate::error::{RecordContext, RecordError, RecordResult};
use crate::record::{Record, Value};
use memmap2::Mmap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Delimited text files, one per record kind, in a single directory.
///
/// Every file starts with a header row naming its columns. Cells are quoted
/// the usual CSV way when they hold the separator, a quote or a line break.
/// Empty cells read back as null. A missing file is an empty table.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    dir: PathBuf,
    delimiter: u8,
}

impl FlatFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> RecordResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_file_context(&dir.display().to_string())?;
        Ok(Self {
            dir,
            delimiter: b',',
        })
    }

    /// Use a different field separator. It must be a single ASCII character
    /// other than a quote or a line break.
    pub fn with_separator(mut self, separator: char) -> RecordResult<Self> {
        match u8::try_from(separator) {
            Ok(byte) if byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r') => {
                self.delimiter = byte;
                Ok(self)
            }
            _ => Err(RecordError::invalid_option(&format!(
                "invalid field separator: {separator:?}"
            ))),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn separator(&self) -> char {
        char::from(self.delimiter)
    }

    /// Path of the file backing `kind`
    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn load(&self, kind: RecordKind) -> RecordResult<Vec<Record>> {
        let path = self.path_for(kind);
        let name = path.display().to_string();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).with_file_context(&name)?;
        if file.metadata().with_file_context(&name)?.len() == 0 {
            return Ok(Vec::new());
        }

        // SAFETY: the map is read-only and dropped before this function
        // returns. Another process truncating the file while it is mapped
        // makes the read fault (SIGBUS), so files must not be edited while a
        // query is running.
        let mmap = unsafe { Mmap::map(&file) }.with_file_context(&name)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(&mmap[..]);

        let header = reader.headers().map_err(|e| csv_error(&name, e))?.clone();
        if header.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(unknown) = header.iter().find(|cell| !kind.has_column(cell.trim())) {
            return Err(RecordError::malformed_file(
                &name,
                1,
                &format!("unknown column '{unknown}'"),
            ));
        }

        let key_field = kind.key_field();
        let positions: Vec<Option<usize>> = kind
            .columns()
            .iter()
            .map(|column| header.iter().position(|cell| cell.trim() == *column))
            .collect();
        if positions.iter().any(Option::is_none) {
            warn!(file = %name, "header is missing schema columns; they will read as null");
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| csv_error(&name, e))?;
            let line = row.position().map_or(0, |pos| pos.line() as usize);

            let mut fields = Vec::with_capacity(positions.len());
            for (&column, position) in kind.columns().iter().zip(&positions) {
                let cell = position.and_then(|index| row.get(index)).unwrap_or("");
                let value = if cell.is_empty() {
                    Value::Null
                } else if column == key_field {
                    let key: Key = cell.trim().parse().map_err(|_| {
                        RecordError::malformed_file(&name, line, &format!("invalid key {cell:?}"))
                    })?;
                    key_value(key)
                } else {
                    Value::text(cell)
                };
                fields.push((column, value));
            }
            records.push(fields.into_iter().collect::<Record>());
        }

        records.sort_by_key(|record| key_of(kind, record));
        debug!(%kind, file = %name, records = records.len(), "loaded records");
        Ok(records)
    }

    fn save(&self, kind: RecordKind, records: &[Record]) -> RecordResult<()> {
        let path = self.path_for(kind);
        let name = path.display().to_string();
        let tmp = path.with_extension("csv.tmp");

        self.write_table(&tmp, kind, records).with_file_context(&name)?;
        fs::rename(&tmp, &path).with_file_context(&name)?;
        debug!(%kind, file = %name, records = records.len(), "saved records");
        Ok(())
    }

    fn write_table(&self, path: &Path, kind: RecordKind, records: &[Record]) -> RecordResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        writer.write_record(kind.columns())?;
        for record in records {
            let row = kind.columns().iter().map(|column| record.value(column).to_text());
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl RecordStore for FlatFileStore {
    fn fetch_all(&self, kind: RecordKind) -> RecordResult<Vec<Record>> {
        self.load(kind)
    }

    fn fetch_by_key(&self, kind: RecordKind, key: Key) -> RecordResult<Option<Record>> {
        Ok(self
            .load(kind)?
            .into_iter()
            .find(|record| key_of(kind, record) == Some(key)))
    }

    fn insert(&mut self, kind: RecordKind, record: Record) -> RecordResult<Key> {
        let mut records = self.load(kind)?;
        let key = next_key(kind, &records)?;
        records.push(prepare_insert(kind, key, &record)?);
        self.save(kind, &records)?;
        Ok(key)
    }

    fn update(&mut self, kind: RecordKind, key: Key, patch: &dyn FieldPatch) -> RecordResult<bool> {
        let mut records = self.load(kind)?;
        let Some(slot) = records
            .iter_mut()
            .find(|record| key_of(kind, record) == Some(key))
        else {
            return Ok(false);
        };
        *slot = apply_patch(kind, slot, patch)?;
        self.save(kind, &records)?;
        Ok(true)
    }

    fn delete(&mut self, kind: RecordKind, key: Key) -> RecordResult<bool> {
        let mut records = self.load(kind)?;
        let before = records.len();
        records.retain(|record| key_of(kind, record) != Some(key));
        if records.len() == before {
            return Ok(false);
        }
        self.save(kind, &records)?;

        for &dependent in kind.dependents() {
            let mut rows = self.load(dependent)?;
            let before = rows.len();
            rows.retain(|record| !belongs_to(kind, key, record));
            if rows.len() != before {
                self.save(dependent, &rows)?;
                debug!(%kind, key, %dependent, removed = before - rows.len(), "cascaded delete");
            }
        }
        Ok(true)
    }
}

/// File errors with a position become malformed-file errors on that line
fn csv_error(file: &str, err: csv::Error) -> RecordError {
    match err.position().map(|pos| pos.line() as usize) {
        Some(line) => RecordError::malformed_file(file, line, &err.to_string()),
        None => RecordError::Csv(err),
    }
}
