//! A collection of records held in memory and mirrored to a JSON file on every write.
//!
//! Each collection `name` lives in two files inside the data directory:
//! `<name>.json` holds the array of records and `<name>.seq.json` holds the
//! last ID handed out, so that IDs are never reused after a deletion.
//!
//! Rows that cannot be read as a record are kept as they are and written
//! back after the readable records, so one bad row never costs the others.

use std::{
    cmp::max,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::Error;

/// A record with an integer ID that is unique within its collection.
pub trait Record {
    /// The ID of the record.
    fn record_id(&self) -> i64;
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sequence {
    last_id: i64,
}

/// An ordered list of records backed by a JSON file.
///
/// Writes go to disk before the in-memory records are replaced, so the
/// in-memory view never holds a change that failed to persist.
#[derive(Debug)]
pub struct Collection<T> {
    path: PathBuf,
    sequence_path: PathBuf,
    records: Vec<T>,
    unreadable: Vec<Value>,
    last_id: i64,
}

impl<T> Collection<T>
where
    T: Record + Clone + Serialize + DeserializeOwned,
{
    /// Load the collection `name` from `data_dir`.
    ///
    /// A missing or corrupt file is treated as an empty collection. Corrupt
    /// files are logged, not overwritten, until the next write. Rows that are
    /// not valid records are logged and set aside: they are not visible as
    /// records but are written back unchanged and their IDs are not reused.
    pub fn open(data_dir: &Path, name: &str) -> Self {
        let path = data_dir.join(format!("{name}.json"));
        let sequence_path = data_dir.join(format!("{name}.seq.json"));

        let rows: Vec<Value> = load_json(&path);
        let (records, unreadable) = parse_rows(&path, rows);
        let sequence: Sequence = load_json(&sequence_path);
        let max_record_id = records
            .iter()
            .map(Record::record_id)
            .chain(unreadable.iter().filter_map(|row| row.get("id")?.as_i64()))
            .max()
            .unwrap_or(0);

        tracing::debug!(
            "Loaded {} records from {} and set aside {} unreadable rows",
            records.len(),
            path.display(),
            unreadable.len()
        );

        Self {
            path,
            sequence_path,
            records,
            unreadable,
            last_id: max(sequence.last_id, max_record_id),
        }
    }

    /// The records in insertion order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Append the record created by `build`, which receives the next free ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::Storage] if either file could not be written. The ID is
    /// consumed even if writing the records fails.
    pub fn insert(&mut self, build: impl FnOnce(i64) -> T) -> Result<T, Error> {
        let id = self.last_id + 1;
        write_json_atomic(&self.sequence_path, &Sequence { last_id: id })?;
        self.last_id = id;

        let record = build(id);
        let mut records = self.records.clone();
        records.push(record.clone());
        self.replace(records)?;

        Ok(record)
    }

    /// Overwrite the whole collection with `records`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Storage] if the file could not be written, in which
    /// case the collection is left unchanged.
    pub fn replace(&mut self, records: Vec<T>) -> Result<(), Error> {
        let mut rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| Error::Storage(format!("{}: {error}", self.path.display())))?;
        rows.extend(self.unreadable.iter().cloned());

        write_json_atomic(&self.path, &rows)?;
        self.records = records;

        Ok(())
    }
}

/// Split `rows` into the ones that parse as records and the ones that do not.
fn parse_rows<T>(path: &Path, rows: Vec<Value>) -> (Vec<T>, Vec<Value>)
where
    T: DeserializeOwned,
{
    let mut records = Vec::with_capacity(rows.len());
    let mut unreadable = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        match T::deserialize(&row) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::error!("Skipping row {index} of {}: {error}", path.display());
                unreadable.push(row);
            }
        }
    }

    (records, unreadable)
}

/// Read JSON from `path`, falling back to the default value if the file is
/// missing, empty or cannot be parsed.
fn load_json<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return T::default();
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("Error reading {}: {error}", path.display());
            return T::default();
        }
    };

    if text.trim().is_empty() {
        return T::default();
    }

    serde_json::from_str(&text).unwrap_or_else(|error| {
        tracing::error!("Error parsing {}: {error}", path.display());
        T::default()
    })
}

/// Write `data` as pretty JSON to a temporary file next to `path`, then
/// rename it over `path`.
fn write_json_atomic<T>(path: &Path, data: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    let storage_error = |error: &dyn std::fmt::Display| {
        Error::Storage(format!("{}: {error}", path.display()))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| storage_error(&error))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|error| storage_error(&error))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|error| storage_error(&error))?;
    writer.flush().map_err(|error| storage_error(&error))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|error| storage_error(&error))?;

    fs::rename(&temp_path, path).map_err(|error| {
        let _ = fs::remove_file(&temp_path);
        storage_error(&error)
    })
}
