//! Typed boundary
//!
//! Converts application values to records with bincode before they reach
//! the core, and back again afterwards. The core never sees anything but
//! opaque bytes.
//!
//! Equal values must encode to equal bytes for intersection to treat them
//! as the same element. bincode's encoding is deterministic for a given
//! type, but types with unordered contents (e.g. `HashMap`) can encode the
//! same logical value differently; use ordered types for set elements.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{FpsetError, Result};
use crate::intersect::{intersect_sets_with, read_unique_set_with};
use crate::setfile::{read_set_with, SetWriter};

/// Encode each value and write the records to a new set file.
///
/// Returns the number of values written.
pub fn write_values<'a, T, I, P>(values: I, path: P) -> Result<u64>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    P: AsRef<Path>,
{
    write_values_with(values, path, &Config::default())
}

pub fn write_values_with<'a, T, I, P>(values: I, path: P, config: &Config) -> Result<u64>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut writer = SetWriter::create(path, config)?;
    let mut buf = Vec::new();

    for value in values {
        buf.clear();
        bincode::serialize_into(&mut buf, value).map_err(|e| codec_error(path, e))?;
        writer.append(&buf)?;
    }

    Ok(writer.finish()?.record_count)
}

/// Decode every record of a set file, duplicates included
pub fn read_values<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    read_values_with(path, &Config::default())
}

pub fn read_values_with<T, P>(path: P, config: &Config) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    decode_all(path, read_set_with(path, config)?)
}

/// Decode a set file into a `HashSet`
pub fn read_value_set<T, P>(path: P) -> Result<HashSet<T>>
where
    T: DeserializeOwned + Eq + Hash,
    P: AsRef<Path>,
{
    read_value_set_with(path, &Config::default())
}

pub fn read_value_set_with<T, P>(path: P, config: &Config) -> Result<HashSet<T>>
where
    T: DeserializeOwned + Eq + Hash,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let records = read_unique_set_with(path, config)?;
    Ok(decode_all(path, records)?.into_iter().collect())
}

/// Intersect set files and decode the common records
pub fn intersect_values<T, P>(paths: &[P]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    intersect_values_with(paths, &Config::default())
}

pub fn intersect_values_with<T, P>(paths: &[P], config: &Config) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let records = intersect_sets_with(paths, config)?;
    match paths.first() {
        Some(pivot) => decode_all(pivot.as_ref(), records),
        None => Err(FpsetError::EmptyInput),
    }
}

fn decode_all<T: DeserializeOwned>(path: &Path, records: Vec<Vec<u8>>) -> Result<Vec<T>> {
    records
        .iter()
        .map(|record| bincode::deserialize(record).map_err(|e| codec_error(path, e)))
        .collect()
}

fn codec_error(path: &Path, e: bincode::Error) -> FpsetError {
    FpsetError::Codec {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
