//! File reading utilities.

use std::fs::File;
use std::path::Path;
use std::{fs, io};

use serde::de::DeserializeOwned;
use serde_json::from_reader;

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, io::Error> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

pub trait FromJsonFile<D> {
    fn from_json_file(path: impl AsRef<Path>) -> Result<D, io::Error>;
}

impl<D: DeserializeOwned> FromJsonFile<D> for D {
    fn from_json_file(path: impl AsRef<Path>) -> Result<D, io::Error> {
        read_json(path)
    }
}

/// Reads a pasted-text input, treating a blank file as absent.
pub fn read_text(path: impl AsRef<Path>) -> Result<Option<String>, io::Error> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
