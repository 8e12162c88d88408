//! JSON-file-backed implementation of the persisted state store.
use std::{collections::HashMap, fs, io, path::PathBuf};

use trmnl_update_agent_core::store::{Error, StateStore};

/// Persists the check state as a flat JSON object on disk.
///
/// `set_*` calls stage values in memory; `commit` rewrites the file, so a
/// crash between commits leaves the previously committed values intact.
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, serde_json::Value>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty when no file exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(contents) => serde_json::from_slice(&contents).map_err(Error::open)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::open(e)),
        };
        Ok(Self { path, values })
    }
}

impl StateStore for FileStore {
    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, Error> {
        Ok(self
            .values
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|value| u32::try_from(value).ok()))
    }

    fn set_u32(&mut self, key: &str, value: u32) -> Result<(), Error> {
        self.values.insert(key.to_owned(), value.into());
        Ok(())
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .values
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned))
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.values.insert(key.to_owned(), value.into());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        let contents = serde_json::to_vec(&self.values).map_err(Error::commit)?;
        fs::write(&self.path, contents).map_err(Error::commit)
    }
}
