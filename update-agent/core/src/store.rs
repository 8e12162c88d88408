//! Persisted key-value state, injected into the agent.
//!
//! The device keeps its check state in a small namespace-scoped store that
//! survives power cycles. The agent never talks to the persistence hardware
//! directly; it goes through [`StateStore`] so the decision logic can be
//! exercised against [`MemoryStore`] on a host.
use std::collections::HashMap;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed opening persistent store")]
    Open(#[source] BoxError),
    #[error("failed reading key `{key}` from persistent store")]
    Get {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("failed writing key `{key}` to persistent store")]
    Set {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("failed committing persistent store")]
    Commit(#[source] BoxError),
}

impl Error {
    pub fn open(source: impl Into<BoxError>) -> Self {
        Self::Open(source.into())
    }

    pub fn get(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Get {
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub fn set(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Set {
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub fn commit(source: impl Into<BoxError>) -> Self {
        Self::Commit(source.into())
    }
}

/// Scoped access to the device's persisted key-value state.
///
/// `set_*` calls stage a value; [`StateStore::commit`] makes everything
/// staged so far durable. A crash between commits must leave the previously
/// committed values intact. Absent keys read as `None` and callers default
/// them to zero/empty.
pub trait StateStore {
    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, Error>;
    fn set_u32(&mut self, key: &str, value: u32) -> Result<(), Error>;
    fn get_string(&mut self, key: &str) -> Result<Option<String>, Error>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), Error>;
    fn commit(&mut self) -> Result<(), Error>;
}

/// Volatile [`StateStore`] for tests and hosts without persistence hardware.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ints: HashMap<String, u32>,
    strings: HashMap<String, String>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits performed so far. Lets tests assert that state was
    /// made durable at the right points of a pass.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl StateStore for MemoryStore {
    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, Error> {
        Ok(self.ints.get(key).copied())
    }

    fn set_u32(&mut self, key: &str, value: u32) -> Result<(), Error> {
        self.ints.insert(key.to_owned(), value);
        Ok(())
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.strings.get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.strings.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        self.commits += 1;
        Ok(())
    }
}
