use log::debug;

use crate::config::{DedupField, Response};
use crate::error::StorageError;

/// Durable, append-only storage of the responses.
///
/// Implementations must not cache between calls: the data behind a store may be
/// changed by other sessions (a shared spreadsheet for example).
/// There is no locking either, so a check with `exists` followed by an `append`
/// is not atomic.
pub trait ResponseStore {
    /// All the responses, in storage order.
    fn list_all(&self) -> Result<Vec<Response>, StorageError>;

    /// Adds one response at the end of the store.
    fn append(&mut self, response: &Response) -> Result<(), StorageError>;

    /// Which contact field, if any, is already used by a stored response.
    fn exists(&self, email: &str, whatsapp: &str) -> Result<Option<DedupField>, StorageError> {
        let responses = self.list_all()?;
        debug!("exists: scanning {} responses", responses.len());
        Ok(find_conflict(&responses, email, whatsapp))
    }
}

impl<S: ResponseStore + ?Sized> ResponseStore for Box<S> {
    fn list_all(&self) -> Result<Vec<Response>, StorageError> {
        (**self).list_all()
    }

    fn append(&mut self, response: &Response) -> Result<(), StorageError> {
        (**self).append(response)
    }

    fn exists(&self, email: &str, whatsapp: &str) -> Result<Option<DedupField>, StorageError> {
        (**self).exists(email, whatsapp)
    }
}

/// Exact, case-sensitive comparison. A known email wins over a known number.
pub fn find_conflict(responses: &[Response], email: &str, whatsapp: &str) -> Option<DedupField> {
    if responses.iter().any(|r| r.email == email) {
        Some(DedupField::Email)
    } else if responses.iter().any(|r| r.whatsapp == whatsapp) {
        Some(DedupField::Whatsapp)
    } else {
        None
    }
}

/// A store that only lives in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryStore {
    responses: Vec<Response>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_responses(responses: Vec<Response>) -> MemoryStore {
        MemoryStore { responses }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl ResponseStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Response>, StorageError> {
        Ok(self.responses.clone())
    }

    fn append(&mut self, response: &Response) -> Result<(), StorageError> {
        self.responses.push(response.clone());
        Ok(())
    }
}
