//! The persistence contract consumed by service and transport code.

use crate::error::CoreResult;
use crate::record::{Record, RecordId};
use crate::store::LinkStore;
use std::sync::Arc;

/// Operations the link-checking service needs from its storage.
///
/// [`LinkStore`] is the production implementation. Service code should
/// depend on this trait so it can be exercised against a fake.
pub trait LinkRepository: Send + Sync {
    /// Appends a committed record.
    fn save(&self, record: &Record) -> CoreResult<()>;

    /// Appends a record to the staging log.
    fn stage(&self, record: &Record) -> CoreResult<()>;

    /// Returns every staged record in staging order.
    fn load_staged(&self) -> CoreResult<Vec<Record>>;

    /// Truncates the staging log.
    fn clear_staged(&self) -> CoreResult<()>;

    /// Returns the first record with `id`, or a not-found error.
    fn get(&self, id: RecordId) -> CoreResult<Record>;

    /// Returns the last committed ID, 0 if there is none or it cannot be read.
    fn recover_last_id(&self) -> RecordId;
}

impl LinkRepository for LinkStore {
    fn save(&self, record: &Record) -> CoreResult<()> {
        LinkStore::save(self, record)
    }

    fn stage(&self, record: &Record) -> CoreResult<()> {
        LinkStore::stage(self, record)
    }

    fn load_staged(&self) -> CoreResult<Vec<Record>> {
        LinkStore::load_staged(self)
    }

    fn clear_staged(&self) -> CoreResult<()> {
        LinkStore::clear_staged(self)
    }

    fn get(&self, id: RecordId) -> CoreResult<Record> {
        LinkStore::get(self, id)
    }

    fn recover_last_id(&self) -> RecordId {
        LinkStore::recover_last_id(self)
    }
}

impl<T: LinkRepository + ?Sized> LinkRepository for Arc<T> {
    fn save(&self, record: &Record) -> CoreResult<()> {
        (**self).save(record)
    }

    fn stage(&self, record: &Record) -> CoreResult<()> {
        (**self).stage(record)
    }

    fn load_staged(&self) -> CoreResult<Vec<Record>> {
        (**self).load_staged()
    }

    fn clear_staged(&self) -> CoreResult<()> {
        (**self).clear_staged()
    }

    fn get(&self, id: RecordId) -> CoreResult<Record> {
        (**self).get(id)
    }

    fn recover_last_id(&self) -> RecordId {
        (**self).recover_last_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstore_storage::InMemoryBackend;

    /// One pass of the commit protocol, written against the trait only.
    fn check_and_commit(repo: &dyn LinkRepository, url: &str) -> CoreResult<RecordId> {
        let id = repo.recover_last_id() + 1;
        let record = Record::new(id).with_link(url, "available");
        repo.stage(&record)?;
        repo.save(&record)?;
        repo.clear_staged()?;
        Ok(id)
    }

    #[test]
    fn commit_protocol_through_trait_object() {
        let store = Arc::new(LinkStore::open_with_backends(
            Box::new(InMemoryBackend::new()),
            Box::new(InMemoryBackend::new()),
        ));

        assert_eq!(check_and_commit(&store, "http://a").unwrap(), 1);
        assert_eq!(check_and_commit(store.as_ref(), "http://b").unwrap(), 2);

        assert!(LinkRepository::load_staged(&store).unwrap().is_empty());
        assert_eq!(LinkRepository::get(&store, 2).unwrap().links["http://b"], "available");
        assert!(LinkRepository::get(&store, 3).unwrap_err().is_not_found());
    }
}
