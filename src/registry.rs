use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Error;
use crate::model::{ResourceKind, ResourceRecord};

/// The single source of truth for what exists in one generation run.
///
/// Inserts may come from concurrent ingestion workers; everything after
/// ingestion treats the registry as read-only. Keys are (kind, name) and a
/// repeated key is a hard error, never an overwrite. BTreeMaps keep every
/// listing in sorted order so downstream output is reproducible.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<BTreeMap<ResourceKind, BTreeMap<String, Arc<ResourceRecord>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: ResourceRecord) -> Result<(), Error> {
        let kind = record.kind();
        let name = record.name().to_string();

        let mut inner = self.lock();
        let by_name = inner.entry(kind).or_default();
        if by_name.contains_key(&name) {
            return Err(Error::DuplicateResource { kind, name });
        }

        tracing::debug!(kind = %kind, name = %name, file = %record.origin.file.display(),
            "added resource to registry");
        by_name.insert(name, Arc::new(record));
        Ok(())
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<Arc<ResourceRecord>> {
        self.lock().get(&kind).and_then(|m| m.get(name)).cloned()
    }

    pub fn exists(&self, kind: ResourceKind, name: &str) -> bool {
        self.lock().get(&kind).is_some_and(|m| m.contains_key(name))
    }

    /// All records of one kind, sorted by name.
    pub fn list_by_kind(&self, kind: ResourceKind) -> Vec<Arc<ResourceRecord>> {
        self.lock()
            .get(&kind)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn names_by_kind(&self, kind: ResourceKind) -> Vec<String> {
        self.lock()
            .get(&kind)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.lock().get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn total_count(&self) -> usize {
        self.lock().values().map(BTreeMap::len).sum()
    }

    /// Which kind owns `name`, checking kinds in rule-table order. Used to
    /// type the untyped names in a CustomResources dependsOn list.
    pub fn kind_of(&self, name: &str) -> Option<ResourceKind> {
        let inner = self.lock();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| inner.get(kind).is_some_and(|m| m.contains_key(name)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ResourceKind, BTreeMap<String, Arc<ResourceRecord>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
