use crate::memory::store::{MemoryQuadStore, QuadId};
use pretty_turtle_model::{GraphName, Quad, Term};
use std::ops::Deref;

/// A speculative sequence of consuming queries against a [`MemoryQuadStore`].
///
/// Read-only queries are available through [`Deref`]. Every quad taken through the transaction is
/// logged so that [`MemoryQuadStore::transaction`] can put all of them back in one batch.
#[derive(Debug)]
pub struct StoreTransaction<'store> {
    store: &'store mut MemoryQuadStore,
    log: Vec<QuadId>,
}

impl<'store> StoreTransaction<'store> {
    pub(super) fn new(store: &'store mut MemoryQuadStore) -> Self {
        Self {
            store,
            log: Vec::new(),
        }
    }

    /// Removes all quads matching the pattern and returns them.
    pub fn take_quads_for_pattern(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Vec<Quad> {
        let ids = self
            .store
            .take_ids_for_pattern(subject, predicate, object, graph_name);
        let quads = ids
            .iter()
            .map(|id| self.store.quad(*id).clone())
            .collect();
        self.log.extend(ids);
        quads
    }

    pub(super) fn rollback(self) {
        for id in self.log {
            self.store.restore(id);
        }
    }
}

impl Deref for StoreTransaction<'_> {
    type Target = MemoryQuadStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}
