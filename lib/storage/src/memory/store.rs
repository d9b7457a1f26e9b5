use crate::memory::StoreTransaction;
use pretty_turtle_model::{GraphName, Quad, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::hash::Hash;

pub(super) type QuadId = usize;

type Index<K> = FxHashMap<K, BTreeSet<QuadId>>;

/// An in-memory quad store that keeps track of what has already been consumed.
///
/// Every distinct quad receives a stable id on its first insertion. Removing a quad only marks its
/// slot as dead, so inserting it again restores the original id. As queries return quads in id
/// order, a quad that is rolled back re-appears at its original position.
///
/// The store has set semantics: inserting a quad that is already present has no effect.
#[derive(Clone, Debug, Default)]
pub struct MemoryQuadStore {
    quads: Vec<Quad>,
    live: Vec<bool>,
    ids: FxHashMap<Quad, QuadId>,
    by_subject: Index<Term>,
    by_predicate: Index<Term>,
    by_object: Index<Term>,
    by_graph_name: Index<GraphName>,
    len: usize,
}

impl MemoryQuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of quads that have not been consumed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.ids.get(quad).is_some_and(|id| self.live[*id])
    }

    /// Inserts the quad. Returns `false` if it was already present.
    pub fn insert(&mut self, quad: Quad) -> bool {
        if let Some(id) = self.ids.get(&quad).copied() {
            return self.restore(id);
        }

        let id = self.quads.len();
        self.ids.insert(quad.clone(), id);
        self.quads.push(quad);
        self.live.push(false);
        self.restore(id)
    }

    /// Removes the quad. Returns `false` if it was not present.
    pub fn remove(&mut self, quad: &Quad) -> bool {
        match self.ids.get(quad).copied() {
            Some(id) => self.remove_id(id),
            None => false,
        }
    }

    /// Returns all quads matching the pattern. [`None`] matches any term.
    pub fn quads_for_pattern(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Vec<Quad> {
        self.ids_for_pattern(subject, predicate, object, graph_name)
            .into_iter()
            .map(|id| self.quads[id].clone())
            .collect()
    }

    pub fn count_for_pattern(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> usize {
        self.ids_for_pattern(subject, predicate, object, graph_name)
            .len()
    }

    pub fn has_quads_for_pattern(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> bool {
        self.candidates(subject, predicate, object, graph_name)
            .is_some_and(|mut ids| {
                ids.any(|id| self.matches(id, subject, predicate, object, graph_name))
            })
    }

    /// Returns the number of quads in `graph_name` whose subject is `subject`.
    pub fn count_quads_with_subject(&self, subject: &Term, graph_name: Option<&GraphName>) -> usize {
        self.count_for_pattern(Some(subject), None, None, graph_name)
    }

    /// Removes all quads matching the pattern and returns them.
    pub fn take_quads_for_pattern(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Vec<Quad> {
        self.take_ids_for_pattern(subject, predicate, object, graph_name)
            .into_iter()
            .map(|id| self.quads[id].clone())
            .collect()
    }

    /// Removes all quads with the given subject and predicate and returns their objects.
    pub fn take_objects(
        &mut self,
        subject: &Term,
        predicate: &Term,
        graph_name: Option<&GraphName>,
    ) -> Vec<Term> {
        self.take_quads_for_pattern(Some(subject), Some(predicate), None, graph_name)
            .into_iter()
            .map(|quad| quad.object)
            .collect()
    }

    /// Returns the distinct subjects in the graph, in order of first insertion.
    pub fn subjects(&self, graph_name: Option<&GraphName>) -> Vec<Term> {
        distinct(
            self.ids_for_pattern(None, None, None, graph_name)
                .into_iter()
                .map(|id| &self.quads[id].subject),
        )
    }

    /// Returns the distinct predicates used with `subject`, in order of first insertion.
    pub fn predicates(&self, subject: &Term, graph_name: Option<&GraphName>) -> Vec<Term> {
        distinct(
            self.ids_for_pattern(Some(subject), None, None, graph_name)
                .into_iter()
                .map(|id| &self.quads[id].predicate),
        )
    }

    /// Returns the distinct graph names that still contain quads, in order of first insertion.
    pub fn graph_names(&self) -> Vec<GraphName> {
        let mut graph_names = self
            .by_graph_name
            .iter()
            .filter_map(|(graph_name, ids)| Some((*ids.first()?, graph_name.clone())))
            .collect::<Vec<_>>();
        graph_names.sort_unstable_by_key(|(id, _)| *id);
        graph_names.into_iter().map(|(_, graph_name)| graph_name).collect()
    }

    /// Starts a transaction. Consuming queries issued through the transaction are undone if `f`
    /// returns [`None`].
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut StoreTransaction<'_>) -> Option<T>,
    ) -> Option<T> {
        let mut transaction = StoreTransaction::new(self);
        let result = f(&mut transaction);
        if result.is_none() {
            transaction.rollback();
        }
        result
    }

    pub(super) fn take_ids_for_pattern(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Vec<QuadId> {
        let ids = self.ids_for_pattern(subject, predicate, object, graph_name);
        for id in &ids {
            self.remove_id(*id);
        }
        ids
    }

    pub(super) fn quad(&self, id: QuadId) -> &Quad {
        &self.quads[id]
    }

    pub(super) fn restore(&mut self, id: QuadId) -> bool {
        if self.live[id] {
            return false;
        }
        self.live[id] = true;
        self.len += 1;

        let quad = &self.quads[id];
        add_to_index(&mut self.by_subject, &quad.subject, id);
        add_to_index(&mut self.by_predicate, &quad.predicate, id);
        add_to_index(&mut self.by_object, &quad.object, id);
        add_to_index(&mut self.by_graph_name, &quad.graph_name, id);
        true
    }

    fn remove_id(&mut self, id: QuadId) -> bool {
        if !self.live[id] {
            return false;
        }
        self.live[id] = false;
        self.len -= 1;

        let quad = &self.quads[id];
        remove_from_index(&mut self.by_subject, &quad.subject, id);
        remove_from_index(&mut self.by_predicate, &quad.predicate, id);
        remove_from_index(&mut self.by_object, &quad.object, id);
        remove_from_index(&mut self.by_graph_name, &quad.graph_name, id);
        true
    }

    fn ids_for_pattern(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Vec<QuadId> {
        match self.candidates(subject, predicate, object, graph_name) {
            Some(ids) => ids
                .filter(|id| self.matches(*id, subject, predicate, object, graph_name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the ids of the smallest index that is bound by the pattern, in ascending order.
    ///
    /// Returns [`None`] if a bound term does not occur at all.
    fn candidates<'a>(
        &'a self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> Option<Box<dyn Iterator<Item = QuadId> + 'a>> {
        let mut smallest: Option<&'a BTreeSet<QuadId>> = None;
        let lookups = [
            subject.map(|term| self.by_subject.get(term)),
            predicate.map(|term| self.by_predicate.get(term)),
            object.map(|term| self.by_object.get(term)),
            graph_name.map(|graph_name| self.by_graph_name.get(graph_name)),
        ];
        for lookup in lookups.into_iter().flatten() {
            let ids = lookup?;
            if smallest.map_or(true, |current| ids.len() < current.len()) {
                smallest = Some(ids);
            }
        }

        Some(match smallest {
            Some(ids) => Box::new(ids.iter().copied()),
            None => Box::new((0..self.quads.len()).filter(|id| self.live[*id])),
        })
    }

    fn matches(
        &self,
        id: QuadId,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph_name: Option<&GraphName>,
    ) -> bool {
        let quad = &self.quads[id];
        subject.map_or(true, |s| *s == quad.subject)
            && predicate.map_or(true, |p| *p == quad.predicate)
            && object.map_or(true, |o| *o == quad.object)
            && graph_name.map_or(true, |g| *g == quad.graph_name)
    }
}

impl FromIterator<Quad> for MemoryQuadStore {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl Extend<Quad> for MemoryQuadStore {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

fn add_to_index<K: Eq + Hash + Clone>(index: &mut Index<K>, key: &K, id: QuadId) {
    if let Some(ids) = index.get_mut(key) {
        ids.insert(id);
    } else {
        index.insert(key.clone(), BTreeSet::from([id]));
    }
}

fn remove_from_index<K: Eq + Hash>(index: &mut Index<K>, key: &K, id: QuadId) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

fn distinct<'a>(terms: impl Iterator<Item = &'a Term>) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    terms
        .filter(|term| seen.insert(*term))
        .cloned()
        .collect()
}
