use crate::error::SerializerError;
use crate::formatter::TermFormatter;
use crate::sink::TurtleSink;
use pretty_turtle_model::vocab::rdf;
use pretty_turtle_model::{BlankNode, GraphName, Term};
use pretty_turtle_storage::memory::MemoryQuadStore;
use rustc_hash::FxHashSet;
use std::io::Write;
use tracing::trace;

/// Blank nodes nested deeper than this are written with their label instead of `[ ... ]`.
const MAX_NESTING_DEPTH: usize = 64;

/// Writes the statements of a [`MemoryQuadStore`], consuming every quad it emits.
///
/// The graph being written is passed down explicitly. Only the recursion into an N3 formula
/// changes it.
pub(crate) struct GraphWriter<W: Write> {
    store: MemoryQuadStore,
    sink: TurtleSink<W>,
    formatter: TermFormatter,
    /// Blank nodes that must be written with their label.
    explicit: FxHashSet<BlankNode>,
    n3: bool,
    ordered: bool,
}

impl<W: Write> GraphWriter<W> {
    pub fn new(
        store: MemoryQuadStore,
        sink: TurtleSink<W>,
        formatter: TermFormatter,
        explicit: FxHashSet<BlankNode>,
        n3: bool,
        ordered: bool,
    ) -> Self {
        Self {
            store,
            sink,
            formatter,
            explicit,
            n3,
            ordered,
        }
    }

    pub fn into_parts(self) -> (MemoryQuadStore, TurtleSink<W>, TermFormatter) {
        (self.store, self.sink, self.formatter)
    }

    /// Writes all subjects of `graph` in four passes.
    ///
    /// Every pass re-queries the store because the previous ones consumed quads.
    pub fn write_graph(&mut self, graph: &GraphName) -> Result<(), SerializerError> {
        let graph_term = Term::from_graph_name(graph);

        let subjects = self.subjects(graph);
        trace!(?graph, subjects = subjects.len(), "Writing graph");
        for subject in subjects.iter().filter(|s| s.is_named_node()) {
            if self.has_subject(subject, graph) {
                self.write_subject(subject, graph, false)?;
            }
        }

        // Blank nodes that are referenced nowhere else are written as `[]`
        for subject in self.blank_subjects(graph) {
            if !self.is_explicit(&subject)
                && graph_term.as_ref() != Some(&subject)
                && self.has_subject(&subject, graph)
                && !self
                    .store
                    .has_quads_for_pattern(None, Some(&subject), None, Some(graph))
                && !self
                    .store
                    .has_quads_for_pattern(None, None, Some(&subject), Some(graph))
            {
                self.write_subject(&subject, graph, true)?;
            }
        }

        // Blank nodes whose only reference is a loop on themselves
        for subject in self.blank_subjects(graph) {
            let references = self
                .store
                .quads_for_pattern(None, None, Some(&subject), Some(graph));
            if let [reference] = references.as_slice() {
                if reference.subject == subject {
                    self.mark_explicit(&subject);
                    self.write_subject(&subject, graph, false)?;
                }
            }
        }

        for subject in self.subjects(graph) {
            if self.has_subject(&subject, graph) {
                self.mark_explicit(&subject);
                self.write_subject(&subject, graph, false)?;
            }
        }
        Ok(())
    }

    fn write_subject(
        &mut self,
        subject: &Term,
        graph: &GraphName,
        anonymous: bool,
    ) -> Result<(), SerializerError> {
        if self.write_formula(subject, graph)?
            || (self.n3 && self.write_list(subject, graph, true, 0)?)
        {
            // The subject has been written as a formula or a collection
        } else if anonymous {
            self.sink.write_str("[]")?;
        } else {
            let subject = self.formatter.term(subject)?;
            self.sink.write_str(&subject)?;
        }

        self.sink.write_str(" ")?;
        self.sink.indent();
        self.write_predicates(subject, graph, 0)?;
        self.sink.deindent();
        self.sink.write_str(" .")?;
        let line_breaks = if self.store.has_quads_for_pattern(None, None, None, Some(graph)) {
            2
        } else {
            1
        };
        self.sink.new_line(line_breaks);
        Ok(())
    }

    /// Writes `{ ... }` if `term` names a graph that still contains quads.
    fn write_formula(&mut self, term: &Term, graph: &GraphName) -> Result<bool, SerializerError> {
        if !self.names_formula(term, graph) {
            return Ok(false);
        }
        let Some(formula) = term.to_graph_name() else {
            return Ok(false);
        };

        self.sink.write_str("{")?;
        self.sink.indent();
        self.sink.new_line(1);
        self.write_graph(&formula)?;
        self.sink.deindent();
        self.sink.write_str("}")?;
        Ok(true)
    }

    /// `depth` is the number of `[ ... ]`, `( ... )` and `{| ... |}` blocks around the statements.
    fn write_predicates(
        &mut self,
        subject: &Term,
        graph: &GraphName,
        depth: usize,
    ) -> Result<(), SerializerError> {
        let mut predicates = self.store.predicates(subject, Some(graph));
        if self.ordered {
            predicates.sort();
        }

        let mut first = true;
        if predicates.iter().any(|p| *p == rdf::TYPE) {
            let rdf_type = Term::from(rdf::TYPE);
            let types = self.take_objects(subject, &rdf_type, graph);
            if !types.is_empty() {
                first = false;
                self.sink.write_str("a ")?;
                self.write_objects(types, Some((subject, &rdf_type)), graph, depth)?;
            }
        }

        for predicate in predicates.iter().filter(|p| **p != rdf::TYPE) {
            let objects = self.take_objects(subject, predicate, graph);
            if objects.is_empty() {
                continue;
            }
            if first {
                first = false;
            } else {
                self.sink.write_str(" ;")?;
                self.sink.new_line(1);
            }
            let predicate_str = self.formatter.predicate(predicate)?;
            self.sink.write_str(&predicate_str)?;
            self.sink.write_str(" ")?;
            self.write_objects(objects, Some((subject, predicate)), graph, depth)?;
        }
        Ok(())
    }

    /// Writes a comma separated object list.
    ///
    /// `statement` is the subject and predicate the objects belong to, if any. It is used to find
    /// annotations of the written triples.
    fn write_objects(
        &mut self,
        objects: Vec<Term>,
        statement: Option<(&Term, &Term)>,
        graph: &GraphName,
        depth: usize,
    ) -> Result<(), SerializerError> {
        let mut inline = Vec::new();
        let mut plain = Vec::new();
        for object in objects {
            if self.is_inlinable(&object, graph, depth) {
                inline.push(object);
            } else {
                self.mark_explicit(&object);
                plain.push(object);
            }
        }
        if self.ordered {
            inline.sort();
            plain.sort();
        }

        let mut comma = false;
        let mut after_quoted_triple = false;
        self.sink.indent();
        for object in &plain {
            if comma {
                self.sink.write_str(",")?;
                if after_quoted_triple {
                    self.sink.new_line(1);
                } else {
                    self.sink.write_str(" ")?;
                }
            }
            let object_str = self.formatter.term(object)?;
            self.sink.write_str(&object_str)?;
            after_quoted_triple = object.is_triple();
            self.write_annotation(statement, object, graph, depth)?;
            comma = true;
        }
        self.sink.deindent();

        for object in &inline {
            if comma {
                self.sink.write_str(", ")?;
            }
            comma = true;

            if self.write_formula(object, graph)? {
                continue;
            }
            if !self.write_list(object, graph, false, depth)? {
                self.sink.write_str("[")?;
                if self.has_subject(object, graph) {
                    self.sink.indent();
                    self.sink.new_line(1);
                    self.write_predicates(object, graph, depth + 1)?;
                    self.sink.deindent();
                    self.sink.new_line(1);
                }
                self.sink.write_str("]")?;
            }
            self.write_annotation(statement, object, graph, depth)?;
        }
        Ok(())
    }

    /// Writes `{| ... |}` if the triple `statement object` is itself the subject of quads.
    fn write_annotation(
        &mut self,
        statement: Option<(&Term, &Term)>,
        object: &Term,
        graph: &GraphName,
        depth: usize,
    ) -> Result<(), SerializerError> {
        let Some((subject, predicate)) = statement else {
            return Ok(());
        };
        let triple = Term::quoted(subject.clone(), predicate.clone(), object.clone());
        if self.has_subject(&triple, graph) {
            self.sink.write_str(" {| ")?;
            self.write_predicates(&triple, graph, depth + 1)?;
            self.sink.write_str(" |}")?;
        }
        Ok(())
    }

    /// Writes `( ... )` if `head` starts a well formed collection.
    ///
    /// The collection quads are consumed speculatively and put back if the chain turns out to be
    /// malformed. In subject position the head must keep other statements to be written after the
    /// collection, while no other node of the chain may have any.
    fn write_list(
        &mut self,
        head: &Term,
        graph: &GraphName,
        is_subject: bool,
        depth: usize,
    ) -> Result<bool, SerializerError> {
        let explicit = &self.explicit;
        let (first_predicate, rest_predicate) = (Term::from(rdf::FIRST), Term::from(rdf::REST));
        let elements = self.store.transaction(|transaction| {
            let mut elements = Vec::new();
            let mut node = head.clone();
            let mut first_step = true;
            while node != rdf::NIL {
                if !node.is_blank_node() || node.as_blank_node().is_some_and(|b| explicit.contains(b))
                {
                    return None;
                }
                if !first_step
                    && transaction.has_quads_for_pattern(None, None, Some(&node), Some(graph))
                {
                    return None;
                }

                let first = transaction.take_quads_for_pattern(
                    Some(&node),
                    Some(&first_predicate),
                    None,
                    Some(graph),
                );
                let rest = transaction.take_quads_for_pattern(
                    Some(&node),
                    Some(&rest_predicate),
                    None,
                    Some(graph),
                );
                let [first] = <[_; 1]>::try_from(first).ok()?;
                let [rest] = <[_; 1]>::try_from(rest).ok()?;

                let has_more = transaction.has_quads_for_pattern(Some(&node), None, None, Some(graph));
                if has_more != (first_step && is_subject) {
                    return None;
                }

                elements.push(first.object);
                node = rest.object;
                first_step = false;
            }
            Some(elements)
        });
        let Some(elements) = elements else {
            trace!(%head, "Not a well formed collection, rolled back");
            return Ok(false);
        };

        self.sink.write_str("(")?;
        for (i, element) in elements.into_iter().enumerate() {
            if i > 0 {
                self.sink.write_str(" ")?;
            }
            self.write_objects(vec![element], None, graph, depth + 1)?;
        }
        self.sink.write_str(")")?;
        Ok(true)
    }

    /// A blank object can be nested in place if nothing else refers to it.
    ///
    /// Past [`MAX_NESTING_DEPTH`] only formulas are nested. Other blank nodes get a label and are
    /// written later as subjects, which bounds the recursion.
    fn is_inlinable(&self, object: &Term, graph: &GraphName, depth: usize) -> bool {
        object.is_blank_node()
            && !self.is_explicit(object)
            && (depth < MAX_NESTING_DEPTH || self.names_formula(object, graph))
            && !self
                .store
                .has_quads_for_pattern(None, None, Some(object), Some(graph))
            && !self
                .store
                .has_quads_for_pattern(None, Some(object), None, Some(graph))
    }

    /// Whether `term` names a graph other than `graph` that still contains quads.
    fn names_formula(&self, term: &Term, graph: &GraphName) -> bool {
        self.n3
            && term.to_graph_name().is_some_and(|formula| {
                formula != *graph
                    && self
                        .store
                        .has_quads_for_pattern(None, None, None, Some(&formula))
            })
    }

    fn is_explicit(&self, term: &Term) -> bool {
        term.as_blank_node()
            .is_some_and(|node| self.explicit.contains(node))
    }

    fn mark_explicit(&mut self, term: &Term) {
        if let Some(node) = term.as_blank_node() {
            if !self.explicit.contains(node) {
                self.explicit.insert(node.clone());
            }
        }
    }

    fn has_subject(&self, subject: &Term, graph: &GraphName) -> bool {
        self.store
            .has_quads_for_pattern(Some(subject), None, None, Some(graph))
    }

    fn take_objects(&mut self, subject: &Term, predicate: &Term, graph: &GraphName) -> Vec<Term> {
        let mut objects = self.store.take_objects(subject, predicate, Some(graph));
        if self.ordered {
            objects.sort();
        }
        objects
    }

    fn subjects(&self, graph: &GraphName) -> Vec<Term> {
        let mut subjects = self.store.subjects(Some(graph));
        if self.ordered {
            subjects.sort();
        }
        subjects
    }

    fn blank_subjects(&self, graph: &GraphName) -> Vec<Term> {
        let mut subjects = self.subjects(graph);
        subjects.retain(Term::is_blank_node);
        subjects
    }
}
