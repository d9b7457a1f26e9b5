use crate::base_iri::BaseIri;
use crate::error::{ConfigurationError, SerializerError, StructureError};
use crate::escape::{escape_iri, is_valid_prefix_name};
use crate::format::TurtleFormat;
use crate::formatter::{used_namespaces, TermFormatter};
use crate::prefix::PrefixTable;
use crate::sink::TurtleSink;
use crate::writer::GraphWriter;
use pretty_turtle_model::{BlankNode, GraphName, Quad, Term};
use pretty_turtle_storage::memory::MemoryQuadStore;
use rustc_hash::FxHashSet;
use std::io::{self, Write};
use tracing::debug;

/// A pretty [Turtle](https://www.w3.org/TR/turtle/) and [N3](https://w3c.github.io/N3/spec/)
/// serializer.
///
/// In contrast to a streaming serializer, the whole graph is loaded in memory first. This allows
/// nesting blank nodes, writing RDF collections as `( ... )`, grouping the statements by subject
/// and, in N3, writing formulas as `{ ... }`.
///
/// ```
/// use pretty_turtle::TurtleSerializer;
/// use pretty_turtle_model::vocab::rdf;
/// use pretty_turtle_model::{NamedNode, Quad};
///
/// let quads = [Quad::triple(
///     NamedNode::new("http://example.com/ns#me")?,
///     rdf::TYPE,
///     NamedNode::new("http://schema.org/Person")?,
/// )];
/// let turtle = TurtleSerializer::new()
///     .with_prefix("schema", "http://schema.org/")?
///     .serialize_to_string(quads)?;
/// assert_eq!(
///     turtle,
///     "@prefix schema: <http://schema.org/> .\n@prefix ex: <http://example.com/ns#> .\n\nex:me a schema:Person .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct TurtleSerializer {
    format: TurtleFormat,
    prefixes: Vec<(String, String)>,
    base_iri: Option<BaseIri>,
    explicit_base_iri: bool,
    compact: bool,
    ordered: bool,
    implied_by: bool,
}

impl TurtleSerializer {
    /// Builds a new Turtle serializer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_format(format: TurtleFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Sets the format from a media type (`text/n3`) or a file extension (`n3`).
    pub fn with_format_name(mut self, name: &str) -> Result<Self, ConfigurationError> {
        self.format = name.parse()?;
        Ok(self)
    }

    /// Offers a prefix. It is only declared if some written IRI uses it.
    ///
    /// A prefix with the same label replaces the previous one.
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let prefix_name = prefix_name.into();
        if !is_valid_prefix_name(&prefix_name) {
            return Err(ConfigurationError::InvalidPrefixName(prefix_name));
        }
        let prefix_iri = prefix_iri.into();
        match self
            .prefixes
            .iter_mut()
            .find(|(label, _)| *label == prefix_name)
        {
            Some((_, iri)) => *iri = prefix_iri,
            None => self.prefixes.push((prefix_name, prefix_iri)),
        }
        Ok(self)
    }

    /// Writes IRIs relative to `base_iri` when the relative form is shorter.
    ///
    /// An invalid or relative base IRI is ignored.
    pub fn with_base_iri(mut self, base_iri: &str) -> Self {
        match BaseIri::parse(base_iri) {
            Ok(base_iri) => {
                debug!(base_iri = base_iri.as_str(), "Using base IRI");
                self.base_iri = Some(base_iri);
            }
            Err(error) => {
                debug!(base_iri, %error, "Ignoring invalid base IRI");
                self.base_iri = None;
            }
        }
        self
    }

    /// Writes an `@base` directive for the base IRI.
    pub fn with_explicit_base_iri(mut self) -> Self {
        self.explicit_base_iri = true;
        self
    }

    /// Writes everything on a single line.
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    /// Sorts prefixes, subjects, predicates and objects so that the output only depends on the
    /// set of quads and not on their order.
    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    /// Writes `log:isImpliedBy` as `<=` in N3.
    pub fn with_implied_by(mut self) -> Self {
        self.implied_by = true;
        self
    }

    pub fn format(&self) -> TurtleFormat {
        self.format
    }

    /// Serializes the quads to `writer` and returns it.
    ///
    /// Nothing is written if the quads cannot be serialized. If writing fails midway, the
    /// content of `writer` must be discarded.
    pub fn serialize_to_writer<W: Write>(
        &self,
        quads: impl IntoIterator<Item = Quad>,
        writer: W,
    ) -> Result<W, SerializerError> {
        let store = quads.into_iter().collect::<MemoryQuadStore>();
        debug!(format = %self.format, quads = store.len(), "Serializing quads");
        self.validate(&store)?;

        let n3 = self.format == TurtleFormat::N3;
        let quads = store.quads_for_pattern(None, None, None, None);
        let prefixes = PrefixTable::select(
            &self.prefixes,
            &used_namespaces(&quads, n3, self.implied_by),
            self.ordered,
        );
        let formatter = TermFormatter::new(n3, self.implied_by, prefixes, self.base_iri.clone());

        let mut graph_writer = GraphWriter::new(
            store,
            TurtleSink::new(Vec::new(), self.compact),
            formatter,
            quoted_blank_nodes(&quads),
            n3,
            self.ordered,
        );
        graph_writer.write_graph(&GraphName::DefaultGraph)?;
        let (store, body, formatter) = graph_writer.into_parts();
        if let Some(graph) = store.graph_names().into_iter().next() {
            return Err(StructureError::UnreachableGraph {
                remaining: store.count_for_pattern(None, None, None, Some(&graph)),
                graph: graph.to_string(),
            }
            .into());
        }
        let body = body.finish()?;

        let prefixes = formatter.into_used_prefixes();
        debug!(
            prefixes = ?prefixes.iter().map(|(label, _)| label).collect::<Vec<_>>(),
            "Declaring prefixes"
        );
        let mut sink = TurtleSink::new(writer, self.compact);
        let mut has_directives = false;
        if let Some(base_iri) = self.base_iri.as_ref().filter(|_| self.explicit_base_iri) {
            sink.write_str(&format!("@base <{}> .", escape_iri(base_iri.as_str())))?;
            sink.new_line(1);
            has_directives = true;
        }
        for (label, namespace) in prefixes.iter() {
            sink.write_str(&format!("@prefix {label}: <{}> .", escape_iri(namespace)))?;
            sink.new_line(1);
            has_directives = true;
        }
        if has_directives {
            sink.new_line(1);
        }

        let mut writer = sink.finish()?;
        writer.write_all(&body)?;
        writer.flush()?;
        Ok(writer)
    }

    /// Serializes the quads to a [`String`].
    pub fn serialize_to_string(
        &self,
        quads: impl IntoIterator<Item = Quad>,
    ) -> Result<String, SerializerError> {
        let bytes = self.serialize_to_writer(quads, Vec::new())?;
        String::from_utf8(bytes)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error).into())
    }

    /// Checks the constraints that do not depend on the writing order.
    fn validate(&self, store: &MemoryQuadStore) -> Result<(), StructureError> {
        let graph_names = store.graph_names();
        match (self.format, graph_names.as_slice()) {
            (TurtleFormat::Turtle, [] | [GraphName::DefaultGraph]) => {}
            (TurtleFormat::Turtle, [graph_name]) => {
                return Err(StructureError::NamedGraph(graph_label(graph_name)));
            }
            (TurtleFormat::Turtle, _) => return Err(StructureError::MultipleGraphs),
            (TurtleFormat::N3, _) => {
                for graph_name in &graph_names {
                    let Some(label) = Term::from_graph_name(graph_name) else {
                        continue;
                    };
                    let is_referenced = store
                        .quads_for_pattern(Some(&label), None, None, None)
                        .into_iter()
                        .chain(store.quads_for_pattern(None, None, Some(&label), None))
                        .any(|quad| quad.graph_name != *graph_name);
                    if !is_referenced {
                        return Err(StructureError::UnreachableGraph {
                            graph: graph_name.to_string(),
                            remaining: store.count_for_pattern(None, None, None, Some(graph_name)),
                        });
                    }
                }
            }
        }

        for quad in store.quads_for_pattern(None, None, None, None) {
            if self.format == TurtleFormat::Turtle {
                validate_turtle_statement(&quad)?;
            }
            for term in [&quad.subject, &quad.predicate, &quad.object] {
                validate_quoted_triples(term)?;
            }
        }
        Ok(())
    }
}

fn graph_label(graph_name: &GraphName) -> String {
    match graph_name {
        GraphName::NamedNode(node) => node.as_str().to_owned(),
        GraphName::BlankNode(node) => node.as_str().to_owned(),
        GraphName::DefaultGraph => graph_name.to_string(),
    }
}

fn validate_quoted_triples(term: &Term) -> Result<(), StructureError> {
    if let Term::Triple(quad) = term {
        if !quad.graph_name.is_default_graph() {
            return Err(StructureError::QuotedTripleInNamedGraph(term.to_string()));
        }
        validate_quoted_triples(&quad.subject)?;
        validate_quoted_triples(&quad.predicate)?;
        validate_quoted_triples(&quad.object)?;
    }
    Ok(())
}

/// Checks the positions N3 allows more terms in than Turtle, quoted triples included.
fn validate_turtle_statement(quad: &Quad) -> Result<(), StructureError> {
    let unsupported = |term: &Term, position: &'static str| StructureError::UnsupportedTerm {
        term: term.to_string(),
        position,
    };
    if matches!(quad.subject, Term::Literal(_) | Term::Variable(_)) {
        return Err(unsupported(&quad.subject, "subject"));
    }
    if !quad.predicate.is_named_node() {
        return Err(unsupported(&quad.predicate, "predicate"));
    }
    if matches!(quad.object, Term::Variable(_)) {
        return Err(unsupported(&quad.object, "object"));
    }
    for term in [&quad.subject, &quad.object] {
        if let Term::Triple(quoted) = term {
            validate_turtle_statement(quoted)?;
        }
    }
    Ok(())
}

/// Blank nodes inside quoted triples must keep their label to stay linked to the asserted ones.
fn quoted_blank_nodes(quads: &[Quad]) -> FxHashSet<BlankNode> {
    fn collect(term: &Term, inside_quoted: bool, nodes: &mut FxHashSet<BlankNode>) {
        match term {
            Term::BlankNode(node) if inside_quoted => {
                nodes.insert(node.clone());
            }
            Term::Triple(quad) => {
                collect(&quad.subject, true, nodes);
                collect(&quad.predicate, true, nodes);
                collect(&quad.object, true, nodes);
            }
            _ => (),
        }
    }

    let mut nodes = FxHashSet::default();
    for quad in quads {
        collect(&quad.subject, false, &mut nodes);
        collect(&quad.predicate, false, &mut nodes);
        collect(&quad.object, false, &mut nodes);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_turtle_model::{Literal, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/ns#{name}"))
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(TurtleSerializer::new().serialize_to_string([]).unwrap(), "");
    }

    #[test]
    fn invalid_prefix_name_is_rejected() {
        let error = TurtleSerializer::new()
            .with_prefix("1a", "http://example.com/")
            .unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidPrefixName(name) if name == "1a"));
    }

    #[test]
    fn repeated_prefix_label_replaces_previous_one() {
        let serializer = TurtleSerializer::new()
            .with_prefix("a", "http://a.org/")
            .unwrap()
            .with_prefix("b", "http://b.org/")
            .unwrap()
            .with_prefix("a", "http://c.org/")
            .unwrap();
        assert_eq!(
            serializer.prefixes,
            vec![
                ("a".to_owned(), "http://c.org/".to_owned()),
                ("b".to_owned(), "http://b.org/".to_owned())
            ]
        );
    }

    #[test]
    fn invalid_base_iri_is_ignored() {
        let serializer = TurtleSerializer::new()
            .with_base_iri("not absolute")
            .with_explicit_base_iri();
        let output = serializer
            .serialize_to_string([Quad::triple(ex("s"), ex("p"), Literal::from(1))])
            .unwrap();
        assert_eq!(output, "@prefix ex: <http://example.com/ns#> .\n\nex:s ex:p 1 .\n");
    }

    #[test]
    fn nothing_is_written_on_error() {
        let quads = [Quad::new(ex("s"), ex("p"), ex("o"), ex("g"))];
        let mut output = Vec::new();
        let result = TurtleSerializer::new().serialize_to_writer(quads, &mut output);
        assert!(matches!(
            result,
            Err(SerializerError::Structure(StructureError::NamedGraph(graph)))
                if graph == "http://example.com/ns#g"
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn blank_nodes_in_quoted_triples_are_explicit() {
        let b = BlankNode::new_unchecked("b");
        let quads = [Quad::triple(
            Term::quoted(b.clone(), ex("p"), ex("o")),
            ex("q"),
            ex("r"),
        )];
        assert_eq!(quoted_blank_nodes(&quads), [b].into_iter().collect::<FxHashSet<_>>());
    }
}
