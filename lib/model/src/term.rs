use crate::Quad;
use oxrdf::{BlankNode, GraphName, Literal, LiteralRef, NamedNode, NamedNodeRef, Variable};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// An RDF term as it may appear in any position of a [`Quad`].
///
/// In contrast to [`oxrdf::Term`], every position accepts every kind of term. N3 allows literals
/// and variables as subjects, and quoted triples keep their graph name so that a quoted triple
/// from a named graph can be detected (and rejected) when serializing.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    /// An N3 universal variable (`?x`).
    Variable(Variable),
    /// An RDF-star quoted triple. Serializable only if its graph name is the default graph.
    Triple(Box<Quad>),
}

/// The kind of a [`Term`], in the order used to sort terms.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum TermKind {
    BlankNode,
    Literal,
    NamedNode,
    Triple,
    Variable,
}

impl Term {
    /// Creates a quoted triple in the default graph.
    pub fn quoted(subject: impl Into<Term>, predicate: impl Into<Term>, object: impl Into<Term>) -> Self {
        Self::Triple(Box::new(Quad::new(
            subject,
            predicate,
            object,
            GraphName::DefaultGraph,
        )))
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::NamedNode(_) => TermKind::NamedNode,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
            Term::Variable(_) => TermKind::Variable,
            Term::Triple(_) => TermKind::Triple,
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, Term::Triple(_))
    }

    pub fn as_named_node(&self) -> Option<NamedNodeRef<'_>> {
        match self {
            Term::NamedNode(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    pub fn as_blank_node(&self) -> Option<&BlankNode> {
        match self {
            Term::BlankNode(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the graph name this term denotes when used as a named graph or N3 formula label.
    ///
    /// Only IRIs and blank nodes can name a graph.
    pub fn to_graph_name(&self) -> Option<GraphName> {
        match self {
            Term::NamedNode(inner) => Some(GraphName::NamedNode(inner.clone())),
            Term::BlankNode(inner) => Some(GraphName::BlankNode(inner.clone())),
            Term::Literal(_) | Term::Variable(_) | Term::Triple(_) => None,
        }
    }

    /// Returns the term that names `graph_name`, or [`None`] for the default graph.
    pub fn from_graph_name(graph_name: &GraphName) -> Option<Self> {
        match graph_name {
            GraphName::NamedNode(inner) => Some(Term::NamedNode(inner.clone())),
            GraphName::BlankNode(inner) => Some(Term::BlankNode(inner.clone())),
            GraphName::DefaultGraph => None,
        }
    }
}

impl PartialEq<NamedNodeRef<'_>> for Term {
    fn eq(&self, other: &NamedNodeRef<'_>) -> bool {
        self.as_named_node() == Some(*other)
    }
}

impl From<NamedNode> for Term {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for Term {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        Term::NamedNode(node.into_owned())
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Variable> for Term {
    #[inline]
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<Quad> for Term {
    #[inline]
    fn from(quad: Quad) -> Self {
        Term::Triple(Box::new(quad))
    }
}

impl From<oxrdf::Triple> for Term {
    #[inline]
    fn from(triple: oxrdf::Triple) -> Self {
        Term::Triple(Box::new(triple.into()))
    }
}

impl From<oxrdf::Subject> for Term {
    fn from(subject: oxrdf::Subject) -> Self {
        match subject {
            oxrdf::Subject::NamedNode(inner) => inner.into(),
            oxrdf::Subject::BlankNode(inner) => inner.into(),
            oxrdf::Subject::Triple(inner) => (*inner).into(),
        }
    }
}

impl From<oxrdf::Term> for Term {
    fn from(term: oxrdf::Term) -> Self {
        match term {
            oxrdf::Term::NamedNode(inner) => inner.into(),
            oxrdf::Term::BlankNode(inner) => inner.into(),
            oxrdf::Term::Literal(inner) => inner.into(),
            oxrdf::Term::Triple(inner) => (*inner).into(),
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::NamedNode(inner) => inner.fmt(f),
            Term::BlankNode(inner) => inner.fmt(f),
            Term::Literal(inner) => inner.fmt(f),
            Term::Variable(inner) => inner.fmt(f),
            Term::Triple(inner) => write!(f, "<< {inner} >>"),
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Terms are sorted by their kind, then by their lexical value. Literals with the same value are
/// further sorted by datatype and language tag, and quoted triples component by component.
impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Term::NamedNode(a), Term::NamedNode(b)) => a.as_str().cmp(b.as_str()),
            (Term::BlankNode(a), Term::BlankNode(b)) => a.as_str().cmp(b.as_str()),
            (Term::Literal(a), Term::Literal(b)) => cmp_literals(a.as_ref(), b.as_ref()),
            (Term::Variable(a), Term::Variable(b)) => a.as_str().cmp(b.as_str()),
            (Term::Triple(a), Term::Triple(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

fn cmp_literals(a: LiteralRef<'_>, b: LiteralRef<'_>) -> Ordering {
    a.value()
        .cmp(b.value())
        .then_with(|| a.datatype().as_str().cmp(b.datatype().as_str()))
        .then_with(|| a.language().cmp(&b.language()))
}
