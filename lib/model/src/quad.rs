use crate::Term;
use oxrdf::GraphName;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A subject/predicate/object statement in a graph.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph_name: GraphName,
}

impl Quad {
    #[inline]
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        graph_name: impl Into<GraphName>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph_name: graph_name.into(),
        }
    }

    /// Creates a quad in the default graph.
    #[inline]
    pub fn triple(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self::new(subject, predicate, object, GraphName::DefaultGraph)
    }
}

impl From<oxrdf::Quad> for Quad {
    fn from(quad: oxrdf::Quad) -> Self {
        Self {
            subject: quad.subject.into(),
            predicate: quad.predicate.into(),
            object: quad.object.into(),
            graph_name: quad.graph_name,
        }
    }
}

impl From<oxrdf::Triple> for Quad {
    fn from(triple: oxrdf::Triple) -> Self {
        Self::triple(triple.subject, triple.predicate, triple.object)
    }
}

impl Display for Quad {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.graph_name.is_default_graph() {
            write!(f, "{} {} {}", self.subject, self.predicate, self.object)
        } else {
            write!(
                f,
                "{} {} {} {}",
                self.subject, self.predicate, self.object, self.graph_name
            )
        }
    }
}

impl PartialOrd for Quad {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quad {
    fn cmp(&self, other: &Self) -> Ordering {
        self.subject
            .cmp(&other.subject)
            .then_with(|| self.predicate.cmp(&other.predicate))
            .then_with(|| self.object.cmp(&other.object))
            .then_with(|| {
                Term::from_graph_name(&self.graph_name)
                    .cmp(&Term::from_graph_name(&other.graph_name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal, NamedNode};

    #[test]
    fn converts_rdf_star_quads() {
        let inner = oxrdf::Triple::new(
            NamedNode::new_unchecked("http://example.com/s"),
            NamedNode::new_unchecked("http://example.com/p"),
            Literal::new_simple_literal("o"),
        );
        let quad = Quad::from(oxrdf::Quad::new(
            inner.clone(),
            NamedNode::new_unchecked("http://example.com/certainty"),
            Literal::from(1),
            GraphName::DefaultGraph,
        ));

        assert_eq!(quad.subject, Term::from(inner));
        assert!(quad.subject.is_triple());
    }

    #[test]
    fn default_graph_sorts_first() {
        let named = Quad::new(
            BlankNode::new_unchecked("s"),
            NamedNode::new_unchecked("http://example.com/p"),
            BlankNode::new_unchecked("o"),
            NamedNode::new_unchecked("http://example.com/g"),
        );
        let default = Quad::triple(
            BlankNode::new_unchecked("s"),
            NamedNode::new_unchecked("http://example.com/p"),
            BlankNode::new_unchecked("o"),
        );
        assert!(default < named);
    }
}
