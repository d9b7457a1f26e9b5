use crate::base_iri::BaseIri;
use crate::error::StructureError;
use crate::escape::{escape_iri, escape_string};
use crate::prefix::{abbreviable_namespace, PrefixTable};
use pretty_turtle_model::vocab::{log, rdf, xsd};
use pretty_turtle_model::{LiteralRef, NamedNodeRef, Quad, Term};
use rustc_hash::FxHashSet;

/// Datatypes implied by the quoted literal syntax.
const WELL_KNOWN_DATATYPES: [NamedNodeRef<'static>; 3] =
    [rdf::LANG_STRING, xsd::STRING, rdf::DIR_LANG_STRING];

/// Renders single terms. Records which prefixes were actually used.
#[derive(Debug)]
pub(crate) struct TermFormatter {
    n3: bool,
    implied_by: bool,
    prefixes: PrefixTable,
    base_iri: Option<BaseIri>,
    used_prefixes: FxHashSet<String>,
}

impl TermFormatter {
    pub fn new(n3: bool, implied_by: bool, prefixes: PrefixTable, base_iri: Option<BaseIri>) -> Self {
        Self {
            n3,
            implied_by,
            prefixes,
            base_iri,
            used_prefixes: FxHashSet::default(),
        }
    }

    /// Formats a term in predicate position, where the N3 arrows are allowed.
    pub fn predicate(&mut self, predicate: &Term) -> Result<String, StructureError> {
        if self.n3 {
            if *predicate == log::IMPLIES {
                return Ok("=>".into());
            }
            if self.implied_by && *predicate == log::IS_IMPLIED_BY {
                return Ok("<=".into());
            }
        }
        self.term(predicate)
    }

    pub fn term(&mut self, term: &Term) -> Result<String, StructureError> {
        let mut output = String::new();
        self.write_term(term, &mut output)?;
        Ok(output)
    }

    /// Returns the declared prefixes that have been used by a formatted term so far.
    pub fn into_used_prefixes(mut self) -> PrefixTable {
        let used = self.used_prefixes;
        self.prefixes.retain(|label| used.contains(label));
        self.prefixes
    }

    fn write_term(&mut self, term: &Term, output: &mut String) -> Result<(), StructureError> {
        match term {
            Term::NamedNode(node) => self.write_iri(node.as_str(), output),
            Term::BlankNode(node) => output.push_str(&node.to_string()),
            Term::Literal(literal) => self.write_literal(literal.as_ref(), output),
            Term::Variable(variable) => output.push_str(&variable.to_string()),
            Term::Triple(quad) => {
                if !quad.graph_name.is_default_graph() {
                    return Err(StructureError::QuotedTripleInNamedGraph(term.to_string()));
                }
                output.push_str("<<");
                self.write_term(&quad.subject, output)?;
                output.push(' ');
                if quad.predicate == rdf::TYPE {
                    output.push('a');
                } else {
                    self.write_term(&quad.predicate, output)?;
                }
                output.push(' ');
                self.write_term(&quad.object, output)?;
                output.push_str(">>");
            }
        }
        Ok(())
    }

    fn write_iri(&mut self, iri: &str, output: &mut String) {
        if let Some((label, local)) = self.prefixes.lookup(iri) {
            if !self.used_prefixes.contains(label) {
                self.used_prefixes.insert(label.to_owned());
            }
            output.push_str(label);
            output.push(':');
            output.push_str(local);
            return;
        }

        let relative = self
            .base_iri
            .as_ref()
            .and_then(|base_iri| base_iri.relativize(iri));
        output.push('<');
        output.push_str(&escape_iri(relative.as_deref().unwrap_or(iri)));
        output.push('>');
    }

    fn write_literal(&mut self, literal: LiteralRef<'_>, output: &mut String) {
        if is_bare(literal) {
            output.push_str(literal.value());
            return;
        }

        output.push('"');
        output.push_str(&escape_string(literal.value()));
        output.push('"');
        if let Some(language) = literal.language() {
            output.push('@');
            output.push_str(language);
        } else if is_typed(literal) {
            output.push_str("^^");
            self.write_iri(literal.datatype().as_str(), output);
        }
    }
}

/// `xsd:integer` and `xsd:boolean` literals with a canonical lexical form are written unquoted.
fn is_bare(literal: LiteralRef<'_>) -> bool {
    let value = literal.value();
    if literal.datatype() == xsd::INTEGER {
        let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    } else if literal.datatype() == xsd::BOOLEAN {
        matches!(value, "true" | "false")
    } else {
        false
    }
}

/// Whether the literal is written as `"..."^^datatype`.
fn is_typed(literal: LiteralRef<'_>) -> bool {
    literal.language().is_none()
        && !is_bare(literal)
        && !WELL_KNOWN_DATATYPES.contains(&literal.datatype())
}

/// Collects the namespaces of the IRIs that may be written as prefixed names.
///
/// `rdf:type` predicates are written `a` and the N3 arrows as `=>`/`<=`, so they are skipped.
pub(crate) fn used_namespaces<'a>(
    quads: impl IntoIterator<Item = &'a Quad>,
    n3: bool,
    implied_by: bool,
) -> FxHashSet<String> {
    let mut scan = NamespaceScan {
        n3,
        implied_by,
        namespaces: FxHashSet::default(),
    };
    for quad in quads {
        scan.add_term(&quad.subject);
        scan.add_predicate(&quad.predicate);
        scan.add_term(&quad.object);
    }
    scan.namespaces
}

struct NamespaceScan {
    n3: bool,
    implied_by: bool,
    namespaces: FxHashSet<String>,
}

impl NamespaceScan {
    fn add_predicate(&mut self, predicate: &Term) {
        let is_arrow = self.n3
            && (*predicate == log::IMPLIES
                || (self.implied_by && *predicate == log::IS_IMPLIED_BY));
        if *predicate != rdf::TYPE && !is_arrow {
            self.add_term(predicate);
        }
    }

    fn add_term(&mut self, term: &Term) {
        match term {
            Term::NamedNode(node) => self.add_iri(node.as_str()),
            Term::Literal(literal) if is_typed(literal.as_ref()) => {
                self.add_iri(literal.datatype().as_str());
            }
            Term::Triple(quad) => {
                self.add_term(&quad.subject);
                if quad.predicate != rdf::TYPE {
                    self.add_term(&quad.predicate);
                }
                self.add_term(&quad.object);
            }
            Term::BlankNode(_) | Term::Literal(_) | Term::Variable(_) => (),
        }
    }

    fn add_iri(&mut self, iri: &str) {
        if let Some(namespace) = abbreviable_namespace(iri) {
            if !self.namespaces.contains(namespace) {
                self.namespaces.insert(namespace.to_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_turtle_model::{BlankNode, Literal, NamedNode, Variable};

    fn formatter(base_iri: Option<&str>) -> TermFormatter {
        let namespaces = ["http://example.com/ns#".to_owned()].into_iter().collect();
        TermFormatter::new(
            true,
            false,
            PrefixTable::select(&[], &namespaces, false),
            base_iri.map(|iri| BaseIri::parse(iri).unwrap()),
        )
    }

    #[test]
    fn literals() {
        let mut formatter = formatter(None);
        let format = |formatter: &mut TermFormatter, literal: Literal| {
            formatter.term(&literal.into()).unwrap()
        };

        assert_eq!(format(&mut formatter, Literal::from(42)), "42");
        assert_eq!(format(&mut formatter, Literal::from(true)), "true");
        assert_eq!(
            format(&mut formatter, Literal::new_typed_literal("4.2", xsd::INTEGER)),
            "\"4.2\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(format(&mut formatter, Literal::new_simple_literal("a\"b")), "\"a\\\"b\"");
        assert_eq!(
            format(
                &mut formatter,
                Literal::new_language_tagged_literal_unchecked("chat", "fr")
            ),
            "\"chat\"@fr"
        );
        assert_eq!(
            format(
                &mut formatter,
                Literal::new_typed_literal("x", NamedNode::new_unchecked("http://example.com/ns#dt"))
            ),
            "\"x\"^^ex:dt"
        );
    }

    #[test]
    fn iris_use_prefixes_then_base() {
        let mut formatter = formatter(Some("http://example.org/a/"));
        let mut format = |iri: &str| formatter.term(&NamedNode::new_unchecked(iri).into()).unwrap();

        assert_eq!(format("http://example.com/ns#thing"), "ex:thing");
        assert_eq!(format("http://example.org/a/b"), "<b>");
        assert_eq!(format("http://other.org/x y"), "<http://other.org/x\\u0020y>");
    }

    #[test]
    fn arrows_only_in_predicate_position() {
        let mut formatter = formatter(None);
        let implies = Term::from(log::IMPLIES);
        assert_eq!(formatter.predicate(&implies).unwrap(), "=>");
        assert_eq!(
            formatter.term(&implies).unwrap(),
            "<http://www.w3.org/2000/10/swap/log#implies>"
        );
        assert_eq!(
            formatter.predicate(&log::IS_IMPLIED_BY.into()).unwrap(),
            "<http://www.w3.org/2000/10/swap/log#isImpliedBy>"
        );
    }

    #[test]
    fn quoted_triples() {
        let mut formatter = formatter(None);
        let quoted = Term::quoted(
            BlankNode::new_unchecked("b"),
            rdf::TYPE,
            NamedNode::new_unchecked("http://example.com/ns#C"),
        );
        assert_eq!(formatter.term(&quoted).unwrap(), "<<_:b a ex:C>>");

        let variable = Term::from(Variable::new_unchecked("x"));
        assert_eq!(formatter.term(&variable).unwrap(), "?x");

        let in_graph = Term::from(Quad::new(
            BlankNode::new_unchecked("b"),
            NamedNode::new_unchecked("http://example.com/ns#p"),
            BlankNode::new_unchecked("c"),
            NamedNode::new_unchecked("http://example.com/g"),
        ));
        assert!(matches!(
            formatter.term(&in_graph),
            Err(StructureError::QuotedTripleInNamedGraph(_))
        ));
    }

    #[test]
    fn used_prefixes_are_tracked() {
        let mut formatter = formatter(None);
        formatter
            .term(&NamedNode::new_unchecked("http://example.com/ns#a").into())
            .unwrap();
        assert_eq!(
            formatter.into_used_prefixes().iter().collect::<Vec<_>>(),
            vec![("ex", "http://example.com/ns#")]
        );
    }

    #[test]
    fn namespace_scan_skips_abbreviated_predicates() {
        let quads = [
            Quad::triple(
                NamedNode::new_unchecked("http://a.org/s"),
                rdf::TYPE,
                Literal::new_typed_literal("1.0", NamedNode::new_unchecked("http://b.org/dt")),
            ),
            Quad::triple(
                Term::quoted(
                    NamedNode::new_unchecked("http://c.org/s"),
                    rdf::TYPE,
                    NamedNode::new_unchecked("http://d.org/o"),
                ),
                log::IMPLIES,
                Literal::from(1),
            ),
        ];

        let mut n3 = used_namespaces(&quads, true, false)
            .into_iter()
            .collect::<Vec<_>>();
        n3.sort();
        assert_eq!(
            n3,
            vec!["http://a.org/", "http://b.org/", "http://c.org/", "http://d.org/"]
        );

        assert!(used_namespaces(&quads, false, false).contains("http://www.w3.org/2000/10/swap/log#"));
    }
}
