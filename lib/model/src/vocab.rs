//! IRIs the serializer gives special treatment.

pub mod rdf {
    //! [RDF](https://www.w3.org/TR/rdf11-concepts/) vocabulary.
    use oxrdf::NamedNodeRef;

    pub use oxrdf::vocab::rdf::{FIRST, LANG_STRING, NIL, REST, TYPE};

    /// The datatype of directional language-tagged strings (RDF 1.2).
    pub const DIR_LANG_STRING: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#dirLangString");
}

pub mod xsd {
    //! [XML Schema](https://www.w3.org/TR/xmlschema11-2/) datatypes.
    pub use oxrdf::vocab::xsd::{BOOLEAN, INTEGER, STRING};
}

pub mod log {
    //! The [N3 log](https://www.w3.org/2000/10/swap/log#) vocabulary.
    use oxrdf::NamedNodeRef;

    /// `log:implies`, written `=>` in N3.
    pub const IMPLIES: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/10/swap/log#implies");
    /// `log:isImpliedBy`, written `<=` in N3 when enabled.
    pub const IS_IMPLIED_BY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/10/swap/log#isImpliedBy");
}
