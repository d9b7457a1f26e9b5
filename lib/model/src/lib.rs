mod quad;
mod term;
pub mod vocab;

pub use quad::*;
pub use term::*;

// Re-export some oxrdf types.
pub use oxiri::{Iri, IriParseError};
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, Variable, VariableRef,
};
