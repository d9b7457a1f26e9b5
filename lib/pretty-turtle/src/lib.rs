#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod base_iri;
mod error;
mod escape;
mod format;
mod formatter;
mod prefix;
mod serializer;
mod sink;
mod writer;

pub use base_iri::BaseIri;
pub use error::{ConfigurationError, SerializerError, StructureError};
pub use escape::{
    escape_iri, escape_string, is_iri_char, is_pn_chars, is_pn_chars_base, is_pn_chars_u,
    is_valid_local_name, is_valid_prefix_name,
};
pub use format::TurtleFormat;
pub use prefix::{split_namespace, PrefixTable, DEFAULT_PREFIXES};
pub use serializer::TurtleSerializer;
pub use sink::TurtleSink;
