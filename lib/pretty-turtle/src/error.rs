use std::io;

/// An error raised while serializing quads.
///
/// Any error aborts the whole serialization. Output written before the error is incomplete and
/// must be discarded.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SerializerError {
    /// Error from the underlying writer.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The serializer was configured with an unsupported option.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The quads cannot be expressed in the target syntax.
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl From<SerializerError> for io::Error {
    #[inline]
    fn from(error: SerializerError) -> Self {
        match error {
            SerializerError::Io(error) => error,
            SerializerError::Configuration(error) => Self::new(io::ErrorKind::InvalidInput, error),
            SerializerError::Structure(error) => Self::new(io::ErrorKind::InvalidData, error),
        }
    }
}

/// An invalid serializer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid prefix name '{0}'")]
    InvalidPrefixName(String),
}

/// The input contains statements the target syntax cannot express.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("More than one graph found - can only serialize the default graph in Turtle")]
    MultipleGraphs,
    #[error("Expected all triples to be in the default graph, instead triples were in {0}")]
    NamedGraph(String),
    #[error("Default graph expected on quoted triple {0}")]
    QuotedTripleInNamedGraph(String),
    #[error("{remaining} quads in graph {graph} are not reachable from the default graph")]
    UnreachableGraph { graph: String, remaining: usize },
    /// Turtle has no variables, no literal subjects and only IRIs as predicates.
    #[error("{term} cannot be written as a {position} in Turtle")]
    UnsupportedTerm {
        term: String,
        position: &'static str,
    },
}
