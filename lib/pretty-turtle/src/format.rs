use crate::error::ConfigurationError;
use std::fmt;
use std::str::FromStr;

/// The syntaxes the serializer can produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TurtleFormat {
    /// [Turtle](https://www.w3.org/TR/turtle/), restricted to the default graph.
    #[default]
    Turtle,
    /// [Notation3](https://w3c.github.io/N3/spec/), allows nested formulas.
    N3,
}

impl TurtleFormat {
    /// The format [IANA media type](https://tools.ietf.org/html/rfc2046).
    #[inline]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Turtle => "text/turtle",
            Self::N3 => "text/n3",
        }
    }

    /// The format [IANA-registered](https://tools.ietf.org/html/rfc2046) file extension.
    #[inline]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Turtle => "ttl",
            Self::N3 => "n3",
        }
    }

    /// Looks for a known format from a media type. Media type parameters are ignored.
    ///
    /// ```
    /// use pretty_turtle::TurtleFormat;
    ///
    /// assert_eq!(
    ///     TurtleFormat::from_media_type("text/n3; charset=utf-8"),
    ///     Some(TurtleFormat::N3)
    /// );
    /// ```
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let media_type = media_type.split(';').next()?.trim();
        [Self::Turtle, Self::N3]
            .into_iter()
            .find(|format| format.media_type().eq_ignore_ascii_case(media_type))
    }

    /// Looks for a known format from an extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        [Self::Turtle, Self::N3]
            .into_iter()
            .find(|format| format.file_extension().eq_ignore_ascii_case(extension))
    }
}

impl FromStr for TurtleFormat {
    type Err = ConfigurationError;

    /// Parses a media type (`text/turtle`) or a file extension (`ttl`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_media_type(name)
            .or_else(|| Self::from_extension(name))
            .ok_or_else(|| ConfigurationError::UnsupportedFormat(name.to_owned()))
    }
}

impl fmt::Display for TurtleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Turtle => "Turtle",
            Self::N3 => "N3",
        })
    }
}
