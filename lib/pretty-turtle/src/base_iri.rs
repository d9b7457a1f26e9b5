use oxiri::{Iri, IriParseError};

/// An absolute IRI against which written IRIs are relativized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseIri {
    iri: Iri<String>,
}

impl BaseIri {
    pub fn parse(iri: &str) -> Result<Self, IriParseError> {
        Ok(Self {
            iri: Iri::parse(iri.to_owned())?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.iri.as_str()
    }

    /// Returns the shortest relative reference that resolves against this base to exactly `iri`.
    ///
    /// Returns [`None`] if no such reference is shorter than `iri` itself, e.g. because the
    /// scheme or the authority differ.
    ///
    /// ```
    /// use pretty_turtle::BaseIri;
    ///
    /// let base = BaseIri::parse("http://example.org/path/to/").unwrap();
    /// assert_eq!(
    ///     base.relativize("http://example.org/path/other/object").as_deref(),
    ///     Some("../other/object")
    /// );
    /// assert_eq!(base.relativize("http://example.org/path/to/").as_deref(), Some(""));
    /// assert_eq!(base.relativize("https://example.org/path/to/"), None);
    /// ```
    pub fn relativize(&self, iri: &str) -> Option<String> {
        let target = Iri::parse(iri).ok()?;
        if target.scheme() != self.iri.scheme() || target.authority() != self.iri.authority() {
            return None;
        }

        let mut candidates = Vec::new();
        if target.path() == self.iri.path() {
            if target.query() == self.iri.query() {
                candidates.push(with_fragment(String::new(), target.fragment()));
            }
            if let Some(query) = target.query() {
                candidates.push(with_fragment(format!("?{query}"), target.fragment()));
            }
        }
        if let Some(path) = self.relative_path(target.path()) {
            let mut reference = path;
            if let Some(query) = target.query() {
                reference.push('?');
                reference.push_str(query);
            }
            candidates.push(with_fragment(reference, target.fragment()));
        }

        candidates
            .into_iter()
            .filter(|candidate| candidate.len() < iri.len())
            .filter(|candidate| {
                self.iri
                    .resolve(candidate)
                    .is_ok_and(|resolved| resolved.as_str() == iri)
            })
            .min_by_key(String::len)
    }

    /// Builds a `../`-climbing path from the directory of the base path to `target`.
    fn relative_path(&self, target: &str) -> Option<String> {
        let base_path = self.iri.path();
        let base_directory = &base_path[..=base_path.rfind('/')?];
        let (target_directory, target_file) = target.split_at(target.rfind('/')? + 1);

        let base_segments = base_directory.split_terminator('/').collect::<Vec<_>>();
        let target_segments = target_directory.split_terminator('/').collect::<Vec<_>>();
        let common = base_segments
            .iter()
            .zip(&target_segments)
            .take_while(|(base, target)| base == target)
            .count();
        if common == 0 {
            return None;
        }

        let mut path = "../".repeat(base_segments.len() - common);
        for segment in &target_segments[common..] {
            path.push_str(segment);
            path.push('/');
        }
        path.push_str(target_file);

        let first_segment = path.split('/').next().unwrap_or_default();
        if path.is_empty() || first_segment.contains(':') {
            path.insert_str(0, "./");
        }
        Some(path)
    }
}

fn with_fragment(mut reference: String, fragment: Option<&str>) -> String {
    if let Some(fragment) = fragment {
        reference.push('#');
        reference.push_str(fragment);
    }
    reference
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relativize(base: &str, iri: &str) -> Option<String> {
        BaseIri::parse(base).unwrap().relativize(iri)
    }

    #[test]
    fn rejects_relative_base() {
        assert!(BaseIri::parse("relative/path").is_err());
        assert!(BaseIri::parse("not an iri").is_err());
    }

    #[test]
    fn same_document() {
        assert_eq!(relativize("http://example.org/", "http://example.org/").as_deref(), Some(""));
        assert_eq!(
            relativize("http://example.org/doc#x", "http://example.org/doc").as_deref(),
            Some("")
        );
        assert_eq!(
            relativize("http://example.org/doc", "http://example.org/doc#me").as_deref(),
            Some("#me")
        );
        assert_eq!(
            relativize("http://example.org/doc?a=1", "http://example.org/doc?b=2").as_deref(),
            Some("?b=2")
        );
    }

    #[test]
    fn paths() {
        assert_eq!(
            relativize("http://example.org/path/to/", "http://example.org/path/other/object")
                .as_deref(),
            Some("../other/object")
        );
        assert_eq!(
            relativize("http://example.org/a/b", "http://example.org/a/c/d").as_deref(),
            Some("c/d")
        );
        assert_eq!(
            relativize("http://example.org/a/b", "http://example.org/a/").as_deref(),
            Some("./")
        );
        assert_eq!(
            relativize("http://example.org/a/b", "http://example.org/a/x:y").as_deref(),
            Some("./x:y")
        );
    }

    #[test]
    fn different_origin() {
        assert_eq!(relativize("http://example.org/", "http://example.com/"), None);
        assert_eq!(relativize("http://example.org/", "urn:example:a"), None);
    }
}
