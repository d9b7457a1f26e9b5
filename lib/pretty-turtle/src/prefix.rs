use crate::escape::is_valid_local_name;
use rustc_hash::{FxHashMap, FxHashSet};

/// Prefixes that are always offered, after the user supplied ones.
pub const DEFAULT_PREFIXES: [(&str, &str); 6] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("sh", "http://www.w3.org/ns/shacl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("ex", "http://example.com/ns#"),
];

/// Splits an IRI after its last `#` or `/`.
///
/// Returns [`None`] if the IRI contains neither.
pub fn split_namespace(iri: &str) -> Option<(&str, &str)> {
    let end = iri.rfind(['#', '/'])? + 1;
    Some(iri.split_at(end))
}

/// Returns the namespace of `iri` if the IRI can be written as `label:local` with it.
pub fn abbreviable_namespace(iri: &str) -> Option<&str> {
    let (namespace, local) = split_namespace(iri)?;
    is_valid_local_name(local).then_some(namespace)
}

/// The prefixes that are declared in a document.
#[derive(Clone, Debug, Default)]
pub struct PrefixTable {
    prefixes: Vec<(String, String)>,
    labels: FxHashMap<String, usize>,
}

impl PrefixTable {
    /// Selects the prefixes to declare.
    ///
    /// Candidates are the user prefixes followed by the [`DEFAULT_PREFIXES`] whose label is not
    /// taken, sorted by label if `ordered`. A candidate is kept if its namespace is in
    /// `used_namespaces` and no earlier candidate already declared the same namespace.
    pub fn select(
        user_prefixes: &[(String, String)],
        used_namespaces: &FxHashSet<String>,
        ordered: bool,
    ) -> Self {
        let mut candidates = user_prefixes
            .iter()
            .map(|(label, namespace)| (label.as_str(), namespace.as_str()))
            .collect::<Vec<_>>();
        for (label, namespace) in DEFAULT_PREFIXES {
            if !user_prefixes.iter().any(|(user_label, _)| user_label == label) {
                candidates.push((label, namespace));
            }
        }
        if ordered {
            candidates.sort_by_key(|(label, _)| *label);
        }

        let mut table = Self::default();
        for (label, namespace) in candidates {
            if used_namespaces.contains(namespace) && !table.labels.contains_key(namespace) {
                table
                    .labels
                    .insert(namespace.to_owned(), table.prefixes.len());
                table.prefixes.push((label.to_owned(), namespace.to_owned()));
            }
        }
        table
    }

    /// Iterates over the `(label, namespace)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(label, namespace)| (label.as_str(), namespace.as_str()))
    }

    /// Splits `iri` into the label of a declared prefix and a local name.
    pub fn lookup<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        let namespace = abbreviable_namespace(iri)?;
        let (label, _) = &self.prefixes[*self.labels.get(namespace)?];
        Some((label.as_str(), &iri[namespace.len()..]))
    }

    /// Writes `iri` as a prefixed name if one of the declared namespaces allows it.
    pub fn shorten(&self, iri: &str) -> Option<String> {
        let (label, local) = self.lookup(iri)?;
        Some(format!("{label}:{local}"))
    }

    /// Keeps only the prefixes whose label matches `f`, preserving their order.
    pub fn retain(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.prefixes.retain(|(label, _)| f(label));
        self.labels = self
            .prefixes
            .iter()
            .enumerate()
            .map(|(i, (_, namespace))| (namespace.clone(), i))
            .collect();
    }
}
