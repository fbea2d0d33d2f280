use std::collections::BTreeMap;

use crate::table::Dataset;

/// Mapping from user-chosen names to datasets
///
/// Owned by the caller and passed into each invocation; the engine only
/// reads it and binds names in place. A later load with an existing name
/// overwrites the binding, it never merges. Cross-invocation persistence
/// (and any cross-session isolation) is the caller's business.
#[derive(Default)]
pub struct Environment {
    inner: BTreeMap<String, Dataset>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, dataset: Dataset) {
        self.inner.insert(name.into(), dataset);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Value};

    fn one_column(n: f64) -> Dataset {
        Dataset::new(vec![Column::new("a", vec![Value::Number(n)])]).unwrap()
    }

    #[test]
    fn test_insert_overwrites() {
        let mut env = Environment::new();
        assert!(env.is_empty());

        env.insert("d", one_column(1.0));
        env.insert("d", one_column(2.0));

        assert_eq!(env.len(), 1);
        let col = env.get("d").unwrap().column("a").unwrap();
        assert_eq!(col.values(), &[Value::Number(2.0)]);
    }

    #[test]
    fn test_lookup() {
        let mut env = Environment::new();
        env.insert("d", one_column(1.0));

        assert!(env.contains("d"));
        assert!(!env.contains("e"));
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["d"]);
    }
}
