//! Name-keyed histogram collections.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::histogram::{Histogram, Histogram1D, Histogram2D};

/// All histograms loaded from one input file, keyed by name.
///
/// Keys are unique; inserting a second histogram under an existing name
/// replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramMap {
    histograms: BTreeMap<String, Histogram>,
}

impl HistogramMap {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the histogram's own name, returning any replaced entry.
    pub fn insert(&mut self, histogram: impl Into<Histogram>) -> Option<Histogram> {
        let histogram = histogram.into();
        self.histograms.insert(histogram.name().to_string(), histogram)
    }

    /// Insert under an explicit key.
    pub fn insert_as(&mut self, key: impl Into<String>, histogram: impl Into<Histogram>) -> Option<Histogram> {
        self.histograms.insert(key.into(), histogram.into())
    }

    /// Look up a histogram.
    pub fn get(&self, key: &str) -> Result<&Histogram> {
        self.histograms.get(key).ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Histogram> {
        self.histograms.get_mut(key).ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Look up a 1-D histogram.
    pub fn get_h1(&self, key: &str) -> Result<&Histogram1D> {
        let h = self.get(key)?;
        h.as_h1().ok_or_else(|| Error::WrongDimension {
            name: key.to_string(),
            expected: 1,
            found: h.dimension(),
        })
    }

    /// Look up a 2-D histogram.
    pub fn get_h2(&self, key: &str) -> Result<&Histogram2D> {
        let h = self.get(key)?;
        h.as_h2().ok_or_else(|| Error::WrongDimension {
            name: key.to_string(),
            expected: 2,
            found: h.dimension(),
        })
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.histograms.contains_key(key)
    }

    /// Number of histograms.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.histograms.keys().map(String::as_str)
    }

    /// `(key, histogram)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Histogram)> {
        self.histograms.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<Histogram> for HistogramMap {
    fn from_iter<I: IntoIterator<Item = Histogram>>(iter: I) -> Self {
        let mut map = Self::new();
        for h in iter {
            map.insert(h);
        }
        map
    }
}

/// Substitute `value` for every `{}` in a key template, e.g.
/// `format_key("histos_w_{}", 3)` gives `histos_w_3`.
pub fn format_key(template: &str, value: impl Display) -> String {
    template.replace("{}", &value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Axis;

    fn h1(name: &str) -> Histogram1D {
        Histogram1D::new(name, "", Axis::uniform(2, 0.0, 1.0).unwrap())
    }

    #[test]
    fn typed_lookups() {
        let mut map = HistogramMap::new();
        map.insert(h1("a"));
        map.insert(Histogram2D::empty_default("b"));

        assert!(map.get_h1("a").is_ok());
        assert!(map.get_h2("b").is_ok());
        assert!(matches!(map.get("c"), Err(Error::KeyNotFound(k)) if k == "c"));
        assert!(matches!(
            map.get_h2("a"),
            Err(Error::WrongDimension { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn keys_are_unique_and_sorted() {
        let map: HistogramMap = ["z", "a", "z"].into_iter().map(|n| Histogram::from(h1(n))).collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "z"]);
    }

    #[test]
    fn format_key_substitutes_sector() {
        assert_eq!(format_key("histos_w_{}", 4), "histos_w_4");
        assert_eq!(format_key("histos_de_beam_from_angles{}", 1), "histos_de_beam_from_angles1");
        assert_eq!(format_key("plain", 1), "plain");
    }
}
