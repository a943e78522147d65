//! Episode position → title mapping produced by the title resolver

use std::collections::BTreeMap;

/// Resolved episode titles keyed by 0-based position
///
/// Built fresh per show per scan cycle. Keys need not be contiguous; positions
/// without an entry fall back to filename-derived titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMapping {
    titles: BTreeMap<usize, String>,
}

impl TitleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered episode list; list index becomes the position.
    /// Missing or blank titles leave a gap.
    pub fn from_ordered<I>(titles: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut mapping = Self::new();
        for (position, title) in titles.into_iter().enumerate() {
            if let Some(title) = title {
                mapping.insert(position, title);
            }
        }
        mapping
    }

    /// Insert a title; empty titles are ignored, whitespace is kept as given
    pub fn insert(&mut self, position: usize, title: impl Into<String>) {
        let title = title.into();
        if !title.is_empty() {
            self.titles.insert(position, title);
        }
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.titles.get(&position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ordered_keeps_positions_and_skips_gaps() {
        let mapping = TitleMapping::from_ordered(vec![
            Some("Pilot".to_string()),
            None,
            Some(String::new()),
            Some("Finale".to_string()),
        ]);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(0), Some("Pilot"));
        assert_eq!(mapping.get(1), None);
        assert_eq!(mapping.get(2), None);
        assert_eq!(mapping.get(3), Some("Finale"));
    }

    #[test]
    fn test_whitespace_title_is_a_title() {
        let mut mapping = TitleMapping::new();
        mapping.insert(0, "   ");
        mapping.insert(1, "");
        assert_eq!(mapping.get(0), Some("   "));
        assert_eq!(mapping.get(1), None);
    }

    #[test]
    fn test_empty_mapping() {
        let mapping = TitleMapping::new();
        assert!(mapping.is_empty());
        assert_eq!(mapping.get(0), None);
    }
}
