//! Label lookup tables produced by the parser.

use std::collections::BTreeMap;

use crate::constants::{BACKGROUND_LABEL, BACKGROUND_NAME};

/// RGBA color with every component in 0.0-1.0.
pub type Rgba = [f32; 4];

/// Color assigned to the background label (fully transparent black).
pub const BACKGROUND_COLOR: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Mapping from label id to display color.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    colors: BTreeMap<u32, Rgba>,
}

impl Colormap {
    /// Create a colormap holding only the background entry.
    pub fn new() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert(BACKGROUND_LABEL, BACKGROUND_COLOR);
        Self { colors }
    }

    /// Set the color for a label, returning the previous color if any.
    pub fn insert(&mut self, id: u32, color: Rgba) -> Option<Rgba> {
        self.colors.insert(id, color)
    }

    /// Get the color of a label.
    pub fn get(&self, id: u32) -> Option<Rgba> {
        self.colors.get(&id).copied()
    }

    /// Check whether a label has a color.
    pub fn contains(&self, id: u32) -> bool {
        self.colors.contains_key(&id)
    }

    /// Label ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.colors.keys().copied()
    }

    /// (id, color) pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Rgba)> + '_ {
        self.colors.iter().map(|(&id, &color)| (id, color))
    }

    /// Number of labels, background included.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false: the background entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a label selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Label id as a string
    pub value: String,
    /// "`id` - `name`" display string
    pub key: String,
}

impl Choice {
    /// Create a choice for a label id and name.
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            value: id.to_string(),
            key: format!("{} - {}", id, name),
        }
    }
}

/// Ordered list of selectable labels. The background is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    choices: Vec<Choice>,
}

impl ChoiceList {
    /// Create a list holding only the background choice.
    pub fn new() -> Self {
        Self {
            choices: vec![Choice::new(BACKGROUND_LABEL, BACKGROUND_NAME)],
        }
    }

    /// Append a choice.
    pub fn push(&mut self, choice: Choice) {
        self.choices.push(choice);
    }

    /// Label id strings in display order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.choices.iter().map(|c| c.value.as_str())
    }

    /// Display strings in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.choices.iter().map(|c| c.key.as_str())
    }

    /// Look up the display string for a label id string.
    pub fn key_for(&self, value: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.key.as_str())
    }

    /// Check whether a label id string is selectable.
    pub fn contains(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }

    /// All choices in display order.
    pub fn as_slice(&self) -> &[Choice] {
        &self.choices
    }

    /// Number of choices, background included.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Always false: the background choice is never removed.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl Default for ChoiceList {
    fn default() -> Self {
        Self::new()
    }
}

/// Colormap and choice list built from a single label description file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelTable {
    /// Label colors
    pub colormap: Colormap,
    /// Selectable labels
    pub choices: ChoiceList,
}

impl LabelTable {
    /// Table holding only the background label.
    pub fn background_only() -> Self {
        Self::default()
    }

    /// Number of labels, background included.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Always false: the background label is never removed.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_seed() {
        let table = LabelTable::background_only();
        assert_eq!(table.colormap.get(0), Some(BACKGROUND_COLOR));
        assert_eq!(table.choices.as_slice()[0], Choice::new(0, "Background"));
        assert_eq!(table.choices.key_for("0"), Some("0 - Background"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_choice_lookup() {
        let mut choices = ChoiceList::new();
        choices.push(Choice::new(12, "Left kidney"));

        assert!(choices.contains("12"));
        assert!(!choices.contains("13"));
        assert_eq!(choices.key_for("12"), Some("12 - Left kidney"));
        assert_eq!(choices.values().collect::<Vec<_>>(), vec!["0", "12"]);
    }

    #[test]
    fn test_colormap_ids_sorted() {
        let mut colormap = Colormap::new();
        colormap.insert(9, [1.0, 0.0, 0.0, 1.0]);
        colormap.insert(3, [0.0, 1.0, 0.0, 1.0]);

        assert_eq!(colormap.ids().collect::<Vec<_>>(), vec![0, 3, 9]);
        assert!(colormap.contains(3));
        assert!(!colormap.is_empty());
    }
}
