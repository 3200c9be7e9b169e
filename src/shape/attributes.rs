use std::collections::BTreeMap;
use std::fmt;

use egui::Pos2;

/// A single rendering attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f32),
    Text(String),
    Points(Vec<Pos2>),
}

impl AttrValue {
    /// Numeric view of the value, parsing text if needed
    pub fn as_number(&self) -> Option<f32> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(s) => s.trim().parse().ok(),
            AttrValue::Points(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Points(points) => {
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{},{}", p.x, p.y)?;
                }
                Ok(())
            }
        }
    }
}

impl From<f32> for AttrValue {
    fn from(n: f32) -> Self {
        AttrValue::Number(n)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n as f32)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// Explicit name → value table for one element.
///
/// Names are the SVG attribute names (`cx`, `stroke-width`, ...). Iteration order is by name,
/// so two tables with the same entries always serialize identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: BTreeMap<&'static str, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(AttrValue::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<AttrValue>) {
        self.entries.insert(name, value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.entries.remove(name)
    }

    /// Overwrite every entry present in `other`, keeping the rest
    pub fn merge(&mut self, other: Attributes) {
        self.entries.extend(other.entries);
    }

    /// Copy of the entries whose names appear in `names`
    pub fn select(&self, names: &[&str]) -> Attributes {
        Attributes {
            entries: self
                .entries
                .iter()
                .filter(|(name, _)| names.contains(name))
                .map(|(name, value)| (*name, value.clone()))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(&'static str, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'static str, AttrValue)>>(iter: I) -> Self {
        Attributes {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn select_keeps_only_named_entries() {
        let mut attrs = Attributes::new();
        attrs.set("width", 10.0);
        attrs.set("height", 5.0);
        attrs.set("stroke-dasharray", "5,5");

        let geometry = attrs.select(&["x", "y", "width", "height"]);

        assert_eq!(geometry.len(), 2);
        assert!(!geometry.contains("stroke-dasharray"));
    }

    #[test]
    fn merge_overwrites_matching_names() {
        let mut attrs = Attributes::new();
        attrs.set("r", 0.0);
        attrs.set("fill", "none");

        let mut update = Attributes::new();
        update.set("r", 30.0);
        attrs.merge(update);

        assert_eq!(attrs.number("r"), Some(30.0));
        assert_eq!(attrs.text("fill"), Some("none"));
    }

    #[test]
    fn displays_svg_attribute_text() {
        assert_eq!(AttrValue::Number(10.0).to_string(), "10");
        assert_eq!(AttrValue::Number(2.5).to_string(), "2.5");
        let points = AttrValue::Points(vec![pos2(0.0, 1.0), pos2(2.0, 3.5)]);
        assert_eq!(points.to_string(), "0,1 2,3.5");
        assert_eq!(AttrValue::from(" 12 ").as_number(), Some(12.0));
    }
}
