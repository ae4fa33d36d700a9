//! Label table: the supported shape kinds and their mask labels.
//!
//! Every pixel of a [`Mask`](crate::mask::Mask) holds exactly one label:
//! [`BACKGROUND_LABEL`] where no shape was drawn, or the
//! [`ShapeKind::label`] of the last shape that covered it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::GeneratorError;

/// Mask label for pixels no shape has covered.
pub const BACKGROUND_LABEL: u8 = 0;

/// Name reserved for the background entry of the label table.
pub const BACKGROUND_NAME: &str = "background";

/// A drawable shape kind.
///
/// The discriminant of each variant is its mask label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle spanned by two random corners.
    Rectangle = 1,
    /// Axis-aligned square around a random center.
    Square = 2,
    /// Filled triangle with three random vertices.
    Triangle = 3,
    /// Filled disk around a random center.
    Circle = 4,
}

impl ShapeKind {
    /// Every supported kind, in label order.
    pub const ALL: [Self; 4] = [Self::Rectangle, Self::Square, Self::Triangle, Self::Circle];

    /// The mask label written for this kind.
    #[must_use]
    pub const fn label(self) -> u8 {
        self as u8
    }

    /// The name this kind is requested by.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Circle => "circle",
        }
    }

    /// Look up the kind that owns `label`. Returns `None` for the
    /// background label and for unassigned values.
    #[must_use]
    pub fn from_label(label: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Comma-separated list of every supported name.
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL.map(Self::name).join(", ")
    }

    /// Parse an ordered list of kind names.
    ///
    /// Stops at the first unknown name.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidShapeKind`] naming the first value
    /// that is not a supported kind.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, GeneratorError> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl FromStr for ShapeKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GeneratorError::InvalidShapeKind {
                value: s.to_owned(),
                valid: Self::valid_names(),
            })
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable name for any mask label.
#[must_use]
pub fn label_name(label: u8) -> Option<&'static str> {
    if label == BACKGROUND_LABEL {
        Some(BACKGROUND_NAME)
    } else {
        ShapeKind::from_label(label).map(ShapeKind::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct_and_nonzero() {
        let mut labels: Vec<u8> = ShapeKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ShapeKind::ALL.len());
        assert!(!labels.contains(&BACKGROUND_LABEL));
    }

    #[test]
    fn names_parse_back() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.name().parse::<ShapeKind>(), Ok(kind));
            assert_eq!(ShapeKind::from_label(kind.label()), Some(kind));
        }
    }

    #[test]
    fn unknown_name_reports_value_and_valid_set() {
        let err = "hexagon".parse::<ShapeKind>().err();
        assert_eq!(
            err,
            Some(GeneratorError::InvalidShapeKind {
                value: "hexagon".to_owned(),
                valid: "rectangle, square, triangle, circle".to_owned(),
            })
        );
    }

    #[test]
    fn background_is_not_a_shape_kind() {
        assert!(BACKGROUND_NAME.parse::<ShapeKind>().is_err());
        assert_eq!(ShapeKind::from_label(BACKGROUND_LABEL), None);
        assert_eq!(label_name(BACKGROUND_LABEL), Some("background"));
        assert_eq!(label_name(4), Some("circle"));
        assert_eq!(label_name(200), None);
    }

    #[test]
    fn parse_all_preserves_order() {
        let kinds = ShapeKind::parse_all(&["circle", "rectangle", "circle"]);
        assert_eq!(
            kinds,
            Ok(vec![
                ShapeKind::Circle,
                ShapeKind::Rectangle,
                ShapeKind::Circle
            ])
        );
    }

    #[test]
    fn parse_all_fails_on_first_unknown() {
        let result = ShapeKind::parse_all(&["square", "oval", "blob"]);
        assert!(matches!(
            result,
            Err(GeneratorError::InvalidShapeKind { ref value, .. }) if value == "oval"
        ));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ShapeKind::Triangle).ok();
        assert_eq!(json.as_deref(), Some("\"triangle\""));
    }
}
