//! Annotation style properties
//!
//! [`StyleProperties`] is a partially populated style: every channel is
//! optional and an unset channel inherits from whatever it is layered on.
//! Domain constraints are not enforced on construction or mutation, so a
//! staged edit can be transiently invalid; [`StyleProperties::validate`]
//! reports violations as data.

use crate::codec::StyleCodec;
use crate::color::Color;
use crate::value::{map_from_json, map_to_json, StyleMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Optional visual attributes for an annotation tool or an annotation
///
/// Equality and hashing are structural over all five fields. Floating point
/// fields compare by bit pattern, so `Eq` and `Hash` always agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleProperties {
    /// Outline / text color
    pub stroke_color: Option<Color>,

    /// Fill of closed shapes; inert for line and text annotations
    pub fill_color: Option<Color>,

    /// Opacity, valid in 0.0..=1.0
    pub opacity: Option<f64>,

    /// Stroke width in points, valid when >= 0
    pub stroke_width: Option<f64>,

    /// Font size in points, valid when > 0
    pub font_size: Option<f64>,
}

impl StyleProperties {
    /// Create a style with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode from a host mapping, dropping malformed fields
    ///
    /// Opacity is clamped to `[0.0, 1.0]`; thickness and font size are
    /// taken verbatim. Use [`StyleCodec`] for strict decoding.
    pub fn from_map(map: &StyleMap) -> Self {
        StyleCodec::lenient().decode_lenient(map)
    }

    /// Encode to a host mapping containing only the fields that are set
    pub fn to_map(&self) -> StyleMap {
        StyleCodec::default().encode(self)
    }

    pub fn with_stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.stroke_color.is_none()
            && self.fill_color.is_none()
            && self.opacity.is_none()
            && self.stroke_width.is_none()
            && self.font_size.is_none()
    }

    /// Copy with the given fields replaced
    ///
    /// Overrides can replace a value but never clear one.
    pub fn copy_with(&self, overrides: StyleOverrides) -> Self {
        Self {
            stroke_color: overrides.stroke_color.or(self.stroke_color),
            fill_color: overrides.fill_color.or(self.fill_color),
            opacity: overrides.opacity.or(self.opacity),
            stroke_width: overrides.stroke_width.or(self.stroke_width),
            font_size: overrides.font_size.or(self.font_size),
        }
    }

    /// Layer `other` on top of `self`
    ///
    /// Every field set in `other` wins; unset fields fall through to `self`.
    pub fn merge(&self, other: &StyleProperties) -> Self {
        Self {
            stroke_color: other.stroke_color.or(self.stroke_color),
            fill_color: other.fill_color.or(self.fill_color),
            opacity: other.opacity.or(self.opacity),
            stroke_width: other.stroke_width.or(self.stroke_width),
            font_size: other.font_size.or(self.font_size),
        }
    }

    /// Typed domain violations, in field order
    pub fn violations(&self) -> Vec<StyleViolation> {
        let mut violations = Vec::new();

        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                violations.push(StyleViolation::OpacityOutOfRange(opacity));
            }
        }

        if let Some(width) = self.stroke_width {
            if width < 0.0 || width.is_nan() {
                violations.push(StyleViolation::NegativeStrokeWidth(width));
            }
        }

        if let Some(size) = self.font_size {
            if size <= 0.0 || size.is_nan() {
                violations.push(StyleViolation::NonPositiveFontSize(size));
            }
        }

        violations
    }

    /// Human-readable domain violations; empty when the style is valid
    pub fn validate(&self) -> Vec<String> {
        self.violations().iter().map(ToString::to_string).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }
}

fn float_bits(value: Option<f64>) -> Option<u64> {
    value.map(f64::to_bits)
}

impl PartialEq for StyleProperties {
    fn eq(&self, other: &Self) -> bool {
        self.stroke_color == other.stroke_color
            && self.fill_color == other.fill_color
            && float_bits(self.opacity) == float_bits(other.opacity)
            && float_bits(self.stroke_width) == float_bits(other.stroke_width)
            && float_bits(self.font_size) == float_bits(other.font_size)
    }
}

impl Eq for StyleProperties {}

impl Hash for StyleProperties {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stroke_color.hash(state);
        self.fill_color.hash(state);
        float_bits(self.opacity).hash(state);
        float_bits(self.stroke_width).hash(state);
        float_bits(self.font_size).hash(state);
    }
}

impl From<&StyleMap> for StyleProperties {
    fn from(map: &StyleMap) -> Self {
        Self::from_map(map)
    }
}

impl From<&StyleProperties> for StyleMap {
    fn from(style: &StyleProperties) -> Self {
        style.to_map()
    }
}

impl Serialize for StyleProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        map_to_json(&self.to_map()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyleProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&map_from_json(&object)))
    }
}

/// Field replacements for [`StyleProperties::copy_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleOverrides {
    pub stroke_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub opacity: Option<f64>,
    pub stroke_width: Option<f64>,
    pub font_size: Option<f64>,
}

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }
}

/// A single out-of-domain field found by [`StyleProperties::violations`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleViolation {
    OpacityOutOfRange(f64),
    NegativeStrokeWidth(f64),
    NonPositiveFontSize(f64),
}

impl StyleViolation {
    /// Host mapping key of the offending field
    pub fn key(&self) -> &'static str {
        match self {
            StyleViolation::OpacityOutOfRange(_) => crate::codec::keys::OPACITY,
            StyleViolation::NegativeStrokeWidth(_) => crate::codec::keys::THICKNESS,
            StyleViolation::NonPositiveFontSize(_) => crate::codec::keys::FONT_SIZE,
        }
    }
}

impl fmt::Display for StyleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleViolation::OpacityOutOfRange(v) => {
                write!(f, "opacity must be between 0.0 and 1.0, got {}", v)
            }
            StyleViolation::NegativeStrokeWidth(v) => {
                write!(f, "stroke width must not be negative, got {}", v)
            }
            StyleViolation::NonPositiveFontSize(v) => {
                write!(f, "font size must be greater than 0, got {}", v)
            }
        }
    }
}
