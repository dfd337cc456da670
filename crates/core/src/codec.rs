//! Host mapping codec for [`StyleProperties`]
//!
//! The host sends styles as untyped maps keyed by `color`, `fillColor`,
//! `opacity`, `thickness` and `fontSize`. Under the lenient policy a
//! malformed field is dropped and the rest of the payload still decodes;
//! the strict policy reports every malformed field instead.

use crate::color::Color;
use crate::style::StyleProperties;
use crate::value::{map_from_json, map_to_json, StyleMap, StyleValue};
use std::fmt;
use std::str::FromStr;

/// Mapping keys understood by the codec
pub mod keys {
    pub const COLOR: &str = "color";
    pub const FILL_COLOR: &str = "fillColor";
    pub const OPACITY: &str = "opacity";
    pub const THICKNESS: &str = "thickness";
    pub const FONT_SIZE: &str = "fontSize";
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// How malformed fields are treated while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Drop malformed fields and keep decoding
    #[default]
    Lenient,
    /// Fail with every malformed field listed
    Strict,
}

impl fmt::Display for DecodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodePolicy::Lenient => f.write_str("lenient"),
            DecodePolicy::Strict => f.write_str("strict"),
        }
    }
}

/// Error returned when a string names no decode policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decode policy: {0:?} (expected `lenient` or `strict`)")]
pub struct DecodePolicyParseError(pub String);

impl FromStr for DecodePolicy {
    type Err = DecodePolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(DecodePolicy::Lenient),
            "strict" => Ok(DecodePolicy::Strict),
            _ => Err(DecodePolicyParseError(s.to_string())),
        }
    }
}

/// Why a single field failed to decode
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldErrorKind {
    #[error("expected a number, got {0}")]
    NotANumber(&'static str),

    #[error("expected a hex string, packed ARGB int or color, got {0}")]
    NotAColor(&'static str),

    #[error("{0:?} is not a 6 or 8 digit hex color")]
    InvalidHex(String),
}

/// A malformed field in a style payload
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("`{key}`: {kind}")]
pub struct FieldError {
    pub key: &'static str,
    pub kind: FieldErrorKind,
}

/// Error types for strict decoding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The payload itself was not a map
    #[error("style payload must be a map, got {0}")]
    NotAMap(&'static str),

    /// One or more fields were malformed
    #[error("malformed style fields: {}", describe(.0))]
    Fields(Vec<FieldError>),
}

impl DecodeError {
    /// Field errors carried by this error, if any
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DecodeError::Fields(errors) => errors,
            DecodeError::NotAMap(_) => &[],
        }
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Encoder/decoder pair between [`StyleProperties`] and a [`StyleMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleCodec {
    policy: DecodePolicy,
    clamp_on_encode: bool,
}

impl Default for StyleCodec {
    fn default() -> Self {
        Self {
            policy: DecodePolicy::Lenient,
            clamp_on_encode: true,
        }
    }
}

impl StyleCodec {
    pub fn new(policy: DecodePolicy, clamp_on_encode: bool) -> Self {
        Self {
            policy,
            clamp_on_encode,
        }
    }

    /// Codec that drops malformed fields
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Codec that rejects payloads with malformed fields
    pub fn strict() -> Self {
        Self {
            policy: DecodePolicy::Strict,
            ..Self::default()
        }
    }

    /// Whether opacity is clamped again while encoding
    pub fn with_clamp_on_encode(mut self, clamp: bool) -> Self {
        self.clamp_on_encode = clamp;
        self
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    pub fn clamp_on_encode(&self) -> bool {
        self.clamp_on_encode
    }

    /// Decode a host mapping
    ///
    /// Absent keys, nulls and unknown keys leave fields unset. Opacity is
    /// clamped to `[0.0, 1.0]` under either policy.
    ///
    /// # Errors
    /// Under [`DecodePolicy::Strict`], returns [`DecodeError::Fields`]
    /// listing every malformed field. The lenient policy never fails.
    pub fn decode(&self, map: &StyleMap) -> DecodeResult<StyleProperties> {
        let (style, errors) = decode_fields(map);

        match self.policy {
            DecodePolicy::Strict if !errors.is_empty() => Err(DecodeError::Fields(errors)),
            _ => Ok(style),
        }
    }

    /// Decode a JSON payload, which must be an object
    pub fn decode_json(&self, value: &serde_json::Value) -> DecodeResult<StyleProperties> {
        match value {
            serde_json::Value::Object(object) => self.decode(&map_from_json(object)),
            other => Err(DecodeError::NotAMap(StyleValue::from(other).type_name())),
        }
    }

    /// Decode ignoring the configured policy; malformed fields are dropped
    pub fn decode_lenient(&self, map: &StyleMap) -> StyleProperties {
        decode_fields(map).0
    }

    /// Encode to a host mapping holding only the set fields
    ///
    /// Colors become upper-case `#RRGGBB` (alpha is dropped); width and
    /// font size are emitted as floats.
    pub fn encode(&self, style: &StyleProperties) -> StyleMap {
        let mut map = StyleMap::new();

        if let Some(color) = style.stroke_color {
            map.insert(keys::COLOR.to_string(), StyleValue::String(color.to_hex_rgb()));
        }
        if let Some(color) = style.fill_color {
            map.insert(keys::FILL_COLOR.to_string(), StyleValue::String(color.to_hex_rgb()));
        }
        if let Some(opacity) = style.opacity {
            let opacity = if self.clamp_on_encode {
                opacity.clamp(0.0, 1.0)
            } else {
                opacity
            };
            map.insert(keys::OPACITY.to_string(), StyleValue::Float(opacity));
        }
        if let Some(width) = style.stroke_width {
            map.insert(keys::THICKNESS.to_string(), StyleValue::Float(width));
        }
        if let Some(size) = style.font_size {
            map.insert(keys::FONT_SIZE.to_string(), StyleValue::Float(size));
        }

        map
    }

    /// Encode to a JSON object
    pub fn encode_json(&self, style: &StyleProperties) -> serde_json::Value {
        serde_json::Value::Object(map_to_json(&self.encode(style)))
    }
}

fn decode_fields(map: &StyleMap) -> (StyleProperties, Vec<FieldError>) {
    let mut style = StyleProperties::new();
    let mut errors = Vec::new();

    style.stroke_color = decode_field(map, keys::COLOR, decode_color, &mut errors);
    style.fill_color = decode_field(map, keys::FILL_COLOR, decode_color, &mut errors);
    style.opacity = decode_field(map, keys::OPACITY, decode_number, &mut errors).map(|raw| {
        let clamped = raw.clamp(0.0, 1.0);
        if clamped != raw {
            tracing::debug!(raw, clamped, "clamped style opacity");
        }
        clamped
    });
    style.stroke_width = decode_field(map, keys::THICKNESS, decode_number, &mut errors);
    style.font_size = decode_field(map, keys::FONT_SIZE, decode_number, &mut errors);

    (style, errors)
}

/// Look up and decode one key; `None` when absent, null or malformed
fn decode_field<T>(
    map: &StyleMap,
    key: &'static str,
    decode: impl Fn(&StyleValue) -> Result<T, FieldErrorKind>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = map.get(key).filter(|value| !value.is_null())?;

    match decode(value) {
        Ok(decoded) => Some(decoded),
        Err(kind) => {
            tracing::debug!(key, error = %kind, "dropping malformed style field");
            errors.push(FieldError { key, kind });
            None
        }
    }
}

fn decode_number(value: &StyleValue) -> Result<f64, FieldErrorKind> {
    value
        .as_f64()
        .ok_or(FieldErrorKind::NotANumber(value.type_name()))
}

/// Mixed-type color decode
///
/// Native colors pass through, strings go through [`Color::from_hex`] and
/// integers are read as packed ARGB (low 32 bits).
fn decode_color(value: &StyleValue) -> Result<Color, FieldErrorKind> {
    match value {
        StyleValue::Color(color) => Ok(*color),
        StyleValue::String(hex) => {
            Color::from_hex(hex).ok_or_else(|| FieldErrorKind::InvalidHex(hex.clone()))
        }
        StyleValue::Int(packed) => Ok(Color::from_argb(*packed as u32)),
        other => Err(FieldErrorKind::NotAColor(other.type_name())),
    }
}
