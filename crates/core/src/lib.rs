//! Markup Bridge Core Library
//!
//! Annotation style model shared between the host application and the
//! native document viewer: partial style properties, the untyped mapping
//! codec used at the host boundary, and per-tool style defaults.

pub mod codec;
pub mod color;
pub mod config;
pub mod style;
pub mod tool;
pub mod value;

pub use codec::{
    DecodeError, DecodePolicy, DecodePolicyParseError, DecodeResult, FieldError, FieldErrorKind,
    StyleCodec,
};
pub use color::{Color, ParseColorError};
pub use config::{BridgeConfig, ConfigError, ConfigResult};
pub use style::{StyleOverrides, StyleProperties, StyleViolation};
pub use tool::{AnnotationTool, ResolvedStyle, ToolParseError, ToolStyles};
pub use value::{StyleMap, StyleValue};
