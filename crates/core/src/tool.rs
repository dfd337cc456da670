//! Annotation tools and style layering
//!
//! Every tool has a default style. An annotation's own style is layered on
//! top of its tool default, and the result can be resolved into a concrete
//! [`ResolvedStyle`] with every channel filled in.

use crate::color::Color;
use crate::style::StyleProperties;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Annotation drawing tools exposed by the document viewer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationTool {
    Ink,
    Line,
    Arrow,
    Polyline,
    Square,
    Circle,
    Polygon,
    FreeText,
    Highlight,
    Underline,
    Strikeout,
    Squiggly,
    Note,
}

impl AnnotationTool {
    pub const ALL: [AnnotationTool; 13] = [
        AnnotationTool::Ink,
        AnnotationTool::Line,
        AnnotationTool::Arrow,
        AnnotationTool::Polyline,
        AnnotationTool::Square,
        AnnotationTool::Circle,
        AnnotationTool::Polygon,
        AnnotationTool::FreeText,
        AnnotationTool::Highlight,
        AnnotationTool::Underline,
        AnnotationTool::Strikeout,
        AnnotationTool::Squiggly,
        AnnotationTool::Note,
    ];

    /// Name used by the host, e.g. `"freeText"`
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationTool::Ink => "ink",
            AnnotationTool::Line => "line",
            AnnotationTool::Arrow => "arrow",
            AnnotationTool::Polyline => "polyline",
            AnnotationTool::Square => "square",
            AnnotationTool::Circle => "circle",
            AnnotationTool::Polygon => "polygon",
            AnnotationTool::FreeText => "freeText",
            AnnotationTool::Highlight => "highlight",
            AnnotationTool::Underline => "underline",
            AnnotationTool::Strikeout => "strikeout",
            AnnotationTool::Squiggly => "squiggly",
            AnnotationTool::Note => "note",
        }
    }

    /// Closed shapes are the only tools that honor a fill color
    pub fn supports_fill(&self) -> bool {
        matches!(
            self,
            AnnotationTool::Square | AnnotationTool::Circle | AnnotationTool::Polygon
        )
    }

    /// Tools that render text with the style's font size
    pub fn uses_font(&self) -> bool {
        matches!(self, AnnotationTool::FreeText)
    }

    /// Built-in default style for this tool
    pub fn default_style(&self) -> StyleProperties {
        let style = StyleProperties::new();
        match self {
            AnnotationTool::Ink => style.with_stroke_color(Color::BLUE).with_stroke_width(2.0),
            AnnotationTool::Line
            | AnnotationTool::Arrow
            | AnnotationTool::Polyline
            | AnnotationTool::Square
            | AnnotationTool::Circle
            | AnnotationTool::Polygon => {
                style.with_stroke_color(Color::RED).with_stroke_width(2.0)
            }
            AnnotationTool::FreeText => style.with_stroke_color(Color::BLACK).with_font_size(12.0),
            AnnotationTool::Highlight => style.with_stroke_color(Color::YELLOW).with_opacity(0.5),
            AnnotationTool::Underline | AnnotationTool::Squiggly => {
                style.with_stroke_color(Color::GREEN).with_stroke_width(1.0)
            }
            AnnotationTool::Strikeout => style.with_stroke_color(Color::RED).with_stroke_width(1.0),
            AnnotationTool::Note => style.with_stroke_color(Color::YELLOW),
        }
    }
}

impl fmt::Display for AnnotationTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unrecognized tool name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown annotation tool: {0:?}")]
pub struct ToolParseError(pub String);

impl FromStr for AnnotationTool {
    type Err = ToolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationTool::ALL
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ToolParseError(s.to_string()))
    }
}

/// Fully populated style, ready to hand to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    /// Stroke color for lines, outlines and text
    pub stroke_color: Color,

    /// Stroke width in points
    pub stroke_width: f64,

    /// Fill color for closed shapes (None for no fill)
    pub fill_color: Option<Color>,

    /// Opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f64,

    /// Font size in points
    pub font_size: f64,
}

impl ResolvedStyle {
    /// Base style every tool default sits on (black stroke, 2pt width, no fill)
    pub fn base() -> Self {
        Self {
            stroke_color: Color::BLACK,
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
            font_size: 12.0,
        }
    }

    /// Fill the gaps in `style` from `self`
    pub fn overlay(&self, style: &StyleProperties) -> Self {
        Self {
            stroke_color: style.stroke_color.unwrap_or(self.stroke_color),
            stroke_width: style.stroke_width.unwrap_or(self.stroke_width),
            fill_color: style.fill_color.or(self.fill_color),
            opacity: style.opacity.unwrap_or(self.opacity),
            font_size: style.font_size.unwrap_or(self.font_size),
        }
    }

    /// Back to a partial style with every channel set (fill only if present)
    pub fn to_properties(&self) -> StyleProperties {
        StyleProperties {
            stroke_color: Some(self.stroke_color),
            fill_color: self.fill_color,
            opacity: Some(self.opacity),
            stroke_width: Some(self.stroke_width),
            font_size: Some(self.font_size),
        }
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self::base()
    }
}

/// Per-tool default styles
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStyles {
    defaults: BTreeMap<AnnotationTool, StyleProperties>,
}

impl ToolStyles {
    /// Built-in defaults for every tool
    pub fn new() -> Self {
        Self {
            defaults: AnnotationTool::ALL
                .iter()
                .map(|tool| (*tool, tool.default_style()))
                .collect(),
        }
    }

    /// Built-in defaults with `overrides` layered on top
    pub fn with_overrides(overrides: &BTreeMap<AnnotationTool, StyleProperties>) -> Self {
        let mut styles = Self::new();
        for (tool, style) in overrides {
            let layered = styles.default_for(*tool).merge(style);
            styles.set_default(*tool, layered);
        }
        styles
    }

    /// Current default for `tool`
    pub fn default_for(&self, tool: AnnotationTool) -> StyleProperties {
        self.defaults
            .get(&tool)
            .copied()
            .unwrap_or_else(|| tool.default_style())
    }

    /// Replace the default for `tool`
    pub fn set_default(&mut self, tool: AnnotationTool, style: StyleProperties) {
        self.defaults.insert(tool, style);
    }

    /// Annotation style layered over its tool default
    pub fn style_for(&self, tool: AnnotationTool, annotation: &StyleProperties) -> StyleProperties {
        self.default_for(tool).merge(annotation)
    }

    /// Concrete style for an annotation drawn with `tool`
    ///
    /// Fill is dropped for tools that cannot fill.
    pub fn resolve(&self, tool: AnnotationTool, annotation: &StyleProperties) -> ResolvedStyle {
        let layered = self.style_for(tool, annotation);
        let mut resolved = ResolvedStyle::base().overlay(&layered);

        if !tool.supports_fill() && resolved.fill_color.take().is_some() {
            tracing::debug!(%tool, "ignoring fill color on tool without fill");
        }

        resolved
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotationTool, &StyleProperties)> {
        self.defaults.iter().map(|(tool, style)| (*tool, style))
    }
}

impl Default for ToolStyles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in AnnotationTool::ALL {
            assert_eq!(tool.name().parse::<AnnotationTool>(), Ok(tool));
        }
        assert_eq!("FREETEXT".parse::<AnnotationTool>(), Ok(AnnotationTool::FreeText));
        assert_eq!(
            "stamp".parse::<AnnotationTool>(),
            Err(ToolParseError("stamp".to_string()))
        );
    }

    #[test]
    fn test_tool_serde_names_match_display() {
        let json = serde_json::to_value(AnnotationTool::FreeText).unwrap();
        assert_eq!(json, serde_json::json!("freeText"));
        assert_eq!(AnnotationTool::FreeText.to_string(), "freeText");
    }

    #[test]
    fn test_builtin_defaults_are_valid() {
        for tool in AnnotationTool::ALL {
            assert!(tool.default_style().is_valid(), "{tool} default is invalid");
        }
    }

    #[test]
    fn test_fill_support() {
        assert!(AnnotationTool::Square.supports_fill());
        assert!(AnnotationTool::Polygon.supports_fill());
        assert!(!AnnotationTool::Line.supports_fill());
        assert!(!AnnotationTool::FreeText.supports_fill());
    }

    #[test]
    fn test_annotation_style_overrides_tool_default() {
        let styles = ToolStyles::new();
        let annotation = StyleProperties::new().with_stroke_width(5.0);

        let layered = styles.style_for(AnnotationTool::Line, &annotation);
        assert_eq!(layered.stroke_color, Some(Color::RED));
        assert_eq!(layered.stroke_width, Some(5.0));
    }

    #[test]
    fn test_resolve_fills_every_channel() {
        let styles = ToolStyles::new();
        let resolved = styles.resolve(AnnotationTool::Highlight, &StyleProperties::new());

        assert_eq!(resolved.stroke_color, Color::YELLOW);
        assert_eq!(resolved.opacity, 0.5);
        assert_eq!(resolved.stroke_width, 2.0);
        assert_eq!(resolved.font_size, 12.0);
        assert_eq!(resolved.fill_color, None);
    }

    #[test]
    fn test_resolve_drops_fill_for_open_shapes() {
        let styles = ToolStyles::new();
        let annotation = StyleProperties::new().with_fill_color(Color::GREEN);

        assert_eq!(styles.resolve(AnnotationTool::Line, &annotation).fill_color, None);
        assert_eq!(
            styles.resolve(AnnotationTool::Circle, &annotation).fill_color,
            Some(Color::GREEN)
        );
    }

    #[test]
    fn test_overrides_layer_on_builtins() {
        let mut overrides = BTreeMap::new();
        overrides.insert(AnnotationTool::Ink, StyleProperties::new().with_opacity(0.3));

        let styles = ToolStyles::with_overrides(&overrides);
        let ink = styles.default_for(AnnotationTool::Ink);

        assert_eq!(ink.stroke_color, Some(Color::BLUE));
        assert_eq!(ink.stroke_width, Some(2.0));
        assert_eq!(ink.opacity, Some(0.3));
        assert_eq!(
            styles.default_for(AnnotationTool::Note),
            AnnotationTool::Note.default_style()
        );
    }

    #[test]
    fn test_resolved_round_trip_through_properties() {
        let resolved = ResolvedStyle {
            fill_color: Some(Color::WHITE),
            ..ResolvedStyle::base()
        };
        assert_eq!(ResolvedStyle::base().overlay(&resolved.to_properties()), resolved);
    }
}
