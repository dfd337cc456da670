//! Bridge configuration
//!
//! Configuration can be loaded from a JSON file, environment variables,
//! or created programmatically. Sources are applied in that order on top
//! of the built-in defaults, so the environment wins.

use crate::codec::{DecodeError, DecodePolicy, StyleCodec};
use crate::style::StyleProperties;
use crate::tool::{AnnotationTool, ToolParseError, ToolStyles};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Environment variable selecting the decode policy (`lenient` / `strict`)
pub const ENV_DECODE_POLICY: &str = "MARKUP_BRIDGE_DECODE_POLICY";

/// Environment variable toggling the opacity clamp on encode
pub const ENV_CLAMP_ON_ENCODE: &str = "MARKUP_BRIDGE_CLAMP_ON_ENCODE";

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid value for configuration key {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// I/O error reading the configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON or has the wrong shape
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownTool(#[from] ToolParseError),

    /// A tool style entry failed to decode under the strict policy
    #[error("style for tool {tool}: {source}")]
    ToolStyle {
        tool: AnnotationTool,
        #[source]
        source: DecodeError,
    },
}

/// On-disk configuration shape
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    decode_policy: Option<DecodePolicy>,
    clamp_on_encode: Option<bool>,
    #[serde(default)]
    tools: BTreeMap<String, serde_json::Value>,
}

/// Settings for the style bridge
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// How malformed host payloads are treated
    pub decode_policy: DecodePolicy,
    /// Clamp opacity again when encoding for the host
    pub clamp_on_encode: bool,
    /// Per-tool overrides layered over the built-in tool defaults
    pub tool_defaults: BTreeMap<AnnotationTool, StyleProperties>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            decode_policy: DecodePolicy::Lenient,
            clamp_on_encode: true,
            tool_defaults: BTreeMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Sets the decode policy.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Sets whether opacity is clamped on encode.
    pub fn with_clamp_on_encode(mut self, clamp: bool) -> Self {
        self.clamp_on_encode = clamp;
        self
    }

    /// Sets the default style override for a tool.
    pub fn with_tool_default(mut self, tool: AnnotationTool, style: StyleProperties) -> Self {
        self.tool_defaults.insert(tool, style);
        self
    }

    /// Codec configured by these settings
    pub fn codec(&self) -> StyleCodec {
        StyleCodec::new(self.decode_policy, self.clamp_on_encode)
    }

    /// Built-in tool defaults with this configuration's overrides applied
    pub fn tool_styles(&self) -> ToolStyles {
        ToolStyles::with_overrides(&self.tool_defaults)
    }

    /// Loads configuration from environment variables over the defaults.
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file over the defaults.
    ///
    /// Expected file format:
    /// ```json
    /// {
    ///   "decode_policy": "strict",
    ///   "clamp_on_encode": true,
    ///   "tools": { "ink": { "color": "#FF0000", "thickness": 3 } }
    /// }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string.
    ///
    /// Tool styles use the host mapping format and decode under the
    /// policy given in the same document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let mut config = Self::default();
        config.apply_settings(&file);
        config.apply_tools(file.tools)?;
        Ok(config)
    }

    /// Defaults, then the file at `path` if given, then the environment,
    /// then `policy_override`.
    ///
    /// Tool styles from the file decode only once every source has been
    /// applied, so they see the final decode policy.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an
    /// environment variable is invalid, or a tool style fails to decode.
    pub fn load(
        path: Option<&Path>,
        policy_override: Option<DecodePolicy>,
    ) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => ConfigFile::default(),
        };

        let mut config = Self::default();
        config.apply_settings(&file);
        config.apply_env()?;
        if let Some(policy) = policy_override {
            config.decode_policy = policy;
        }
        config.apply_tools(file.tools)?;

        tracing::debug!(
            policy = %config.decode_policy,
            clamp_on_encode = config.clamp_on_encode,
            tool_overrides = config.tool_defaults.len(),
            "loaded bridge configuration"
        );

        Ok(config)
    }

    fn apply_settings(&mut self, file: &ConfigFile) {
        if let Some(policy) = file.decode_policy {
            self.decode_policy = policy;
        }
        if let Some(clamp) = file.clamp_on_encode {
            self.clamp_on_encode = clamp;
        }
    }

    fn apply_tools(&mut self, tools: BTreeMap<String, serde_json::Value>) -> ConfigResult<()> {
        let codec = self.codec();
        for (name, value) in tools {
            let tool: AnnotationTool = name.parse()?;
            let style = codec
                .decode_json(&value)
                .map_err(|source| ConfigError::ToolStyle { tool, source })?;

            for violation in style.validate() {
                tracing::warn!(%tool, "configured tool style is out of range: {violation}");
            }
            self.tool_defaults.insert(tool, style);
        }

        Ok(())
    }

    fn apply_env(&mut self) -> ConfigResult<()> {
        if let Ok(val) = std::env::var(ENV_DECODE_POLICY) {
            self.decode_policy = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_DECODE_POLICY.to_string(),
                value: val.clone(),
            })?;
        }

        if let Ok(val) = std::env::var(ENV_CLAMP_ON_ENCODE) {
            self.clamp_on_encode = parse_bool(&val).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_CLAMP_ON_ENCODE.to_string(),
                value: val.clone(),
            })?;
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
