//! # Configuration Management
//!
//! Centralized configuration for the tag codec and the object mapper.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Limits
//! - The codec depth limit (default 8192) bounds encoded and decoded trees.
//!   The codec walks trees iteratively, so this limit does not depend on the stack
//! - The mapping depth limit (default 256) bounds nested values. Mapping recurses
//!   through several frames per level, and the default stays within a 2 MB thread stack
//! - Decompressed payloads are capped to guard against decompression bombs

use crate::error::{ErrorMode, Result, TagError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

/// Magic token written first in every encoded stream
pub const MAGIC_STRING: &str = "@HYPER";

/// Format token written after the magic token
pub const FORMAT_STRING: &str = "%TAG";

/// Default maximum tree depth for encoding and decoding
pub const DEFAULT_MAX_DEPTH: usize = 8192;

/// Default maximum nesting depth for the object mapper
///
/// Kept low enough that mapping never overflows the 2 MB stack of a spawned thread.
pub const DEFAULT_MAPPING_DEPTH: usize = 256;

/// Default cap on the decompressed payload size (64 MB)
pub const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Default DEFLATE level (0 = store, 9 = best)
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

static RAISE_MAPPING_ERRORS: AtomicBool = AtomicBool::new(false);

/// Set the process-wide error mode picked up by `MappingOptions::default()`
pub fn set_default_error_mode(mode: ErrorMode) {
    RAISE_MAPPING_ERRORS.store(mode == ErrorMode::Raise, Ordering::Relaxed);
}

/// Current process-wide default error mode for the mapper
pub fn default_error_mode() -> ErrorMode {
    if RAISE_MAPPING_ERRORS.load(Ordering::Relaxed) {
        ErrorMode::Raise
    } else {
        ErrorMode::Suppress
    }
}

/// Top-level configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TagConfig {
    /// Wire codec configuration
    #[serde(default)]
    pub codec: CodecConfig,

    /// Object mapper configuration
    #[serde(default)]
    pub mapping: MappingOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TagConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            TagError::Configuration(format!("Failed to open config file: {e}"))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            TagError::Configuration(format!("Failed to read config file: {e}"))
        })?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| TagError::Configuration(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(depth) = std::env::var("HYPER_TAG_MAX_DEPTH") {
            let val = depth.parse::<usize>().map_err(|_| {
                TagError::Configuration(format!("Invalid HYPER_TAG_MAX_DEPTH: '{depth}'"))
            })?;
            config.codec.max_depth = val;
        }

        if let Ok(depth) = std::env::var("HYPER_TAG_MAPPING_DEPTH") {
            config.mapping.max_depth = depth.parse::<usize>().map_err(|_| {
                TagError::Configuration(format!("Invalid HYPER_TAG_MAPPING_DEPTH: '{depth}'"))
            })?;
        }

        if let Ok(nesting) = std::env::var("HYPER_TAG_NESTING") {
            config.mapping.nesting = Nesting::from_name(&nesting).ok_or_else(|| {
                TagError::Configuration(format!("Invalid HYPER_TAG_NESTING: '{nesting}'"))
            })?;
        }

        if let Ok(mode) = std::env::var("HYPER_TAG_ERROR_MODE") {
            config.mapping.error_mode = ErrorMode::from_name(&mode).ok_or_else(|| {
                TagError::Configuration(format!("Invalid HYPER_TAG_ERROR_MODE: '{mode}'"))
            })?;
        }

        if let Ok(level) = std::env::var("HYPER_TAG_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            TagError::Configuration(format!("Failed to serialize config: {e}"))
        })?;

        std::fs::write(path, content).map_err(|e| {
            TagError::Configuration(format!("Failed to write config file: {e}"))
        })?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.codec.validate());
        errors.extend(self.mapping.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TagError::Configuration(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Wire codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum tree depth accepted by the encoder and decoder
    pub max_depth: usize,

    /// DEFLATE compression level (0-9)
    pub compression_level: u32,

    /// Maximum decompressed payload size in bytes
    pub max_decompressed_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl CodecConfig {
    /// Codec configuration with a custom depth limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Validate codec configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_depth == 0 {
            errors.push("Codec max depth must be greater than 0".to_string());
        } else if self.max_depth > 1_000_000 {
            errors.push(format!(
                "Codec max depth too large: {} (maximum recommended: 1,000,000)",
                self.max_depth
            ));
        }

        if self.compression_level > 9 {
            errors.push(format!(
                "Invalid compression level: {} (valid range: 0-9)",
                self.compression_level
            ));
        }

        if self.max_decompressed_size < 1024 {
            errors.push("Max decompressed size too small (minimum: 1 KB)".to_string());
        }

        errors
    }
}

/// How nested handler, self-describing and aggregate results are placed in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    /// Splice the nested tree directly as the value tag
    #[default]
    Embedded,
    /// Encode the nested tree to bytes and store it as a Blob tag
    Boxed,
}

impl Nesting {
    /// Parse a nesting mode name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "embedded" | "nested" => Some(Nesting::Embedded),
            "boxed" | "blob" => Some(Nesting::Boxed),
            _ => None,
        }
    }
}

/// Object mapper options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingOptions {
    /// Embedded or boxed nesting of composite values
    pub nesting: Nesting,

    /// Maximum nesting depth of mapped values
    pub max_depth: usize,

    /// Raise or suppress mapping failures at the entry points
    #[serde(default = "default_error_mode")]
    pub error_mode: ErrorMode,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            nesting: Nesting::Embedded,
            max_depth: DEFAULT_MAPPING_DEPTH,
            error_mode: default_error_mode(),
        }
    }
}

impl MappingOptions {
    /// Options that raise every mapping failure
    pub fn raising() -> Self {
        Self {
            error_mode: ErrorMode::Raise,
            ..Self::default()
        }
    }

    /// Builder-style nesting override
    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    /// Builder-style error mode override
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    /// Builder-style depth override
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Depth limit for trees the mapper hands to the codec
    ///
    /// Each mapped level adds up to two tree levels (a container and a member
    /// name or map entry), and the innermost value adds one more.
    pub fn tree_depth(&self) -> usize {
        self.max_depth.saturating_mul(2).saturating_add(1)
    }

    /// Validate mapping options
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_depth == 0 {
            errors.push("Mapping max depth must be greater than 0".to_string());
        } else if self.max_depth > 1_000_000 {
            errors.push(format!(
                "Mapping max depth too large: {} (maximum recommended: 1,000,000)",
                self.max_depth
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("hyper-tag"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
