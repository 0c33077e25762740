//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use hyper_tag::config::LoggingConfig;
use hyper_tag::{
    CodecConfig, ErrorMode, MappingOptions, Nesting, TagConfig, TagMapper, DEFAULT_MAPPING_DEPTH,
    DEFAULT_MAX_DEPTH,
};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = TagConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.codec.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.mapping.max_depth, DEFAULT_MAPPING_DEPTH);
    assert_eq!(config.mapping.nesting, Nesting::Embedded);
}

#[test]
fn test_zero_depth_rejected() {
    let config = TagConfig::default_with_overrides(|c| {
        c.codec.max_depth = 0;
        c.mapping.max_depth = 0;
    });
    let errors = config.validate();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.contains("greater than 0")));
}

#[test]
fn test_excessive_depth_rejected() {
    let config = TagConfig::default_with_overrides(|c| c.codec.max_depth = 2_000_000);
    assert!(config.validate().iter().any(|e| e.contains("too large")));
}

#[test]
fn test_compression_level_range() {
    let mut codec = CodecConfig::default();
    codec.compression_level = 10;
    assert!(codec.validate().iter().any(|e| e.contains("compression level")));
    codec.compression_level = 0;
    assert!(codec.validate().is_empty());
}

#[test]
fn test_tiny_decompression_limit_rejected() {
    let codec = CodecConfig {
        max_decompressed_size: 100,
        ..CodecConfig::default()
    };
    assert!(codec.validate().iter().any(|e| e.contains("too small")));
}

#[test]
fn test_logging_app_name() {
    let mut logging = LoggingConfig::default();
    logging.app_name = String::new();
    assert!(logging.validate().iter().any(|e| e.contains("cannot be empty")));
    logging.app_name = "x".repeat(65);
    assert!(logging.validate().iter().any(|e| e.contains("too long")));
}

#[test]
fn test_validate_strict_collects_errors() {
    let config = TagConfig::default_with_overrides(|c| {
        c.codec.compression_level = 42;
        c.logging.app_name = String::new();
    });
    let err = config.validate_strict().unwrap_err().to_string();
    assert!(err.contains("compression level"));
    assert!(err.contains("cannot be empty"));
}

#[test]
fn test_toml_roundtrip() {
    let toml = r#"
        [codec]
        max_depth = 64
        compression_level = 9
        max_decompressed_size = 1048576

        [mapping]
        nesting = "boxed"
        max_depth = 32
        error_mode = "raise"

        [logging]
        app_name = "tag-tool"
        log_level = "debug"
        json_format = true
    "#;
    let config = TagConfig::from_toml(toml).unwrap();
    assert_eq!(config.codec.max_depth, 64);
    assert_eq!(config.mapping.nesting, Nesting::Boxed);
    assert_eq!(config.mapping.error_mode, ErrorMode::Raise);
    assert_eq!(config.logging.log_level, Level::DEBUG);

    let mapper = TagMapper::from_config(&config);
    assert_eq!(mapper.options(), &config.mapping);

    let reparsed = TagConfig::from_toml(&TagConfig::example_config()).unwrap();
    assert_eq!(reparsed.codec, CodecConfig::default());
}

#[test]
fn test_partial_sections_keep_defaults() {
    let toml = r#"
        [codec]
        compression_level = 1

        [mapping]
        nesting = "boxed"

        [logging]
        json_format = true
    "#;
    let config = TagConfig::from_toml(toml).unwrap();
    assert_eq!(config.codec.compression_level, 1);
    assert_eq!(config.codec.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.mapping.nesting, Nesting::Boxed);
    assert_eq!(config.mapping.max_depth, DEFAULT_MAPPING_DEPTH);
    assert_eq!(config.logging.app_name, LoggingConfig::default().app_name);
    assert!(config.logging.json_format);
    assert!(config.validate().is_empty());
}

#[test]
fn test_tree_depth_covers_member_levels() {
    let options = MappingOptions::default().with_max_depth(10);
    assert_eq!(options.tree_depth(), 21);
    assert_eq!(
        MappingOptions::default().with_max_depth(usize::MAX).tree_depth(),
        usize::MAX
    );
}

#[test]
fn test_invalid_toml_is_configuration_error() {
    let err = TagConfig::from_toml("[mapping]\nnesting = \"sideways\"").unwrap_err();
    assert!(err.to_string().to_lowercase().contains("config"));
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyper-tag.toml");
    let config = TagConfig::default_with_overrides(|c| {
        c.mapping = MappingOptions::raising().with_max_depth(100);
    });
    config.save_to_file(&path).unwrap();

    let loaded = TagConfig::from_file(&path).unwrap();
    assert_eq!(loaded.mapping, config.mapping);
    assert!(TagConfig::from_file(dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_mode_and_nesting_names() {
    assert_eq!(Nesting::from_name("BLOB"), Some(Nesting::Boxed));
    assert_eq!(Nesting::from_name(" embedded "), Some(Nesting::Embedded));
    assert_eq!(Nesting::from_name("inline"), None);
    assert_eq!(ErrorMode::from_name("throw"), Some(ErrorMode::Raise));
    assert_eq!(ErrorMode::from_name("Suppress"), Some(ErrorMode::Suppress));
}
