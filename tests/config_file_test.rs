//! Tests for configuration files on disk

use avatar_head_rig::{
    config::{Config, EXAMPLE_CONFIG},
    Error,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::default();
    config.smoothing.alpha = 0.35;
    config.rig.head_keywords.push("ear".to_string());
    config.camera.distance = 4.5;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.smoothing.alpha, 0.35);
    assert_eq!(loaded.rig.head_keywords, vec!["head", "hair", "face", "ear"]);
    assert_eq!(loaded.camera.distance, 4.5);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_example_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.yaml");
    fs::write(&path, EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.create_filter().unwrap().name(), "SlerpFilter");
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::from_file(dir.path().join("missing.yaml")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_unknown_filter_in_config() {
    let config = Config::from_yaml("smoothing:\n  filter: kalman\n").unwrap();
    assert!(matches!(config.create_filter(), Err(Error::FilterError(_))));
}

#[test]
fn test_validate_assets() {
    let dir = TempDir::new().unwrap();
    let scene = dir.path().join("model.vrm");
    let cascade = dir.path().join("cascade.xml");

    let mut config = Config::default();
    config.assets.scene.clone_from(&scene);
    config.assets.face_cascade.clone_from(&cascade);
    assert!(matches!(config.validate_assets(), Err(Error::ConfigError(_))));

    fs::write(&scene, b"glTF").unwrap();
    let err = config.validate_assets().unwrap_err();
    assert!(err.to_string().contains("cascade"));

    fs::write(&cascade, "<opencv_storage/>").unwrap();
    assert!(config.validate_assets().is_ok());
}
