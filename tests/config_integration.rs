//! Integration tests for loading and saving configuration files

use tempfile::TempDir;
use vispipe_rs::config::{ExecutiveConfig, PipelineConfig, DEFAULT_LOG_FILTER};
use vispipe_rs::pipeline::{Executive, Pipeline};
use vispipe_rs::pipeline::nodes::DataSetSource;
use vispipe_rs::data::DataKind;
use vispipe_rs::VisPipeError;

fn custom() -> PipelineConfig {
    PipelineConfig {
        log_filter: "warn".to_string(),
        executive: ExecutiveConfig {
            release_data: true,
            fatal_reentrancy: true,
            max_continue_executions: 5,
        },
    }
}

#[test]
fn test_toml_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vispipe.toml");

    custom().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[executive]"), "{text}");

    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded, custom());
}

#[test]
fn test_json_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vispipe.json");

    custom().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with('{'), "{text}");

    assert_eq!(PipelineConfig::load(&path).unwrap(), custom());
}

#[test]
fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("deeper").join("vispipe.toml");

    PipelineConfig::default().save(&path).unwrap();

    assert!(path.exists());
    assert_eq!(PipelineConfig::load(&path).unwrap(), PipelineConfig::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.toml");
    std::fs::write(&path, "[executive]\nrelease_data = true\n").unwrap();

    let loaded = PipelineConfig::load(&path).unwrap();

    assert_eq!(loaded.log_filter, DEFAULT_LOG_FILTER);
    assert!(loaded.executive.release_data);
    assert!(!loaded.executive.fatal_reentrancy);
    assert_eq!(
        loaded.executive.max_continue_executions,
        ExecutiveConfig::default().max_continue_executions
    );
}

#[test]
fn test_missing_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = PipelineConfig::load(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, VisPipeError::Config(_)));
}

#[test]
fn test_malformed_file_error_names_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = PipelineConfig::load(&path).unwrap_err();

    assert!(matches!(err, VisPipeError::WithContext { .. }));
    assert!(err.to_string().contains("broken.json"), "{err}");
}

#[test]
fn test_load_or_default_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "executive = 3").unwrap();

    assert_eq!(PipelineConfig::load_or_default(&path), PipelineConfig::default());
    assert_eq!(
        PipelineConfig::load_or_default(temp_dir.path().join("absent.toml")),
        PipelineConfig::default()
    );
}

#[test]
fn test_loaded_config_drives_executives() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vispipe.toml");
    std::fs::write(&path, "[executive]\nrelease_data = true\n").unwrap();
    let config = PipelineConfig::load(&path).unwrap();

    let source = Executive::new(DataSetSource::new(DataKind::PolyData, 2), config.executive.clone())
        .unwrap();
    assert!(source.release_data_flag(0));

    let mut pipeline = Pipeline::new(config.executive);
    let id = pipeline
        .add_node(DataSetSource::new(DataKind::PolyData, 2))
        .unwrap();
    assert!(pipeline.node(id).unwrap().release_data_flag(0));
}
