//! Configuration file loading and saving

use std::fs;

use eventwire::{EventwireConfig, EventwireError, ImplementationStyle, InnerPosition};

use crate::common::fixtures::SWING_ONLY;
use crate::common::{assert_once, designer_with, TestProject};

#[test]
fn test_missing_file_gives_defaults() {
    let project = TestProject::new();
    let config = EventwireConfig::load_from(&project.path().join("config.toml")).unwrap();
    assert_eq!(config, EventwireConfig::default());
}

#[test]
fn test_save_and_load_round_trip() {
    let project = TestProject::new();
    let path = project.path().join("eventwire").join("config.toml");

    let mut config = EventwireConfig::default();
    config.codegen.style = ImplementationStyle::InnerClass;
    config.codegen.inner_position = InnerPosition::First;
    config.codegen.stub_name_template = "on_${component_name}_${event_name}".to_string();
    config.removal.confirm = false;
    config.logging.level = "debug".to_string();
    config.save_to(&path).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(EventwireConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_invalid_files_are_config_errors() {
    let project = TestProject::new();
    let path = project.add_file("config.toml", "[codegen\nstyle = ");
    assert!(matches!(
        EventwireConfig::load_from(&path),
        Err(EventwireError::ConfigError { .. })
    ));

    fs::write(&path, "[codegen]\nstyle = \"sideways\"\n").unwrap();
    assert!(matches!(
        EventwireConfig::load_from(&path),
        Err(EventwireError::ConfigError { .. })
    ));

    fs::write(&path, "[codegen]\ninner_name_template = \"  \"\n").unwrap();
    assert!(matches!(
        EventwireConfig::load_from(&path),
        Err(EventwireError::ConfigError { .. })
    ));
}

#[test]
fn test_loaded_templates_drive_generation() {
    let project = TestProject::new();
    let path = project.add_file(
        "config.toml",
        r#"
[codegen]
style = "inner_class"
inner_name_template = "${component_name}Handler"
"#,
    );
    let config = EventwireConfig::load_from(&path).unwrap();
    let mut designer = designer_with(SWING_ONLY, config);
    designer.ensure_method("m_button", "action", "performed").unwrap();
    assert_once(designer.text(), "private class ButtonHandler implements ActionListener {");
}
