//! Tests for the eventwire CLI binary
//!
//! Commands run without a terminal, so removal questions are answered from
//! `--yes` and `--decision` only.

use crate::common::fixtures::{KEY_ADAPTER, SHARED_HANDLER, SWING_ONLY};
use crate::common::{assert_absent, assert_once, TestProject};

#[test]
fn test_list_json_shows_registered_groups() {
    let project = TestProject::new();
    project.add_file("Test.java", KEY_ADAPTER);

    let output = project.run_cli_success(&["list", "Test.java", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let groups = json["components"][0]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["title"], "key");
    assert_eq!(groups[0]["value_summary"], "[pressed, released]");
}

#[test]
fn test_list_text() {
    let project = TestProject::new();
    project.add_file("Test.java", KEY_ADAPTER);

    let output = project.run_cli_success(&["list", "Test.java"]);
    assert!(output.starts_with("Test\n"));
    assert!(output.contains("    key [pressed, released]\n"));
    assert!(output.contains("      pressed line 7\n"));
    assert!(output.contains("      typed -\n"));

    let all = project.run_cli_success(&["list", "Test.java", "--all"]);
    assert!(all.contains("    focus []\n"));
}

#[test]
fn test_menu_lists_ancestor_capabilities() {
    let project = TestProject::new();
    project.add_file("Test.java", KEY_ADAPTER);

    let output = project.run_cli_success(&["menu", "Test.java", "this"]);
    assert!(output.starts_with("[ancestor]\n"));
    assert!(output.contains("  key (listener-existing)\n"));
    assert!(output.contains("    pressed (method-existing)\n"));
}

#[test]
fn test_add_writes_file() {
    let project = TestProject::new();
    project.add_file("Test.java", SWING_ONLY);

    let output = project.run_cli_success(&["add", "Test.java", "m_button", "action", "performed"]);
    assert!(output.contains("add m_button.action.performed: Applied"));
    let written = project.read("Test.java");
    assert_once(&written, "m_button.addActionListener(new ActionListener() {");
    assert_once(&written, "import java.awt.event.ActionListener;");
}

#[test]
fn test_add_dry_run_prints_source() {
    let project = TestProject::new();
    project.add_file("Test.java", SWING_ONLY);

    let output = project.run_cli_success(&[
        "add", "Test.java", "m_button", "action", "performed", "--style", "inner-class", "--dry-run",
    ]);
    assert!(output.contains("private class ButtonActionListener implements ActionListener {"));
    assert_eq!(project.read("Test.java"), SWING_ONLY);
}

#[test]
fn test_remove_all_usages_from_flags() {
    let project = TestProject::new();
    project.add_file("Test.java", SHARED_HANDLER);

    let output = project.run_cli_success(&[
        "remove", "Test.java", "m_second", "action", "--all", "--yes", "--decision", "all-usages",
    ]);
    assert!(output.contains("Applied"));
    let written = project.read("Test.java");
    assert_absent(&written, "ButtonHandler");
}

#[test]
fn test_remove_without_confirmation_is_cancelled() {
    let project = TestProject::new();
    project.add_file("Test.java", KEY_ADAPTER);

    let output = project.run_cli_success(&["remove", "Test.java", "this", "key", "pressed"]);
    assert!(output.contains("Cancelled"));
    assert_eq!(project.read("Test.java"), KEY_ADAPTER);

    project.run_cli_success(&["remove", "Test.java", "this", "key", "pressed", "--yes"]);
    assert_absent(&project.read("Test.java"), "keyPressed");
}

#[test]
fn test_delete_component() {
    let project = TestProject::new();
    project.add_file("Test.java", SHARED_HANDLER);

    project.run_cli_success(&["delete-component", "Test.java", "m_second"]);
    let written = project.read("Test.java");
    assert_absent(&written, "m_second");
    assert_once(&written, "private class ButtonHandler");
}

#[test]
fn test_exit_codes() {
    let project = TestProject::new();
    project.add_file("Test.java", KEY_ADAPTER);

    let unknown = project.run_cli(&["add", "Test.java", "m_nothing", "key", "pressed"]);
    assert_eq!(unknown.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("Unknown component: m_nothing"));

    let missing = project.run_cli(&["list", "Missing.java"]);
    assert_eq!(missing.status.code(), Some(1));
}
