//! Generic capabilities resolved through the component's ancestors, with
//! the component hierarchy loaded from a class path directory

use eventwire::{EventsDesigner, EventwireConfig};

use crate::common::fixtures::GENERIC_PANELS;
use crate::common::{assert_once, TestProject};

const DESIGNED: &str = r#"package test;

import javax.swing.*;

public class Test extends JPanel {
  private MyPanel5 m_panel = new MyPanel5();
  private MyPanel m_raw = new MyPanel();

  public Test() {
    add(m_panel);
    add(m_raw);
  }
}
"#;

fn designer() -> EventsDesigner {
    let project = TestProject::new();
    project.add_file("test/Panels.java", GENERIC_PANELS);
    EventsDesigner::new(DESIGNED, project.registry(), EventwireConfig::default()).unwrap()
}

#[test]
fn test_type_argument_fixed_four_levels_up() {
    let designer = designer();
    let tree = designer.events().unwrap();
    let my = tree.component("m_panel").unwrap().group("my").unwrap();
    assert_eq!(my.callback, "MyListener<String>");
    assert_eq!(my.methods.len(), 1);
    assert_eq!(my.methods[0].name, "handle");
}

#[test]
fn test_generated_method_uses_resolved_parameter() {
    let mut designer = designer();
    designer.ensure_method("m_panel", "my", "handle").unwrap();
    let text = designer.text();
    assert_once(text, "m_panel.addMyListener(new MyListener<String>() {");
    assert_once(text, "public void handle(MyEvent<String> event) {");
}

#[test]
fn test_raw_use_falls_back_to_object() {
    let mut designer = designer();
    designer.ensure_method("m_raw", "my", "handle").unwrap();
    assert_once(designer.text(), "public void handle(MyEvent<Object> event) {");
}

#[test]
fn test_inherited_capabilities_are_grouped_as_ancestor() {
    let designer = designer();
    let menu = designer.menu("m_panel").unwrap();
    assert!(menu.own.is_empty());
    assert!(menu.ancestor.iter().any(|g| g.title == "my"));
    assert!(menu.ancestor.iter().any(|g| g.title == "key"));

    let raw = designer.menu("m_raw").unwrap();
    assert!(raw.own.iter().any(|g| g.title == "my"));
}
