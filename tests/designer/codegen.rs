//! Code generation in each implementation style

use eventwire::{
    EventwireError, ImplementationStyle, InnerPosition, Outcome, RoutingDecision, Scripted, Shape,
};

use crate::common::fixtures::{EMPTY_PANEL, SWING_ONLY};
use crate::common::{
    assert_absent, assert_before, assert_once, config_with_style, designer, designer_with,
};

// ============================================================================
// ANONYMOUS
// ============================================================================

#[test]
fn test_anonymous_adapter_for_button() {
    let mut designer = designer(EMPTY_PANEL);
    let location = designer.ensure_method("m_button", "key", "pressed").unwrap();

    let text = designer.text();
    assert!(text.contains(
        "    add(m_button);\n    m_button.addKeyListener(new KeyAdapter() {\n      @Override\n      public void keyPressed(KeyEvent e) {\n      }\n    });\n  }\n"
    ));
    // wildcard import already covers the listener types
    assert_once(text, "import java.awt.event");
    assert_eq!(location.line, 13);

    let tree = designer.events().unwrap();
    let key = tree.component("m_button").unwrap().group("key").unwrap();
    assert_eq!(key.shape, Some(Shape::AnonymousImpl));
    assert_eq!(key.value_summary, "[pressed]");
}

#[test]
fn test_adapter_supplies_defaults() {
    let mut designer = designer(EMPTY_PANEL);
    designer.ensure_method("m_button", "focus", "lost").unwrap();
    let text = designer.text();
    // FocusAdapter supplies defaults, only the requested method is written
    assert!(text.contains("new FocusAdapter() {"));
    assert_once(text, "public void focusLost(FocusEvent e)");
    assert_absent(text, "focusGained");

    designer.ensure_method("m_button", "action", "performed").unwrap();
    assert_once(designer.text(), "m_button.addActionListener(new ActionListener() {");
}

#[test]
fn test_missing_method_joins_existing_implementation() {
    let mut designer = designer(EMPTY_PANEL);
    designer.ensure_method("m_button", "key", "pressed").unwrap();
    designer.ensure_method("m_button", "key", "typed").unwrap();

    let text = designer.text();
    assert_once(text, "addKeyListener");
    assert_before(text, "public void keyPressed", "public void keyTyped");
    let tree = designer.events().unwrap();
    let key = tree.component("m_button").unwrap().group("key").unwrap();
    assert_eq!(key.value_summary, "[pressed, typed]");
}

#[test]
fn test_ensure_is_idempotent() {
    let mut designer = designer(EMPTY_PANEL);
    let first = designer.ensure_method("m_button", "key", "pressed").unwrap();
    let after_first = designer.text().to_string();
    let second = designer.ensure_method("m_button", "key", "pressed").unwrap();

    assert_eq!(first, second);
    assert_eq!(designer.text(), after_first);
    assert_once(designer.text(), "public void keyPressed");
}

#[test]
fn test_ensure_then_remove_restores_source() {
    let mut designer = designer(EMPTY_PANEL);
    designer.ensure_method("m_button", "mouse", "clicked").unwrap();
    assert_ne!(designer.text(), EMPTY_PANEL);

    let outcome = designer
        .remove_method("m_button", "mouse", "clicked", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(designer.text(), EMPTY_PANEL);
}

#[test]
fn test_ensure_then_remove_drops_added_imports() {
    let source = SWING_ONLY.replace(
        "import javax.swing.*;\n",
        "import javax.swing.*;\nimport java.util.List;\n",
    );
    let mut designer = designer(&source);
    designer.ensure_method("m_button", "action", "performed").unwrap();
    assert_once(designer.text(), "import java.awt.event.ActionListener;");

    let outcome = designer
        .remove_method("m_button", "action", "performed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    // imports unused before the edit stay
    assert_eq!(designer.text(), source);
}

#[test]
fn test_inner_class_round_trip_with_imports() {
    let mut designer = designer_with(SWING_ONLY, config_with_style(ImplementationStyle::InnerClass));
    designer.ensure_method("m_button", "action", "performed").unwrap();
    designer
        .remove_listener("m_button", "action", &mut Scripted::yes())
        .unwrap();
    assert_eq!(designer.text(), SWING_ONLY);
}

#[test]
fn test_stub_generation_round_trip() {
    let mut designer = designer(EMPTY_PANEL);
    designer.config_mut().codegen.create_stub = true;
    let location = designer.ensure_method("m_button", "key", "pressed").unwrap();

    let text = designer.text().to_string();
    assert!(text.contains("        do_m_button_keyPressed(e);\n"));
    assert!(text.contains("\n  private void do_m_button_keyPressed(KeyEvent e) {\n  }\n}\n"));
    // the handler location is the override inside the anonymous class
    assert_eq!(location.line, 13);

    designer
        .remove_method("m_button", "key", "pressed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(designer.text(), EMPTY_PANEL);
}

#[test]
fn test_generation_options() {
    let mut designer = designer(EMPTY_PANEL);
    designer.config_mut().codegen.add_override = false;
    designer.config_mut().codegen.final_parameters = true;
    designer.ensure_method("m_button", "key", "pressed").unwrap();

    let text = designer.text();
    assert_absent(text, "@Override");
    assert_once(text, "public void keyPressed(final KeyEvent e) {");
}

#[test]
fn test_imports_are_added_when_missing() {
    let mut designer = designer(SWING_ONLY);
    designer.ensure_method("m_button", "action", "performed").unwrap();
    let text = designer.text();
    assert!(text.contains(
        "import javax.swing.*;\nimport java.awt.event.ActionEvent;\nimport java.awt.event.ActionListener;\n"
    ));
    assert_once(text, "public void actionPerformed(ActionEvent e) {");
}

#[test]
fn test_local_component_registration_follows_its_statements() {
    let source = r#"import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  public Test() {
    JButton button = new JButton();
    add(button);
    setVisible(true);
  }
}
"#;
    let mut designer = designer(source);
    designer.ensure_method("button", "action", "performed").unwrap();
    assert_before(designer.text(), "add(button);", "button.addActionListener");
    assert_before(designer.text(), "button.addActionListener", "setVisible(true);");
}

#[test]
fn test_no_constructor_cannot_host_registration() {
    let source = r#"import javax.swing.*;
public class Test extends JPanel {
}
"#;
    let mut designer = designer(source);
    assert!(designer.events().is_ok());
    assert!(matches!(
        designer.ensure_method("this", "key", "pressed"),
        Err(EventwireError::NoConstructionCode { .. })
    ));
    assert_eq!(designer.text(), source);
}

// ============================================================================
// INNER CLASS
// ============================================================================

#[test]
fn test_inner_class_last() {
    let mut designer = designer_with(SWING_ONLY, config_with_style(ImplementationStyle::InnerClass));
    designer.ensure_method("m_button", "action", "performed").unwrap();

    let text = designer.text();
    assert!(text.contains(
        "    add(m_button);\n    m_button.addActionListener(new ButtonActionListener());\n  }\n"
    ));
    assert!(text.contains(
        "\n  private class ButtonActionListener implements ActionListener {\n    @Override\n    public void actionPerformed(ActionEvent e) {\n    }\n  }\n}\n"
    ));
    assert_before(text, "public Test()", "private class ButtonActionListener");

    let tree = designer.events().unwrap();
    let action = tree.component("m_button").unwrap().group("action").unwrap();
    assert_eq!(action.shape, Some(Shape::NamedInnerImpl));
}

#[test]
fn test_inner_class_first() {
    let mut config = config_with_style(ImplementationStyle::InnerClass);
    config.codegen.inner_position = InnerPosition::First;
    let mut designer = designer_with(EMPTY_PANEL, config);
    designer.ensure_method("m_button", "key", "released").unwrap();

    let text = designer.text();
    assert_before(text, "private class ButtonKeyListener extends KeyAdapter", "private JButton m_button");
    assert_once(text, "public void keyReleased(KeyEvent e)");
    assert_absent(text, "keyPressed");
}

#[test]
fn test_inner_class_names_are_unique() {
    let source = EMPTY_PANEL.replace(
        "    add(m_button);\n  }\n",
        "    add(m_button);\n  }\n\n  private static class ButtonKeyListener {\n  }\n",
    );
    let mut designer = designer_with(&source, config_with_style(ImplementationStyle::InnerClass));
    designer.ensure_method("m_button", "key", "pressed").unwrap();
    assert_once(designer.text(), "new ButtonKeyListener1()");
    assert_once(designer.text(), "private class ButtonKeyListener1 extends KeyAdapter {");
}

#[test]
fn test_inner_class_round_trip() {
    let mut designer = designer_with(EMPTY_PANEL, config_with_style(ImplementationStyle::InnerClass));
    designer.ensure_method("m_button", "action", "performed").unwrap();
    designer
        .remove_method("m_button", "action", "performed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(designer.text(), EMPTY_PANEL);
}

// ============================================================================
// SELF IMPLEMENTATION
// ============================================================================

#[test]
fn test_interface_style_for_root() {
    let mut designer = designer_with(EMPTY_PANEL, config_with_style(ImplementationStyle::Interface));
    designer.ensure_method("this", "key", "pressed").unwrap();

    let text = designer.text();
    assert_once(text, "public class Test extends JPanel implements KeyListener {");
    assert!(text.contains("    add(m_button);\n    addKeyListener(this);\n  }\n"));
    assert_once(text, "public void keyPressed(KeyEvent e) {");
    assert_once(text, "public void keyReleased(KeyEvent e) {");
    assert_once(text, "public void keyTyped(KeyEvent e) {");

    let tree = designer.events().unwrap();
    let key = tree.component("this").unwrap().group("key").unwrap();
    assert_eq!(key.shape, Some(Shape::SelfImpl));
    assert_eq!(key.method("pressed").unwrap().routing, Some(RoutingDecision::Handler));
}

#[test]
fn test_interface_style_routes_field_component() {
    let mut designer = designer_with(EMPTY_PANEL, config_with_style(ImplementationStyle::Interface));
    let location = designer.ensure_method("m_button", "action", "performed").unwrap();

    let text = designer.text().to_string();
    assert_once(&text, "implements ActionListener");
    assert_once(&text, "m_button.addActionListener(this);");
    assert!(text.contains(
        "    if (e.getSource() == m_button) {\n      do_m_button_actionPerformed(e);\n    }\n"
    ));
    assert_once(&text, "private void do_m_button_actionPerformed(ActionEvent e) {");

    let tree = designer.events().unwrap();
    let performed = tree
        .component("m_button")
        .unwrap()
        .group("action")
        .unwrap()
        .method("performed")
        .unwrap()
        .clone();
    assert!(matches!(
        performed.routing,
        Some(RoutingDecision::RoutedToStub { ref stub, .. }) if stub == "do_m_button_actionPerformed"
    ));
    assert_eq!(performed.line, Some(location.line));

    // already routed: nothing to do
    designer.ensure_method("m_button", "action", "performed").unwrap();
    assert_eq!(designer.text(), text);
}

#[test]
fn test_interface_style_falls_back_for_local_component() {
    let source = r#"import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  public Test() {
    JButton button = new JButton();
    add(button);
  }
}
"#;
    let mut designer = designer_with(source, config_with_style(ImplementationStyle::Interface));
    designer.ensure_method("button", "action", "performed").unwrap();
    let text = designer.text();
    assert_once(text, "button.addActionListener(new ActionListener() {");
    assert_absent(text, "implements");
}

#[test]
fn test_interface_style_falls_back_for_adapter_class_callback() {
    let source = r#"package test;
import javax.swing.*;
public abstract class ClickHandler {
  public abstract void clicked(java.awt.event.ActionEvent event);
}
public class ClickPanel extends JPanel {
  public void addClickHandler(ClickHandler handler) {
  }
}
public class Test extends JPanel {
  private ClickPanel m_panel = new ClickPanel();
  public Test() {
  }
}
"#;
    let mut designer = designer_with(source, config_with_style(ImplementationStyle::Interface));
    designer.ensure_method("m_panel", "click", "clicked").unwrap();
    let text = designer.text();
    assert_once(text, "m_panel.addClickHandler(new ClickHandler() {");
    assert_absent(text, "implements ClickHandler");
}
