//! Removal of methods and listeners, and the component deletion cascade

use eventwire::{EventwireError, Outcome, Recording, Scripted};

use crate::common::fixtures::{KEY_ADAPTER, ROUTED_BLOCK, ROUTED_BUTTON};
use crate::common::{assert_absent, assert_once, designer};

// ============================================================================
// INNER IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_remove_one_adapter_method() {
    let mut designer = designer(KEY_ADAPTER);
    let outcome = designer
        .remove_method("this", "key", "pressed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert!(text.contains(
        "    addKeyListener(new KeyAdapter() {\n      public void keyReleased(KeyEvent e) {\n      }\n    });\n"
    ));
    let tree = designer.events().unwrap();
    let key = tree.component("this").unwrap().group("key").unwrap();
    assert_eq!(key.value_summary, "[released]");
}

#[test]
fn test_remove_whole_listener() {
    let mut designer = designer(KEY_ADAPTER);
    let outcome = designer.remove_listener("this", "key", &mut Scripted::yes()).unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(
        designer.text(),
        "package test;\nimport java.awt.event.*;\nimport javax.swing.*;\npublic class Test extends JPanel {\n  public Test() {\n  }\n}\n"
    );
    let tree = designer.events().unwrap();
    assert!(tree.component("this").unwrap().events_summary.is_none());
}

#[test]
fn test_declined_confirmation_cancels() {
    let mut designer = designer(KEY_ADAPTER);
    let mut decisions = Recording::new(Scripted::new(false, None));
    let outcome = designer
        .remove_method("this", "key", "pressed", &mut decisions)
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(decisions.confirmations.len(), 1);
    assert_eq!(designer.text(), KEY_ADAPTER);
}

#[test]
fn test_confirmation_can_be_disabled() {
    let mut designer = designer(KEY_ADAPTER);
    designer.config_mut().removal.confirm = false;
    let mut decisions = Recording::new(Scripted::new(false, None));
    let outcome = designer.remove_listener("this", "key", &mut decisions).unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert!(decisions.confirmations.is_empty());
    assert_absent(designer.text(), "addKeyListener");
}

#[test]
fn test_required_methods_are_cleared_until_empty() {
    let source = r#"import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  public Test() {
    addMouseMotionListener(new MouseMotionListener() {
      public void mouseDragged(MouseEvent e) {
        System.out.println("dragged");
      }
      public void mouseMoved(MouseEvent e) {
        System.out.println("moved");
      }
    });
  }
}
"#;
    let mut designer = designer(source);
    designer
        .remove_method("this", "mouseMotion", "mouseDragged", &mut Scripted::yes())
        .unwrap();
    let text = designer.text().to_string();
    // the interface still requires the method
    assert!(text.contains("      public void mouseDragged(MouseEvent e) {\n      }\n"));
    assert_absent(&text, "\"dragged\"");
    assert_once(&text, "\"moved\"");

    designer
        .remove_method("this", "mouseMotion", "mouseMoved", &mut Scripted::yes())
        .unwrap();
    assert_absent(designer.text(), "addMouseMotionListener");
    assert_absent(designer.text(), "mouseDragged");
}

// ============================================================================
// SELF IMPLEMENTATION
// ============================================================================

#[test]
fn test_clearing_self_handler_keeps_registration() {
    let mut designer = designer(ROUTED_BLOCK);
    let mut decisions = Recording::new(Scripted::yes());
    let outcome = designer
        .remove_method("this", "key", "typed", &mut decisions)
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert!(decisions.confirmations.is_empty());

    let text = designer.text();
    assert!(text.contains("  public void keyTyped(KeyEvent e) {\n  }\n"));
    assert_once(text, "addKeyListener(this);");
    assert_once(text, "onThis_keyPressed(e);");
}

#[test]
fn test_removing_routed_method_keeps_registration() {
    let mut designer = designer(ROUTED_BUTTON);
    let outcome = designer
        .remove_method("m_button", "action", "performed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert_absent(text, "e.getSource() == m_button");
    assert_absent(text, "do_m_button_actionPerformed");
    assert_once(text, "m_button.addActionListener(this);");
    assert_once(text, "m_other.addActionListener(this);");
    assert_once(text, "private void do_m_other_actionPerformed(ActionEvent e) {");
    assert_once(text, "implements ActionListener");
}

const SELF_KEY: &str = r#"import java.awt.event.*;
import javax.swing.*;
class Test extends JPanel implements KeyListener {
  Test() {
    addKeyListener(this);
  }
  public void keyPressed(KeyEvent e) {
HANDLER  }
  public void keyReleased(KeyEvent e) {
  }
  public void keyTyped(KeyEvent e) {
  }
  private void onThis_keyPressed(KeyEvent e) {
  }
}
"#;

const SELF_KEY_CLEARED: &str = r#"import java.awt.event.*;
import javax.swing.*;
class Test extends JPanel implements KeyListener {
  Test() {
    addKeyListener(this);
  }
  public void keyPressed(KeyEvent e) {
  }
  public void keyReleased(KeyEvent e) {
  }
  public void keyTyped(KeyEvent e) {
  }
}
"#;

fn remove_pressed(handler: &str) -> String {
    let mut designer = designer(&SELF_KEY.replace("HANDLER", handler));
    let mut decisions = Recording::new(Scripted::yes());
    let outcome = designer
        .remove_method("this", "key", "pressed", &mut decisions)
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert!(decisions.confirmations.is_empty());
    designer.text().to_string()
}

#[test]
fn test_self_direct_stub_removal_keeps_empty_registration() {
    let text = remove_pressed("    onThis_keyPressed(e);\n");
    assert_eq!(text, SELF_KEY_CLEARED);
}

#[test]
fn test_self_block_guard_removal_keeps_empty_registration() {
    let text = remove_pressed("    if (e.getSource() == this) {\n      onThis_keyPressed(e);\n    }\n");
    assert_eq!(text, SELF_KEY_CLEARED);
}

#[test]
fn test_self_flat_guard_removal_keeps_empty_registration() {
    let text = remove_pressed("    if (e.getSource() == this)\n      onThis_keyPressed(e);\n");
    assert_eq!(text, SELF_KEY_CLEARED);
}

#[test]
fn test_remove_routed_listener() {
    let mut designer = designer(ROUTED_BUTTON);
    designer
        .remove_listener("m_other", "action", &mut Scripted::yes())
        .unwrap();
    let text = designer.text();
    assert_absent(text, "m_other.addActionListener");
    assert_absent(text, "e.getSource() == m_other");
    assert_absent(text, "do_m_other_actionPerformed");
    assert_once(text, "do_m_button_actionPerformed(e);");
}

// ============================================================================
// COMPONENT DELETION
// ============================================================================

#[test]
fn test_delete_routed_component() {
    let mut designer = designer(ROUTED_BUTTON);
    let outcome = designer.delete_component("m_button").unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert_absent(text, "m_button");
    assert_once(text, "private JButton m_other = new JButton();");
    assert_once(text, "add(m_other);");
    assert_once(text, "if (e.getSource() == m_other) {");
    assert!(designer.model().component("m_button").is_err());
}

#[test]
fn test_delete_component_with_stub() {
    let source = r#"import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  private JButton m_button = new JButton();
  private JLabel m_label = new JLabel();
  public Test() {
    add(m_label);
    add(m_button);
    m_button.addActionListener(new ActionListener() {
      public void actionPerformed(ActionEvent e) {
        do_m_button_actionPerformed(e);
      }
    });
  }
  private void do_m_button_actionPerformed(ActionEvent e) {
  }
}
"#;
    let mut designer = designer(source);
    designer.delete_component("m_button").unwrap();
    assert_eq!(
        designer.text(),
        r#"import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  private JLabel m_label = new JLabel();
  public Test() {
    add(m_label);
  }
}
"#
    );
}

#[test]
fn test_delete_component_removes_emptied_blocks() {
    let source = r#"import javax.swing.*;
public class Test extends JPanel {
  public Test() {
    {
      JButton button = new JButton();
      add(button);
    }
    setVisible(true);
  }
}
"#;
    let mut designer = designer(source);
    designer.delete_component("button").unwrap();
    assert_eq!(
        designer.text(),
        "import javax.swing.*;\npublic class Test extends JPanel {\n  public Test() {\n    setVisible(true);\n  }\n}\n"
    );
}

#[test]
fn test_root_cannot_be_deleted() {
    let mut designer = designer(KEY_ADAPTER);
    assert!(matches!(
        designer.delete_component("this"),
        Err(EventwireError::EditFailure { .. })
    ));
    assert_eq!(designer.text(), KEY_ADAPTER);
}
