//! Behavioural scenarios: summaries, routing classification, stub removal
//! and shared implementation types

use eventwire::{EventwireError, MultiUseChoice, Outcome, Recording, RoutingDecision, Scripted};

use crate::common::fixtures::{KEY_ADAPTER, ROUTED_BLOCK, SHARED_HANDLER};
use crate::common::{assert_absent, assert_once, designer};

// ============================================================================
// SUMMARIES
// ============================================================================

#[test]
fn test_anonymous_adapter_summaries() {
    let designer = designer(KEY_ADAPTER);
    let tree = designer.events().unwrap();
    let root = tree.component("this").unwrap();

    let key = root.group("key").unwrap();
    assert!(key.is_modified);
    assert_eq!(key.value_summary, "[pressed, released]");
    assert_eq!(key.method("pressed").unwrap().value_summary.as_deref(), Some("line 7"));
    assert_eq!(key.method("released").unwrap().value_summary.as_deref(), Some("line 9"));
    assert!(key.method("typed").unwrap().value_summary.is_none());

    let focus = root.group("focus").unwrap();
    assert!(!focus.is_modified);
    assert_eq!(focus.value_summary, "[]");
}

#[test]
fn test_events_tree_serializes() {
    let designer = designer(KEY_ADAPTER);
    let json = serde_json::to_value(designer.events().unwrap()).unwrap();
    assert_eq!(json["class_name"], "Test");
    let groups = json["components"][0]["groups"].as_array().unwrap();
    let key = groups.iter().find(|g| g["title"] == "key").unwrap();
    assert_eq!(key["value_summary"], "[pressed, released]");
    assert_eq!(key["shape"], "anonymous_impl");
}

#[test]
fn test_unregistered_capability_is_left_alone() {
    let mut designer = designer(KEY_ADAPTER);
    let tree = designer.events().unwrap();
    let focus = tree.component("this").unwrap().group("focus").unwrap();
    assert!(focus.methods.iter().all(|m| m.value_summary.is_none()));

    let outcome = designer
        .remove_method("this", "focus", "gained", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    let outcome = designer.remove_listener("this", "focus", &mut Scripted::yes()).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(designer.text(), KEY_ADAPTER);
}

#[test]
fn test_unknown_names_are_errors() {
    let mut designer = designer(KEY_ADAPTER);
    assert!(matches!(
        designer.ensure_method("m_missing", "key", "pressed"),
        Err(EventwireError::UnknownComponent { .. })
    ));
    assert!(matches!(
        designer.ensure_method("this", "nothing", "pressed"),
        Err(EventwireError::UnknownListener { .. })
    ));
    assert!(matches!(
        designer.ensure_method("this", "key", "exploded"),
        Err(EventwireError::UnknownMethod { .. })
    ));
    assert_eq!(designer.text(), KEY_ADAPTER);
}

// ============================================================================
// ROUTING
// ============================================================================

fn routing_kinds(source: &str) -> Vec<String> {
    let designer = designer(source);
    let tree = designer.events().unwrap();
    let key = tree.component("this").unwrap().group("key").unwrap();
    key.methods
        .iter()
        .map(|m| match &m.routing {
            Some(RoutingDecision::RoutedToStub { stub, .. }) => format!("stub:{}", stub),
            Some(RoutingDecision::Handler) => "handler".to_string(),
            Some(RoutingDecision::NotPresent) => "absent".to_string(),
            None => "none".to_string(),
        })
        .collect()
}

#[test]
fn test_block_and_flat_guards_classify_identically() {
    let flat = ROUTED_BLOCK.replace(
        "if (e.getSource() == this) {\n      onThis_keyPressed(e);\n    }",
        "if (e.getSource() == this) onThis_keyPressed(e);",
    );
    assert_ne!(flat, ROUTED_BLOCK);

    let block = routing_kinds(ROUTED_BLOCK);
    assert_eq!(block, vec!["stub:onThis_keyPressed", "handler", "handler"]);
    assert_eq!(routing_kinds(&flat), block);
}

#[test]
fn test_routed_method_points_at_stub() {
    let designer = designer(ROUTED_BLOCK);
    let tree = designer.events().unwrap();
    let key = tree.component("this").unwrap().group("key").unwrap();
    assert_eq!(key.method("pressed").unwrap().line, Some(18));
    assert_eq!(key.method("typed").unwrap().line, Some(15));

    let location = designer.locate("this", "key", "pressed").unwrap().unwrap();
    assert_eq!(location.line, 18);
}

#[test]
fn test_else_branch_makes_handler() {
    let source = ROUTED_BLOCK.replace(
        "      onThis_keyPressed(e);\n    }",
        "      onThis_keyPressed(e);\n    } else {\n      System.out.println(e);\n    }",
    );
    assert_eq!(routing_kinds(&source)[0], "handler");
}

// ============================================================================
// STUB REMOVAL
// ============================================================================

#[test]
fn test_removing_routed_method_deletes_unreferenced_stub() {
    let mut designer = designer(ROUTED_BLOCK);
    let outcome = designer
        .remove_method("this", "key", "pressed", &mut Scripted::yes())
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert_absent(text, "onThis_keyPressed");
    assert_absent(text, "e.getSource()");
    assert!(text.contains("  public void keyPressed(KeyEvent e) {\n  }\n"));
    assert_once(text, "addKeyListener(this);");

    let tree = designer.events().unwrap();
    let key = tree.component("this").unwrap().group("key").unwrap();
    assert_eq!(key.method("pressed").unwrap().routing, Some(RoutingDecision::Handler));
}

#[test]
fn test_stub_called_elsewhere_is_kept() {
    let source = ROUTED_BLOCK.replace(
        "    addKeyListener(this);\n",
        "    addKeyListener(this);\n    onThis_keyPressed(null);\n",
    );
    let mut designer = designer(&source);
    designer
        .remove_method("this", "key", "pressed", &mut Scripted::yes())
        .unwrap();

    let text = designer.text();
    assert_absent(text, "if (e.getSource() == this)");
    assert_once(text, "private void onThis_keyPressed(KeyEvent e) {");
    assert_once(text, "onThis_keyPressed(null);");
}

#[test]
fn test_stub_kept_when_deletion_disabled() {
    let mut designer = designer(ROUTED_BLOCK);
    designer.config_mut().removal.delete_stub = false;
    designer
        .remove_method("this", "key", "pressed", &mut Scripted::yes())
        .unwrap();
    assert_once(designer.text(), "private void onThis_keyPressed(KeyEvent e) {");
}

// ============================================================================
// SHARED IMPLEMENTATION TYPES
// ============================================================================

#[test]
fn test_deleting_second_component_keeps_shared_type() {
    let mut designer = designer(SHARED_HANDLER);
    let outcome = designer.delete_component("m_second").unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert_absent(text, "m_second");
    assert_once(text, "m_first.addActionListener(new ButtonHandler());");
    assert_once(text, "private class ButtonHandler implements ActionListener {");
    assert_once(text, "System.out.println(e.getActionCommand());");
}

#[test]
fn test_this_usage_only_removes_one_registration() {
    let mut designer = designer(SHARED_HANDLER);
    let mut decisions = Recording::new(Scripted::new(true, Some(MultiUseChoice::ThisUsageOnly)));
    let outcome = designer.remove_listener("m_second", "action", &mut decisions).unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(decisions.confirmations.len(), 1);
    assert_eq!(decisions.multi_use_questions, vec![("ButtonHandler".to_string(), 2)]);

    let text = designer.text();
    assert_absent(text, "m_second.addActionListener");
    assert_once(text, "m_first.addActionListener(new ButtonHandler());");
    assert_once(text, "private class ButtonHandler");
}

#[test]
fn test_all_usages_removes_registrations_and_type() {
    let mut designer = designer(SHARED_HANDLER);
    let mut decisions = Scripted::new(true, Some(MultiUseChoice::AllUsages));
    let outcome = designer.remove_listener("m_second", "action", &mut decisions).unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let text = designer.text();
    assert_absent(text, "addActionListener");
    assert_absent(text, "ButtonHandler");
    assert_once(text, "private JButton m_first = new JButton();");
    assert_once(text, "private JButton m_second = new JButton();");
}

#[test]
fn test_removing_shared_method_across_all_usages() {
    let mut designer = designer(SHARED_HANDLER);
    let mut decisions = Scripted::new(true, Some(MultiUseChoice::AllUsages));
    designer
        .remove_method("m_first", "action", "performed", &mut decisions)
        .unwrap();
    let text = designer.text();
    assert_absent(text, "ButtonHandler");
    assert_absent(text, "addActionListener");
}

#[test]
fn test_no_decision_means_no_edit() {
    let mut designer = designer(SHARED_HANDLER);
    let outcome = designer
        .remove_listener("m_second", "action", &mut Scripted::new(true, None))
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);

    let outcome = designer
        .remove_method(
            "m_first",
            "action",
            "performed",
            &mut Scripted::new(true, Some(MultiUseChoice::Cancel)),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(designer.text(), SHARED_HANDLER);
}

#[test]
fn test_declined_confirmation_skips_multi_use_question() {
    let mut designer = designer(SHARED_HANDLER);
    let mut decisions = Recording::new(Scripted::new(false, Some(MultiUseChoice::AllUsages)));
    let outcome = designer
        .remove_method("m_first", "action", "performed", &mut decisions)
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(decisions.confirmations.len(), 1);
    assert!(decisions.multi_use_questions.is_empty());
    assert_eq!(designer.text(), SHARED_HANDLER);
}
