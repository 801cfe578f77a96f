//! Java sources shared by the integration tests

/// Root component with an anonymous key adapter handling two of three methods
pub const KEY_ADAPTER: &str = r#"package test;
import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  public Test() {
    addKeyListener(new KeyAdapter() {
      public void keyPressed(KeyEvent e) {
      }
      public void keyReleased(KeyEvent e) {
      }
    });
  }
}
"#;

/// Empty designed class with wildcard imports and one button
pub const EMPTY_PANEL: &str = r#"package test;

import java.awt.event.*;
import javax.swing.*;

public class Test extends JPanel {
  private JButton m_button = new JButton();

  public Test() {
    add(m_button);
  }
}
"#;

/// Designed class importing only Swing
pub const SWING_ONLY: &str = r#"package test;

import javax.swing.*;

public class Test extends JPanel {
  private JButton m_button = new JButton();

  public Test() {
    add(m_button);
  }
}
"#;

/// Self-implemented key listener routing `keyPressed` of the root to a stub
pub const ROUTED_BLOCK: &str = r#"package test;
import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel implements KeyListener {
  public Test() {
    addKeyListener(this);
  }
  public void keyPressed(KeyEvent e) {
    if (e.getSource() == this) {
      onThis_keyPressed(e);
    }
  }
  public void keyReleased(KeyEvent e) {
  }
  public void keyTyped(KeyEvent e) {
    System.out.println(e.getKeyChar());
  }
  private void onThis_keyPressed(KeyEvent e) {
  }
}
"#;

/// Two buttons sharing one named implementation class
pub const SHARED_HANDLER: &str = r#"package test;
import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel {
  private JButton m_first = new JButton();
  private JButton m_second = new JButton();
  public Test() {
    m_first.addActionListener(new ButtonHandler());
    m_second.addActionListener(new ButtonHandler());
  }
  private class ButtonHandler implements ActionListener {
    public void actionPerformed(ActionEvent e) {
      System.out.println(e.getActionCommand());
    }
  }
}
"#;

/// Button routed through the designed class, which implements the listener
pub const ROUTED_BUTTON: &str = r#"package test;
import java.awt.event.*;
import javax.swing.*;
public class Test extends JPanel implements ActionListener {
  private JButton m_button = new JButton();
  private JButton m_other = new JButton();
  public Test() {
    add(m_button);
    add(m_other);
    m_button.addActionListener(this);
    m_other.addActionListener(this);
  }
  public void actionPerformed(ActionEvent e) {
    if (e.getSource() == m_button) {
      do_m_button_actionPerformed(e);
    }
    if (e.getSource() == m_other) {
      do_m_other_actionPerformed(e);
    }
  }
  private void do_m_button_actionPerformed(ActionEvent e) {
  }
  private void do_m_other_actionPerformed(ActionEvent e) {
  }
}
"#;

/// Component hierarchy fixing a listener's type argument four levels up
pub const GENERIC_PANELS: &str = r#"package test;

import javax.swing.JPanel;

public abstract class MyEvent<E> {
}

public abstract class MyListener<E> {
  public abstract void handle(MyEvent<E> event);
}

public class MyPanel<D> extends JPanel {
  public void addMyListener(MyListener<D> listener) {
  }
}

public class MyPanel2<D2> extends MyPanel<D2> {
}

public class MyPanel3<D3> extends MyPanel2<D3> {
}

public class MyPanel4 extends MyPanel3<String> {
}

public class MyPanel5 extends MyPanel4 {
}
"#;
