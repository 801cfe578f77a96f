//! Bundled declarations of the Swing/AWT listener surface
//!
//! The stubs are plain Java sources compiled into the binary and parsed through
//! the same front end as user code. Only the parts the listener model reads are
//! declared: registration methods, listener interfaces, adapters and events.

/// (file name, source) pairs in load order
pub const SOURCES: &[(&str, &str)] = &[
    ("lang.java", include_str!("toolkit/lang.java")),
    ("util.java", include_str!("toolkit/util.java")),
    ("beans.java", include_str!("toolkit/beans.java")),
    ("awt.java", include_str!("toolkit/awt.java")),
    ("awt_event.java", include_str!("toolkit/awt_event.java")),
    ("swing.java", include_str!("toolkit/swing.java")),
    ("swing_event.java", include_str!("toolkit/swing_event.java")),
];

/// Qualified name of the marker interface every listener family extends
pub const EVENT_LISTENER: &str = "java.util.EventListener";
