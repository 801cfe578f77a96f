//! Java source model
//!
//! The listener model consumes source through three narrow capabilities:
//!
//! 1. **Read access** (`ast`): an owned projection of a compilation unit with
//!    byte spans on every node.
//! 2. **Parsing** (`parse`): tree-sitter-java turned into that projection.
//! 3. **Write access** (`edit`): atomic, revision-checked text transactions.
//!
//! A [`SourceUnit`] is one immutable snapshot: text plus its parsed model.
//! Mutations produce a new snapshot; nothing is patched in place.

pub mod ast;
pub mod edit;
pub mod parse;
pub mod syntax;
pub mod type_ref;

pub use ast::{CompilationUnit, Span};
pub use edit::{revision_of, Transaction};
pub use type_ref::TypeRef;

use crate::error::Result;

/// One parsed snapshot of a Java file
#[derive(Debug, Clone)]
pub struct SourceUnit {
    text: String,
    ast: CompilationUnit,
    revision: u64,
}

impl SourceUnit {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let ast = parse::parse_unit(&text)?;
        let revision = revision_of(&text);
        Ok(Self {
            text,
            ast,
            revision,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> &CompilationUnit {
        &self.ast
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    pub fn line_of(&self, offset: usize) -> usize {
        syntax::line_number(&self.text, offset)
    }

    /// Start a transaction against this snapshot
    pub fn transaction(&self) -> Transaction {
        Transaction::new(&self.text)
    }

    /// Apply a transaction and parse the result as the next snapshot
    pub fn apply(&self, transaction: Transaction) -> Result<SourceUnit> {
        let text = transaction.commit(&self.text)?;
        SourceUnit::parse(text)
    }
}
