use crate::span::Span;
use serde::Serialize;

/// How an import-kind statement requests its module.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ImportForm {
  /// `import "x"`
  SideEffect,
  /// `import a, { b } from "x"`, `import * as ns from "x"`
  Bindings,
  /// `export * from "x"`, `export { a } from "x"`
  ReExport,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct ImportStmt {
  pub form: ImportForm,
  /// Contents of the specifier string literal, quotes excluded.
  pub specifier: Span,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind")]
pub enum StatementKind {
  Import(ImportStmt),
  Other,
}

/// One top-level statement. `loc` starts at the statement's first token and ends after its last
/// token (including a terminating `;`); surrounding whitespace and comments are not included.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Statement {
  #[serde(flatten)]
  pub kind: StatementKind,
  pub loc: Span,
}

impl Statement {
  pub fn other(loc: Span) -> Statement {
    Statement {
      kind: StatementKind::Other,
      loc,
    }
  }

  pub fn import(&self) -> Option<&ImportStmt> {
    match &self.kind {
      StatementKind::Import(import) => Some(import),
      StatementKind::Other => None,
    }
  }

  pub fn is_import(&self) -> bool {
    self.import().is_some()
  }
}
