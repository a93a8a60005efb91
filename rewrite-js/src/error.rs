use scan_js::error::SyntaxError;
use scan_js::span::Span;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A module that could not be scanned. It is left untouched.
#[derive(Debug, Error)]
#[error("failed to parse {}: {error}", file.display())]
pub struct ParseError {
  pub file: PathBuf,
  #[source]
  pub error: SyntaxError,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FsOperation {
  Read,
  Write,
}

impl Display for FsOperation {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      FsOperation::Read => "read",
      FsOperation::Write => "write",
    })
  }
}

#[derive(Debug, Error)]
pub enum RewriteError {
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error("failed to {operation} {}: {source}", path.display())]
  FileSystem {
    path: PathBuf,
    operation: FsOperation,
    source: io::Error,
  },
}

/// An import statement whose specifier couldn't be handled. The statement is copied verbatim.
#[derive(Clone, PartialEq, Eq, Debug, Error, Serialize)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum StatementRewriteAnomaly {
  #[error("specifier at {specifier:?} lies outside its statement at {statement:?}")]
  SpecifierOutOfBounds { statement: Span, specifier: Span },
  #[error("specifier at {specifier:?} does not fall on character boundaries")]
  NotCharBoundary { specifier: Span },
  #[error("specifier `{specifier}` contains escape sequences")]
  EscapedSpecifier { specifier: String },
  #[error("empty specifier in statement at {statement:?}")]
  EmptySpecifier { statement: Span },
}
