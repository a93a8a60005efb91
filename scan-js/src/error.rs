use crate::span::Span;
use parse_js::token::TokenType;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced while scanning a module.
///
/// Diagnostic codes (prefix `SC`) are assigned per variant and are stable:
/// - `SC0001`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `SC0002`: [`SyntaxErrorType::InvalidToken`]
/// - `SC0003`: [`SyntaxErrorType::JsxClosingTagMismatch`]
/// - `SC0004`: [`SyntaxErrorType::LineTerminatorInRegex`]
/// - `SC0005`: [`SyntaxErrorType::LineTerminatorInString`]
/// - `SC0006`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `SC0007`: [`SyntaxErrorType::UnexpectedEnd`]
/// - `SC0008`: [`SyntaxErrorType::UnexpectedToken`]
/// - `SC0009`: [`SyntaxErrorType::UnterminatedComment`]
/// - `SC0010`: [`SyntaxErrorType::UnterminatedTemplate`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  InvalidToken,
  JsxClosingTagMismatch,
  LineTerminatorInRegex,
  LineTerminatorInString,
  RequiredTokenNotFound(TokenType),
  UnexpectedEnd,
  UnexpectedToken,
  UnterminatedComment,
  UnterminatedTemplate,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Span,
  pub actual_token: Option<TokenType>,
}

impl SyntaxError {
  pub fn new(
    typ: SyntaxErrorType,
    loc: impl Into<Span>,
    actual_token: Option<TokenType>,
  ) -> SyntaxError {
    SyntaxError {
      typ,
      loc: loc.into(),
      actual_token,
    }
  }

  pub fn code(&self) -> &'static str {
    self.typ.code()
  }

  pub fn message(&self) -> String {
    self.typ.message(self.actual_token)
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} at bytes {}..{}",
      self.code(),
      self.message(),
      self.loc.0,
      self.loc.1
    )
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedSyntax(_) => "SC0001",
      SyntaxErrorType::InvalidToken => "SC0002",
      SyntaxErrorType::JsxClosingTagMismatch => "SC0003",
      SyntaxErrorType::LineTerminatorInRegex => "SC0004",
      SyntaxErrorType::LineTerminatorInString => "SC0005",
      SyntaxErrorType::RequiredTokenNotFound(_) => "SC0006",
      SyntaxErrorType::UnexpectedEnd => "SC0007",
      SyntaxErrorType::UnexpectedToken => "SC0008",
      SyntaxErrorType::UnterminatedComment => "SC0009",
      SyntaxErrorType::UnterminatedTemplate => "SC0010",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TokenType>) -> String {
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidToken => "invalid token".into(),
      SyntaxErrorType::JsxClosingTagMismatch => "JSX closing tag does not match opening tag".into(),
      SyntaxErrorType::LineTerminatorInRegex => {
        "line terminator not allowed in regular expression".into()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::UnexpectedEnd => actual_token
        .map(|tok| format!("unexpected end before {:?}", tok))
        .unwrap_or_else(|| "unexpected end of input".into()),
      SyntaxErrorType::UnexpectedToken => actual_token
        .map(|tok| format!("unexpected token {:?}", tok))
        .unwrap_or_else(|| "unexpected token".into()),
      SyntaxErrorType::UnterminatedComment => "unterminated block comment".into(),
      SyntaxErrorType::UnterminatedTemplate => "unterminated template literal".into(),
    }
  }
}
