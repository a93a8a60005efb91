use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::span::Span;
use crate::statement::Statement;
use parse_js::error::SyntaxError as LexError;
use parse_js::error::SyntaxErrorType as LexErrorType;
use parse_js::lex::Lexer;
use parse_js::loc::Loc;
use parse_js::token::Token;
use parse_js::token::TokenType as TT;
use std::borrow::Cow;

mod group;
mod import;

// Kinds of the units folded from several tokens. The lexer never hands these types to `unit`'s
// callers on its own: template parts and JSX text only appear inside the folded unit.
pub(crate) const TEMPLATE: TT = TT::LiteralTemplatePartStringEnd;
pub(crate) const JSX_ELEMENT: TT = TT::JsxTextContent;

/// Splits a module into its top-level statements.
///
/// The scanner only understands as much grammar as it needs to find statement boundaries: brackets,
/// template literals and JSX elements are skipped as balanced groups, and statements end at `;`, at
/// the body of a declaration or control statement, or where a semicolon would be inserted
/// automatically.
pub(crate) struct Inspector<'a> {
  source: &'a str,
  // `source` as the lexer sees it.
  code: &'a [u8],
  lexer: Lexer<'a>,
  // Whether the next `/` starts a regular expression and the next `<` starts a JSX element.
  expr_expected: bool,
  // Previous token at the current nesting level. A skipped group leaves its closing bracket here.
  prev: TT,
}

pub(crate) fn error(tok: &Token, typ: SyntaxErrorType) -> SyntaxError {
  SyntaxError::new(typ, tok.loc, Some(tok.typ))
}

pub(crate) fn is_keyword(typ: TT) -> bool {
  (TT::KeywordAs..=TT::KeywordYield).contains(&typ)
}

// Contextual keywords, which are plain identifiers everywhere the inspector looks at them.
fn is_contextual_keyword(typ: TT) -> bool {
  matches!(
    typ,
    TT::KeywordAs
      | TT::KeywordAsync
      | TT::KeywordConstructor
      | TT::KeywordFrom
      | TT::KeywordGet
      | TT::KeywordOf
      | TT::KeywordSet
      | TT::KeywordStatic
  )
}

/// The token that closes a group opened by `typ`, if `typ` opens one.
pub(crate) fn closing_bracket(typ: TT) -> Option<TT> {
  match typ {
    TT::BraceOpen => Some(TT::BraceClose),
    TT::BracketOpen | TT::QuestionDotBracketOpen => Some(TT::BracketClose),
    TT::ParenthesisOpen | TT::QuestionDotParenthesisOpen => Some(TT::ParenthesisClose),
    _ => None,
  }
}

pub(crate) fn is_closing_bracket(typ: TT) -> bool {
  matches!(typ, TT::BraceClose | TT::BracketClose | TT::ParenthesisClose)
}

// The lexer knows neither byte order marks nor hashbang lines. Both are masked with spaces, which
// keeps every offset aligned with `source`.
fn mask_preamble(source: &str) -> Cow<'_, [u8]> {
  let bom = if source.starts_with('\u{FEFF}') {
    '\u{FEFF}'.len_utf8()
  } else {
    0
  };
  let rest = &source[bom..];
  let hashbang = if rest.starts_with("#!") {
    rest.find('\n').unwrap_or(rest.len())
  } else {
    0
  };
  let masked = bom + hashbang;
  if masked == 0 {
    return Cow::Borrowed(source.as_bytes());
  };
  let mut code = source.as_bytes().to_vec();
  code[..masked].fill(b' ');
  Cow::Owned(code)
}

fn can_end_after(typ: TT) -> bool {
  matches!(
    typ,
    TT::Identifier
      | JSX_ELEMENT
      | TEMPLATE
      | TT::KeywordBreak
      | TT::KeywordContinue
      | TT::KeywordDebugger
      | TT::KeywordReturn
      | TT::KeywordSuper
      | TT::KeywordThis
      | TT::KeywordYield
      | TT::LiteralBigInt
      | TT::LiteralFalse
      | TT::LiteralNull
      | TT::LiteralNumber
      | TT::LiteralRegex
      | TT::LiteralString
      | TT::LiteralTrue
      | TT::PlusPlus
      | TT::HyphenHyphen
      | TT::PrivateMember
      // Groups.
      | TT::BraceOpen
      | TT::BracketOpen
      | TT::ParenthesisOpen
      | TT::QuestionDotBracketOpen
      | TT::QuestionDotParenthesisOpen
  )
}

// A token on a new line that can't continue the current expression starts a new statement.
fn continues_expression(typ: TT) -> bool {
  matches!(
    typ,
    TT::Ampersand
      | TT::AmpersandAmpersand
      | TT::AmpersandAmpersandEquals
      | TT::AmpersandEquals
      | TT::Asterisk
      | TT::AsteriskAsterisk
      | TT::AsteriskAsteriskEquals
      | TT::AsteriskEquals
      | TT::Bar
      | TT::BarBar
      | TT::BarBarEquals
      | TT::BarEquals
      | TT::BracketOpen
      | TT::Caret
      | TT::CaretEquals
      | TT::ChevronLeft
      | TT::ChevronLeftChevronLeft
      | TT::ChevronLeftChevronLeftEquals
      | TT::ChevronLeftEquals
      | TT::ChevronRight
      | TT::ChevronRightChevronRight
      | TT::ChevronRightChevronRightChevronRight
      | TT::ChevronRightChevronRightChevronRightEquals
      | TT::ChevronRightChevronRightEquals
      | TT::ChevronRightEquals
      | TT::Colon
      | TT::Comma
      | TT::Dot
      | TT::Equals
      | TT::EqualsChevronRight
      | TT::EqualsEquals
      | TT::EqualsEqualsEquals
      | TT::ExclamationEquals
      | TT::ExclamationEqualsEquals
      | TT::Hyphen
      | TT::HyphenEquals
      | TT::KeywordIn
      | TT::KeywordInstanceof
      | TEMPLATE
      | TT::ParenthesisOpen
      | TT::Percent
      | TT::PercentEquals
      | TT::Plus
      | TT::PlusEquals
      | TT::Question
      | TT::QuestionDot
      | TT::QuestionDotBracketOpen
      | TT::QuestionDotParenthesisOpen
      | TT::QuestionQuestion
      | TT::QuestionQuestionEquals
      | TT::Slash
      | TT::SlashEquals
  )
}

// No line break is allowed between these keywords and their operand.
fn is_restricted(typ: TT) -> bool {
  matches!(
    typ,
    TT::KeywordBreak | TT::KeywordContinue | TT::KeywordReturn | TT::KeywordYield
  )
}

// Whether a `{` read after `before` opens an object literal, so that `/` after the group divides.
// Blocks and bodies are followed by statements, where `/` starts a regular expression.
fn opens_operand(before: TT) -> bool {
  matches!(
    before,
    TT::Ampersand
      | TT::AmpersandAmpersand
      | TT::AmpersandAmpersandEquals
      | TT::AmpersandEquals
      | TT::Asterisk
      | TT::AsteriskAsterisk
      | TT::AsteriskAsteriskEquals
      | TT::AsteriskEquals
      | TT::Bar
      | TT::BarBar
      | TT::BarBarEquals
      | TT::BarEquals
      | TT::BracketOpen
      | TT::Caret
      | TT::CaretEquals
      | TT::ChevronLeft
      | TT::ChevronLeftChevronLeft
      | TT::ChevronLeftChevronLeftEquals
      | TT::ChevronLeftEquals
      | TT::ChevronRight
      | TT::ChevronRightChevronRight
      | TT::ChevronRightChevronRightChevronRight
      | TT::ChevronRightChevronRightChevronRightEquals
      | TT::ChevronRightChevronRightEquals
      | TT::ChevronRightEquals
      | TT::Colon
      | TT::Comma
      | TT::DotDotDot
      | TT::Equals
      | TT::EqualsEquals
      | TT::EqualsEqualsEquals
      | TT::Exclamation
      | TT::ExclamationEquals
      | TT::ExclamationEqualsEquals
      | TT::Hyphen
      | TT::HyphenEquals
      | TT::KeywordAwait
      | TT::KeywordCase
      | TT::KeywordDelete
      | TT::KeywordIn
      | TT::KeywordInstanceof
      | TT::KeywordNew
      | TT::KeywordReturn
      | TT::KeywordThrow
      | TT::KeywordTypeof
      | TT::KeywordVoid
      | TT::KeywordYield
      | TT::ParenthesisOpen
      | TT::Percent
      | TT::PercentEquals
      | TT::Plus
      | TT::PlusEquals
      | TT::Question
      | TT::QuestionDotBracketOpen
      | TT::QuestionDotParenthesisOpen
      | TT::QuestionQuestion
      | TT::QuestionQuestionEquals
      | TT::Slash
      | TT::SlashEquals
      | TT::Tilde
  )
}

impl<'a> Inspector<'a> {
  /// `code` is `source` as the lexer should see it, byte for byte the same length.
  pub(crate) fn new(source: &'a str, code: &'a [u8]) -> Inspector<'a> {
    Inspector {
      source,
      code,
      lexer: Lexer::new(code),
      expr_expected: true,
      prev: TT::Semicolon,
    }
  }

  fn text(&self, loc: Loc) -> &'a str {
    self.source.get(loc.0..loc.1).unwrap_or_default()
  }

  // Offset of the next byte the lexer will read.
  fn position(&self) -> usize {
    self.lexer.since_checkpoint(self.lexer.checkpoint()).0
  }

  // Skips whitespace and complete comments from `pos`.
  fn trivia_end(&self, mut pos: usize) -> usize {
    loop {
      let rest = self.code.get(pos..).unwrap_or_default();
      let skipped = if rest.first().is_some_and(|c| c.is_ascii_whitespace()) {
        1
      } else if rest.starts_with(b"//") {
        rest.iter().position(|&c| c == b'\n').unwrap_or(rest.len())
      } else if rest.starts_with(b"/*") {
        match rest[2..].windows(2).position(|w| w == b"*/") {
          Some(i) => i + 4,
          None => return pos,
        }
      } else {
        return pos;
      };
      pos += skipped;
    }
  }

  /// Converts an error of the lexer, which started reading at `from`.
  fn lex_error(&self, from: usize, err: LexError) -> SyntaxError {
    let start = self.trivia_end(from);
    let rest = self.code.get(start..).unwrap_or_default();
    let typ = match err.typ {
      LexErrorType::ExpectedNotFound if rest.starts_with(b"/*") => {
        SyntaxErrorType::UnterminatedComment
      }
      LexErrorType::UnexpectedEnd if rest.starts_with(b"`") => SyntaxErrorType::UnterminatedTemplate,
      LexErrorType::UnexpectedEnd => SyntaxErrorType::UnexpectedEnd,
      LexErrorType::LineTerminatorInRegex => SyntaxErrorType::LineTerminatorInRegex,
      LexErrorType::LineTerminatorInString => SyntaxErrorType::LineTerminatorInString,
      LexErrorType::ExpectedSyntax(expected) => SyntaxErrorType::ExpectedSyntax(expected),
      _ => SyntaxErrorType::InvalidToken,
    };
    SyntaxError::new(typ, Span(start, err.loc.1.max(start)), err.actual_token)
  }

  fn is_word(&self, tok: &Token, word: &str) -> bool {
    tok.typ == TT::Identifier && self.text(tok.loc) == word
  }

  fn expect(&self, tok: &Token, typ: TT) -> SyntaxResult<()> {
    if tok.typ == typ {
      Ok(())
    } else if tok.typ == TT::EOF {
      Err(error(tok, SyntaxErrorType::UnexpectedEnd))
    } else {
      Err(error(tok, SyntaxErrorType::RequiredTokenNotFound(typ)))
    }
  }

  fn unexpected(&self, tok: &Token) -> SyntaxError {
    if tok.typ == TT::EOF {
      error(tok, SyntaxErrorType::UnexpectedEnd)
    } else {
      error(tok, SyntaxErrorType::UnexpectedToken)
    }
  }

  fn take_or_next(&mut self, pending: Option<Token>) -> SyntaxResult<Token> {
    match pending {
      Some(tok) => Ok(tok),
      None => self.unit(),
    }
  }

  pub fn statements(&mut self) -> SyntaxResult<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut pending = None;
    loop {
      let first = self.take_or_next(pending.take())?;
      if first.typ == TT::EOF {
        break;
      };
      let (stmt, next) = self.statement(first)?;
      statements.push(stmt);
      pending = next;
    }
    Ok(statements)
  }

  /// Scans one statement starting with `first`. Returns the statement and the unit that was read
  /// past its end, if any.
  pub(crate) fn statement(&mut self, first: Token) -> SyntaxResult<(Statement, Option<Token>)> {
    let start = first.loc.0;
    match first.typ {
      TT::KeywordImport => {
        let next = self.unit()?;
        if matches!(next.typ, TT::ParenthesisOpen | TT::Dot) {
          // `import(...)` and `import.meta` are expressions.
          let (end, pending) = self.finish_simple(next)?;
          return Ok((Statement::other(Span(start, end)), pending));
        };
        self.import_statement(start, next)
      }
      TT::KeywordExport => self.export_statement(start),
      _ => {
        let (end, pending) = self.statement_body(first)?;
        Ok((Statement::other(Span(start, end)), pending))
      }
    }
  }

  /// Scans a statement that can't be an import, returning where it ends.
  fn statement_body(&mut self, first: Token) -> SyntaxResult<(usize, Option<Token>)> {
    match first.typ {
      TT::Semicolon => Ok((first.loc.1, None)),
      // Blocks are skipped whole by `unit`.
      TT::BraceOpen => {
        self.expr_expected = true;
        Ok((first.loc.1, None))
      }
      TT::KeywordFunction | TT::KeywordClass => self.declaration(),
      TT::KeywordIf => {
        self.header()?;
        let (end, pending) = self.nested_statement()?;
        let next = self.take_or_next(pending)?;
        if next.typ == TT::KeywordElse {
          self.nested_statement()
        } else {
          Ok((end, Some(next)))
        }
      }
      TT::KeywordFor => {
        let mut next = self.unit()?;
        if next.typ == TT::KeywordAwait {
          next = self.unit()?;
          self.expr_expected = true;
        };
        self.expect(&next, TT::ParenthesisOpen)?;
        self.nested_statement()
      }
      TT::KeywordWhile | TT::KeywordWith => {
        self.header()?;
        self.nested_statement()
      }
      TT::KeywordSwitch => {
        self.header()?;
        let body = self.unit()?;
        self.expect(&body, TT::BraceOpen)?;
        Ok((body.loc.1, None))
      }
      TT::KeywordDo => {
        let (_, pending) = self.nested_statement()?;
        let keyword = self.take_or_next(pending)?;
        self.expect(&keyword, TT::KeywordWhile)?;
        let header = self.header()?;
        // The `;` after `do ... while (...)` is always optional.
        let next = self.unit()?;
        if next.typ == TT::Semicolon {
          Ok((next.loc.1, None))
        } else {
          Ok((header.1, Some(next)))
        }
      }
      TT::KeywordTry => {
        let block = self.unit()?;
        self.expect(&block, TT::BraceOpen)?;
        let mut end = block.loc.1;
        let mut next = self.unit()?;
        if next.typ == TT::KeywordCatch {
          let mut body = self.unit()?;
          if body.typ == TT::ParenthesisOpen {
            body = self.unit()?;
          };
          self.expect(&body, TT::BraceOpen)?;
          end = body.loc.1;
          next = self.unit()?;
        };
        if next.typ == TT::KeywordFinally {
          let body = self.unit()?;
          self.expect(&body, TT::BraceOpen)?;
          return Ok((body.loc.1, None));
        };
        if end == block.loc.1 {
          return Err(error(&next, SyntaxErrorType::ExpectedSyntax("catch or finally")));
        };
        Ok((end, Some(next)))
      }
      TT::Identifier if self.is_word(&first, "async") => {
        let next = self.unit()?;
        if next.typ == TT::KeywordFunction && !next.preceded_by_line_terminator {
          self.declaration()
        } else {
          self.continue_simple(first.loc.1, first.typ, Some(next))
        }
      }
      TT::Identifier => {
        let next = self.unit()?;
        if next.typ == TT::Colon {
          // Labelled statement.
          self.nested_statement()
        } else {
          self.continue_simple(first.loc.1, first.typ, Some(next))
        }
      }
      TT::BraceClose | TT::BracketClose | TT::ParenthesisClose => Err(self.unexpected(&first)),
      _ => self.finish_simple(first),
    }
  }

  // Parenthesised header of a control statement.
  fn header(&mut self) -> SyntaxResult<Loc> {
    let header = self.unit()?;
    self.expect(&header, TT::ParenthesisOpen)?;
    Ok(header.loc)
  }

  // Body of a control statement or label.
  fn nested_statement(&mut self) -> SyntaxResult<(usize, Option<Token>)> {
    let first = self.unit()?;
    if first.typ == TT::EOF {
      return Err(error(&first, SyntaxErrorType::UnexpectedEnd));
    };
    let (stmt, pending) = self.statement(first)?;
    Ok((stmt.loc.1, pending))
  }

  // Function and class declarations end with their body, which is the first top-level brace group.
  fn declaration(&mut self) -> SyntaxResult<(usize, Option<Token>)> {
    loop {
      let tok = self.unit()?;
      match tok.typ {
        TT::BraceOpen => {
          self.expr_expected = true;
          return Ok((tok.loc.1, None));
        }
        TT::EOF | TT::BraceClose | TT::BracketClose | TT::ParenthesisClose | TT::Semicolon => {
          return Err(self.unexpected(&tok));
        }
        _ => {}
      };
    }
  }

  /// Continues an expression or simple statement whose last unit so far is `last`.
  pub(crate) fn finish_simple(&mut self, last: Token) -> SyntaxResult<(usize, Option<Token>)> {
    self.continue_simple(last.loc.1, last.typ, None)
  }

  fn continue_simple(
    &mut self,
    mut end: usize,
    mut last: TT,
    mut pending: Option<Token>,
  ) -> SyntaxResult<(usize, Option<Token>)> {
    loop {
      let tok = self.take_or_next(pending.take())?;
      match tok.typ {
        TT::Semicolon => return Ok((tok.loc.1, None)),
        TT::EOF => return Ok((end, Some(tok))),
        TT::BraceClose | TT::BracketClose | TT::ParenthesisClose => {
          return Err(self.unexpected(&tok));
        }
        // Object literals and function or class expressions. Only an arrow function's body can't
        // be an operand.
        TT::BraceOpen => self.expr_expected = last == TT::EqualsChevronRight,
        _ => {}
      };
      if tok.preceded_by_line_terminator
        && can_end_after(last)
        && (is_restricted(last) || !continues_expression(tok.typ))
      {
        return Ok((end, Some(tok)));
      };
      end = tok.loc.1;
      last = tok.typ;
    }
  }

  /// Accepts `next` as the optional `;` of a statement that is already complete at `end`. Anything
  /// else must start on a new line (or be the end of the module).
  fn terminator(&self, end: usize, next: Token) -> SyntaxResult<(usize, Option<Token>)> {
    match next.typ {
      TT::Semicolon => Ok((next.loc.1, None)),
      TT::EOF => Ok((end, Some(next))),
      _ if next.preceded_by_line_terminator => Ok((end, Some(next))),
      _ => Err(error(
        &next,
        SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon),
      )),
    }
  }
}

/// Returns the top-level statements of `source` in order.
pub fn inspect(source: &str) -> SyntaxResult<Vec<Statement>> {
  let code = mask_preamble(source);
  Inspector::new(source, &code).statements()
}
