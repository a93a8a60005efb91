use super::closing_bracket;
use super::error;
use super::is_closing_bracket;
use super::is_contextual_keyword;
use super::is_keyword;
use super::opens_operand;
use super::Inspector;
use super::JSX_ELEMENT;
use super::TEMPLATE;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::span::Span;
use parse_js::lex::lex_next;
use parse_js::lex::lex_template_string_continue;
use parse_js::lex::LexMode;
use parse_js::loc::Loc;
use parse_js::token::Token;
use parse_js::token::TokenType as TT;

impl<'a> Inspector<'a> {
  /// Reads the next unit: a token, or a whole bracketed group, template literal or JSX element
  /// folded into one token. Groups keep the type of their opening bracket.
  pub(crate) fn unit(&mut self) -> SyntaxResult<Token> {
    let before = self.prev;
    let mut tok = self.raw_token()?;
    // Keywords are ordinary property names after a member access.
    if is_contextual_keyword(tok.typ)
      || (is_keyword(tok.typ) && matches!(before, TT::Dot | TT::QuestionDot))
    {
      tok.typ = TT::Identifier;
    };
    let close = closing_bracket(tok.typ);
    if let Some(close) = close {
      self.expr_expected = true;
      self.prev = tok.typ;
      let end = self.skip_group(close)?;
      tok.loc.extend(end);
    };
    self.expr_expected = match tok.typ {
      TT::ParenthesisOpen => matches!(
        before,
        TT::KeywordIf | TT::KeywordWhile | TT::KeywordFor | TT::KeywordWith
      ),
      TT::BraceOpen => !opens_operand(before),
      TT::BracketOpen
      | TT::QuestionDotBracketOpen
      | TT::QuestionDotParenthesisOpen
      | TT::HyphenHyphen
      | TT::PlusPlus
      | TT::Identifier
      | JSX_ELEMENT
      | TT::KeywordSuper
      | TT::KeywordThis
      | TT::PrivateMember => false,
      t if is_keyword(t) => true,
      t if (TT::LiteralBigInt..=TT::LiteralTrue).contains(&t) => false,
      _ => true,
    };
    self.prev = close.unwrap_or(tok.typ);
    Ok(tok)
  }

  /// Skips units until the matching `close`, which must be the next unmatched closing bracket.
  /// Returns the location of the closing bracket.
  pub(crate) fn skip_group(&mut self, close: TT) -> SyntaxResult<Loc> {
    loop {
      let tok = self.unit()?;
      match tok.typ {
        t if t == close => return Ok(tok.loc),
        TT::EOF => {
          return Err(SyntaxError::new(
            SyntaxErrorType::UnexpectedEnd,
            tok.loc,
            Some(close),
          ))
        }
        t if is_closing_bracket(t) => {
          return Err(error(&tok, SyntaxErrorType::RequiredTokenNotFound(close)));
        }
        _ => {}
      };
    }
  }

  fn raw_token(&mut self) -> SyntaxResult<Token> {
    let mode = if self.expr_expected {
      LexMode::SlashIsRegex
    } else {
      LexMode::Standard
    };
    let from = self.position();
    let tok = lex_next(&mut self.lexer, mode).map_err(|err| self.lex_error(from, err))?;
    match tok.typ {
      TT::LiteralTemplatePartString | TT::LiteralTemplatePartStringEnd => self.template(tok),
      // No operand starts with `<` other than a JSX element.
      TT::ChevronLeft if self.expr_expected => self.jsx_element(tok),
      _ => Ok(tok),
    }
  }

  // Substitutions in templates and JSX are expressions, read like the contents of `(...)`.
  fn skip_substitution(&mut self) -> SyntaxResult<()> {
    self.expr_expected = true;
    self.prev = TT::ParenthesisOpen;
    self.skip_group(TT::BraceClose)?;
    Ok(())
  }

  // Folds a template literal and all of its substitutions into one token. The lexer's part
  // locations exclude the delimiters.
  fn template(&mut self, first: Token) -> SyntaxResult<Token> {
    let start = first.loc.0.saturating_sub(1);
    let mut part = first.typ;
    while part == TT::LiteralTemplatePartString {
      self.skip_substitution()?;
      part = lex_template_string_continue(&mut self.lexer, false)
        .map_err(|_| {
          SyntaxError::new(
            SyntaxErrorType::UnterminatedTemplate,
            Span(start, self.code.len()),
            None,
          )
        })?
        .typ;
    }
    Ok(Token::new(
      Loc(start, self.position()),
      TEMPLATE,
      first.preceded_by_line_terminator,
    ))
  }

  fn jsx_tag_token(&mut self) -> SyntaxResult<Token> {
    let from = self.position();
    let tok =
      lex_next(&mut self.lexer, LexMode::JsxTag).map_err(|err| self.lex_error(from, err))?;
    match tok.typ {
      TT::EOF => Err(error(&tok, SyntaxErrorType::UnexpectedEnd)),
      _ => Ok(tok),
    }
  }

  // Reads a tag name (`div`, `Foo.Bar`, `svg:rect`) starting at `tok`, and returns it with the
  // first token after it.
  fn jsx_name(&mut self, mut tok: Token) -> SyntaxResult<(String, Token)> {
    let mut name = String::new();
    loop {
      if tok.typ != TT::Identifier && !is_keyword(tok.typ) {
        return Err(error(&tok, SyntaxErrorType::ExpectedSyntax("JSX element name")));
      };
      name.push_str(self.text(tok.loc));
      tok = self.jsx_tag_token()?;
      if !matches!(tok.typ, TT::Dot | TT::Colon) {
        return Ok((name, tok));
      };
      name.push_str(self.text(tok.loc));
      tok = self.jsx_tag_token()?;
    }
  }

  /// Folds a whole JSX element or fragment, whose `<` is `open`, into one token.
  fn jsx_element(&mut self, open: Token) -> SyntaxResult<Token> {
    let mut tok = self.jsx_tag_token()?;
    let name = if tok.typ == TT::ChevronRight {
      String::new()
    } else {
      let (name, next) = self.jsx_name(tok)?;
      tok = next;
      // Attributes.
      loop {
        match tok.typ {
          TT::ChevronRight => break,
          TT::Slash => {
            let close = self.jsx_tag_token()?;
            self.expect(&close, TT::ChevronRight)?;
            return Ok(self.jsx_token(&open, close.loc));
          }
          TT::BraceOpen => self.skip_substitution()?,
          TT::ChevronLeft => {
            self.jsx_element(tok)?;
          }
          TT::Identifier | TT::Colon | TT::Equals | TT::LiteralString => {}
          t if is_keyword(t) => {}
          _ => return Err(error(&tok, SyntaxErrorType::UnexpectedToken)),
        };
        tok = self.jsx_tag_token()?;
      }
      name
    };

    // Children. Text runs up to the next `{` or `<`.
    loop {
      lex_next(&mut self.lexer, LexMode::JsxTextContent)
        .map_err(|err| self.lex_error(open.loc.0, err))?;
      if self.position() >= self.code.len() {
        return Err(SyntaxError::new(
          SyntaxErrorType::UnexpectedEnd,
          Span(open.loc.0, self.code.len()),
          None,
        ));
      };
      let child = self.jsx_tag_token()?;
      match child.typ {
        TT::BraceOpen => self.skip_substitution()?,
        TT::ChevronLeftSlash => {
          let mut close = self.jsx_tag_token()?;
          let closing_name = if close.typ == TT::ChevronRight {
            String::new()
          } else {
            let (closing_name, next) = self.jsx_name(close)?;
            close = next;
            closing_name
          };
          self.expect(&close, TT::ChevronRight)?;
          if closing_name != name {
            return Err(SyntaxError::new(
              SyntaxErrorType::JsxClosingTagMismatch,
              Loc(child.loc.0, close.loc.1),
              None,
            ));
          };
          return Ok(self.jsx_token(&open, close.loc));
        }
        TT::ChevronLeft => {
          self.jsx_element(child)?;
        }
        _ => return Err(error(&child, SyntaxErrorType::UnexpectedToken)),
      };
    }
  }

  fn jsx_token(&self, open: &Token, end: Loc) -> Token {
    Token::new(open.loc + end, JSX_ELEMENT, open.preceded_by_line_terminator)
  }
}
