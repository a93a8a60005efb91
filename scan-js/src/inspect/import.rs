use super::error;
use super::is_keyword;
use super::Inspector;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::span::Span;
use crate::statement::ImportForm;
use crate::statement::ImportStmt;
use crate::statement::Statement;
use crate::statement::StatementKind;
use parse_js::token::Token;
use parse_js::token::TokenType as TT;

type Scanned = (Statement, Option<Token>);

impl<'a> Inspector<'a> {
  /// `import` has been read and `next` is the unit after it.
  pub(crate) fn import_statement(&mut self, start: usize, next: Token) -> SyntaxResult<Scanned> {
    if next.typ == TT::LiteralString {
      return self.module_request(start, ImportForm::SideEffect, next);
    };
    let mut tok = next;
    let mut has_binding = false;
    loop {
      match tok.typ {
        TT::Identifier if has_binding && self.is_word(&tok, "from") => break,
        TT::Identifier | TT::Asterisk | TT::BraceOpen => has_binding = true,
        TT::Comma if has_binding => {}
        _ => return Err(error(&tok, SyntaxErrorType::ExpectedSyntax("import clause"))),
      };
      tok = self.unit()?;
    }
    let specifier = self.unit()?;
    self.module_request(start, ImportForm::Bindings, specifier)
  }

  /// `export` has been read at `start`.
  pub(crate) fn export_statement(&mut self, start: usize) -> SyntaxResult<Scanned> {
    let next = self.unit()?;
    match next.typ {
      TT::Asterisk => {
        let mut tok = self.unit()?;
        if self.is_word(&tok, "as") {
          let name = self.unit()?;
          if !matches!(name.typ, TT::Identifier | TT::LiteralString) && !is_keyword(name.typ) {
            return Err(error(&name, SyntaxErrorType::ExpectedSyntax("exported name")));
          };
          tok = self.unit()?;
        };
        if !self.is_word(&tok, "from") {
          return Err(error(&tok, SyntaxErrorType::ExpectedSyntax("`from` clause")));
        };
        let specifier = self.unit()?;
        self.module_request(start, ImportForm::ReExport, specifier)
      }
      TT::BraceOpen => {
        let tok = self.unit()?;
        if self.is_word(&tok, "from") {
          let specifier = self.unit()?;
          return self.module_request(start, ImportForm::ReExport, specifier);
        };
        // Local export list.
        let (end, pending) = self.terminator(next.loc.1, tok)?;
        Ok((Statement::other(Span(start, end)), pending))
      }
      TT::KeywordDefault => {
        let value = self.unit()?;
        let (end, pending) = match value.typ {
          TT::KeywordFunction | TT::KeywordClass => self.statement_body(value)?,
          TT::Identifier if self.is_word(&value, "async") => self.statement_body(value)?,
          TT::EOF => return Err(error(&value, SyntaxErrorType::UnexpectedEnd)),
          _ => self.finish_simple(value)?,
        };
        Ok((Statement::other(Span(start, end)), pending))
      }
      TT::EOF => Err(error(&next, SyntaxErrorType::UnexpectedEnd)),
      _ => {
        let (end, pending) = self.statement_body(next)?;
        Ok((Statement::other(Span(start, end)), pending))
      }
    }
  }

  // Reads the specifier string and whatever may follow it: import attributes and a `;`.
  fn module_request(&mut self, start: usize, form: ImportForm, specifier: Token) -> SyntaxResult<Scanned> {
    if specifier.typ != TT::LiteralString {
      return Err(error(
        &specifier,
        SyntaxErrorType::ExpectedSyntax("module specifier string"),
      ));
    };
    let mut end = specifier.loc.1;
    let mut next = self.unit()?;
    let is_attributes_keyword = next.typ == TT::KeywordWith
      || (self.is_word(&next, "assert") && !next.preceded_by_line_terminator);
    if is_attributes_keyword {
      let attributes = self.unit()?;
      self.expect(&attributes, TT::BraceOpen)?;
      end = attributes.loc.1;
      next = self.unit()?;
    };
    let (end, pending) = self.terminator(end, next)?;
    let stmt = Statement {
      kind: StatementKind::Import(ImportStmt {
        form,
        specifier: Span(specifier.loc.0 + 1, specifier.loc.1 - 1),
      }),
      loc: Span(start, end),
    };
    Ok((stmt, pending))
  }
}
