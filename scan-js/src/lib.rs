use error::SyntaxResult;
use statement::Statement;

pub mod error;
pub mod inspect;
pub mod span;
pub mod statement;

/// Splits an emitted module into its top-level statements, reporting the specifier span of every
/// static import and re-export.
pub fn inspect(source: &str) -> SyntaxResult<Vec<Statement>> {
  inspect::inspect(source)
}
