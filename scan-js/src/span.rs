use parse_js::loc::Loc;
use serde::Serialize;

/// A half-open range of UTF-8 byte offsets into a module: `Span(start, end)` covers
/// `source[start..end]`. Serialized as `[start, end]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct Span(pub usize, pub usize);

impl Span {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  /// Whether `other` lies entirely within this span.
  pub fn contains(&self, other: Span) -> bool {
    self.0 <= other.0 && other.1 <= self.1
  }
}

impl From<Loc> for Span {
  fn from(loc: Loc) -> Self {
    Span(loc.0, loc.1)
  }
}
