use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

/// Untranspiled extensions tried when looking for a directory index that was left out of the build.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// File extension given to emitted modules, and appended to the specifiers that refer to them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputExtension {
  Js,
  Mjs,
  Cjs,
}

impl OutputExtension {
  pub fn as_str(self) -> &'static str {
    match self {
      OutputExtension::Js => "js",
      OutputExtension::Mjs => "mjs",
      OutputExtension::Cjs => "cjs",
    }
  }
}

impl Display for OutputExtension {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OutputExtension {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim_start_matches('.') {
      "js" => Ok(OutputExtension::Js),
      "mjs" => Ok(OutputExtension::Mjs),
      "cjs" => Ok(OutputExtension::Cjs),
      other => Err(format!("unsupported output extension '{other}'")),
    }
  }
}

/// Immutable configuration for [`crate::ImportRewriter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteOptions {
  pub extension: OutputExtension,
  /// Tried in order by the untranspiled-index candidate.
  pub source_extensions: Vec<String>,
  /// Don't insert a line break between statements that were directly adjacent.
  pub minify: bool,
  /// Log every skipped statement and every anomaly.
  pub verbose: bool,
}

impl RewriteOptions {
  pub fn new(extension: OutputExtension) -> Self {
    Self {
      extension,
      source_extensions: DEFAULT_SOURCE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect(),
      minify: false,
      verbose: false,
    }
  }

  pub fn with_minify(mut self, minify: bool) -> Self {
    self.minify = minify;
    self
  }

  pub fn with_verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.source_extensions = extensions
      .into_iter()
      .map(|ext| ext.into().trim_start_matches('.').to_string())
      .collect();
    self
  }
}
