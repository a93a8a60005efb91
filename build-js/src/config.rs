use clap::ValueEnum;
use rewrite_js::OutputExtension;
use rewrite_js::RewriteOptions;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::PathBuf;

/// Module format of the emitted code.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
  Cjs,
  Esm,
  Iife,
}

impl ModuleFormat {
  pub fn as_str(self) -> &'static str {
    match self {
      ModuleFormat::Cjs => "cjs",
      ModuleFormat::Esm => "esm",
      ModuleFormat::Iife => "iife",
    }
  }

  pub fn output_extension(self) -> OutputExtension {
    match self {
      ModuleFormat::Esm => OutputExtension::Mjs,
      ModuleFormat::Cjs | ModuleFormat::Iife => OutputExtension::Js,
    }
  }

  /// Whether relative specifiers must name files explicitly to load under this format.
  pub fn requires_explicit_extensions(self) -> bool {
    self == ModuleFormat::Esm
  }
}

impl Display for ModuleFormat {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
  pub source_dir: PathBuf,
  pub output_dir: PathBuf,
  pub format: ModuleFormat,
  pub minify: bool,
  /// Delete the output directory before building.
  pub clear_previous_build: bool,
  pub verbose: bool,
  /// Files with these extensions are compiled; everything else is copied.
  pub source_extensions: Vec<String>,
  /// Compiler executable.
  pub compiler: PathBuf,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      source_dir: PathBuf::from("src"),
      output_dir: PathBuf::from("build"),
      format: ModuleFormat::Cjs,
      minify: false,
      clear_previous_build: true,
      verbose: false,
      source_extensions: rewrite_js::options::DEFAULT_SOURCE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect(),
      compiler: PathBuf::from("esbuild"),
    }
  }
}

impl BuildConfig {
  pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
    Self {
      source_dir: source_dir.into(),
      output_dir: output_dir.into(),
      ..Self::default()
    }
  }

  pub fn with_format(mut self, format: ModuleFormat) -> Self {
    self.format = format;
    self
  }

  pub fn with_minify(mut self, minify: bool) -> Self {
    self.minify = minify;
    self
  }

  pub fn with_clear_previous_build(mut self, clear: bool) -> Self {
    self.clear_previous_build = clear;
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

  pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
    self.compiler = compiler.into();
    self
  }

  /// Options for the import rewrite phase of this build.
  pub fn rewrite_options(&self) -> RewriteOptions {
    RewriteOptions::new(self.format.output_extension())
      .with_minify(self.minify)
      .with_verbose(self.verbose)
      .with_source_extensions(self.source_extensions.iter().cloned())
  }
}
