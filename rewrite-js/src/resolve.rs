//! Resolution of relative specifiers against the emitted output tree.
//!
//! Candidates are tried in a fixed order, relative to the directory of the importing module:
//!
//! 1. `<specifier>.<ext>` is a file: append `.<ext>`.
//! 2. `<specifier>/index.<ext>` is a file: append `/index.<ext>` (after dropping one trailing `/`).
//! 3. `<specifier>/index.<source-ext>` is a file: the index was never emitted, so keep the specifier.
//!
//! A specifier matching none of them is left alone.

use crate::fs::join_specifier;
use crate::fs::ModuleFs;
use crate::options::RewriteOptions;
use serde::Serialize;
use std::path::Path;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Candidate {
  File,
  DirectoryIndex,
  UntranspiledIndex,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Replacement {
  Specifier(String),
  Keep,
}

/// Result of probing one candidate.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Lookup {
  Matched(Replacement),
  NotApplicable,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
  Rewrite { specifier: String, candidate: Candidate },
  /// Already ends with the output extension.
  AlreadyResolved,
  KeptUntranspiledIndex,
  /// Package names, absolute paths and URLs.
  NonLocal,
  /// Local, but no candidate exists on disk.
  Unresolved,
}

impl Resolution {
  pub fn is_rewrite(&self) -> bool {
    matches!(self, Resolution::Rewrite { .. })
  }
}

/// Whether `specifier` is resolved against the importing module's directory.
pub fn is_local_specifier(specifier: &str) -> bool {
  specifier.starts_with("./")
    || specifier.starts_with("../")
    || specifier == "."
    || specifier == ".."
}

// Specifiers that can only name a directory.
fn names_directory(specifier: &str) -> bool {
  specifier.ends_with('/') || specifier == "." || specifier == ".."
}

fn directory_base(specifier: &str) -> &str {
  specifier.strip_suffix('/').unwrap_or(specifier)
}

impl Candidate {
  pub const ORDER: [Candidate; 3] = [
    Candidate::File,
    Candidate::DirectoryIndex,
    Candidate::UntranspiledIndex,
  ];

  pub fn check<F: ModuleFs>(
    self,
    fs: &F,
    options: &RewriteOptions,
    module_dir: &Path,
    specifier: &str,
  ) -> Lookup {
    let ext = options.extension.as_str();
    match self {
      Candidate::File => {
        if names_directory(specifier) {
          return Lookup::NotApplicable;
        };
        let target = format!("{specifier}.{ext}");
        if fs.is_file(&join_specifier(module_dir, &target)) {
          Lookup::Matched(Replacement::Specifier(target))
        } else {
          Lookup::NotApplicable
        }
      }
      Candidate::DirectoryIndex => {
        let target = format!("{}/index.{ext}", directory_base(specifier));
        if fs.is_file(&join_specifier(module_dir, &target)) {
          Lookup::Matched(Replacement::Specifier(target))
        } else {
          Lookup::NotApplicable
        }
      }
      Candidate::UntranspiledIndex => {
        let base = directory_base(specifier);
        let found = options.source_extensions.iter().any(|source_ext| {
          fs.is_file(&join_specifier(
            module_dir,
            &format!("{base}/index.{source_ext}"),
          ))
        });
        if found {
          Lookup::Matched(Replacement::Keep)
        } else {
          Lookup::NotApplicable
        }
      }
    }
  }
}

/// Decides how `specifier`, imported by a module in `module_dir`, must be written.
pub fn resolve<F: ModuleFs>(
  fs: &F,
  options: &RewriteOptions,
  module_dir: &Path,
  specifier: &str,
) -> Resolution {
  if !is_local_specifier(specifier) {
    return Resolution::NonLocal;
  };
  if specifier
    .strip_suffix(options.extension.as_str())
    .is_some_and(|rest| rest.ends_with('.'))
  {
    return Resolution::AlreadyResolved;
  };
  for candidate in Candidate::ORDER {
    match candidate.check(fs, options, module_dir, specifier) {
      Lookup::Matched(Replacement::Specifier(specifier)) => {
        return Resolution::Rewrite {
          specifier,
          candidate,
        };
      }
      Lookup::Matched(Replacement::Keep) => return Resolution::KeptUntranspiledIndex,
      Lookup::NotApplicable => {}
    };
  }
  Resolution::Unresolved
}
