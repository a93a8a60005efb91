use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Filesystem access needed by the rewriter, so that hosts and tests can supply their own.
pub trait ModuleFs {
  /// Return true if the path points to a file.
  fn is_file(&self, path: &Path) -> bool;
  fn read_to_string(&self, path: &Path) -> io::Result<String>;
  /// Replace the file's contents.
  fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RealFs;

impl ModuleFs for RealFs {
  fn is_file(&self, path: &Path) -> bool {
    std::fs::metadata(path)
      .map(|m| m.is_file())
      .unwrap_or(false)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    std::fs::write(path, contents)
  }
}

/// Joins a `/`-separated relative specifier onto `dir`, folding `.` and `..` segments lexically.
/// Symlinks are not followed; `..` above the start of `dir` is kept.
pub fn join_specifier(dir: &Path, specifier: &str) -> PathBuf {
  let mut joined = dir.to_path_buf();
  for segment in specifier.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        if matches!(joined.components().next_back(), Some(Component::Normal(_))) {
          joined.pop();
        } else {
          joined.push("..");
        }
      }
      segment => joined.push(segment),
    }
  }
  joined
}

#[cfg(test)]
mod tests {
  use super::join_specifier;
  use std::path::Path;
  use std::path::PathBuf;

  #[test]
  fn joins_relative_segments() {
    let dir = Path::new("build/pages");
    assert_eq!(join_specifier(dir, "./util.mjs"), PathBuf::from("build/pages/util.mjs"));
    assert_eq!(join_specifier(dir, "../lib/index.mjs"), PathBuf::from("build/lib/index.mjs"));
    assert_eq!(join_specifier(dir, "./a/./b//c.mjs"), PathBuf::from("build/pages/a/b/c.mjs"));
  }

  #[test]
  fn keeps_parent_segments_above_the_start() {
    assert_eq!(join_specifier(Path::new(""), "../x.mjs"), PathBuf::from("../x.mjs"));
    assert_eq!(join_specifier(Path::new("a"), "../../x.mjs"), PathBuf::from("../x.mjs"));
  }
}
