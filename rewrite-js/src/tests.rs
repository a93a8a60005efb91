use crate::error::RewriteError;
use crate::error::StatementRewriteAnomaly;
use crate::fs::ModuleFs;
use crate::options::OutputExtension;
use crate::options::RewriteOptions;
use crate::resolve::resolve;
use crate::resolve::Candidate;
use crate::resolve::Resolution;
use crate::rewrite::ImportRewriter;
use scan_js::inspect;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

#[derive(Default)]
struct FakeFs {
  files: RefCell<BTreeMap<PathBuf, String>>,
  writes: Cell<usize>,
}

impl FakeFs {
  fn new(files: &[(&str, &str)]) -> Self {
    let fs = FakeFs::default();
    for (path, text) in files {
      fs.files
        .borrow_mut()
        .insert(PathBuf::from(path), text.to_string());
    }
    fs
  }

  fn text(&self, path: &str) -> String {
    self.files.borrow()[Path::new(path)].clone()
  }
}

impl ModuleFs for FakeFs {
  fn is_file(&self, path: &Path) -> bool {
    self.files.borrow().contains_key(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    self
      .files
      .borrow()
      .get(path)
      .cloned()
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    self.writes.set(self.writes.get() + 1);
    self
      .files
      .borrow_mut()
      .insert(path.to_path_buf(), contents.to_string());
    Ok(())
  }
}

fn esm() -> RewriteOptions {
  RewriteOptions::new(OutputExtension::Mjs)
}

fn rewriter(files: &[(&str, &str)]) -> ImportRewriter<FakeFs> {
  ImportRewriter::with_fs(FakeFs::new(files), esm())
}

// Rewrites `out/main.mjs` and returns its resulting text.
fn rewrite_main(source: &str, others: &[&str]) -> String {
  let mut files = vec![("out/main.mjs", source)];
  files.extend(others.iter().map(|p| (*p, "")));
  let rewriter = rewriter(&files);
  rewriter.rewrite(Path::new("out/main.mjs")).unwrap();
  rewriter.fs().text("out/main.mjs")
}

#[test]
fn appends_extension_when_sibling_file_exists() {
  assert_eq!(
    rewrite_main("import { f } from \"./util\";", &["out/util.mjs"]),
    "import { f } from \"./util.mjs\";"
  );
}

#[test]
fn falls_back_to_directory_index() {
  assert_eq!(
    rewrite_main("import { f } from \"./util\";", &["out/util/index.mjs"]),
    "import { f } from \"./util/index.mjs\";"
  );
}

#[test]
fn package_imports_are_untouched_and_not_written() {
  let rewriter = rewriter(&[
    ("out/main.mjs", "import { g } from \"pkg\";"),
    ("out/pkg.mjs", ""),
    ("out/pkg/index.mjs", ""),
  ]);
  let outcome = rewriter.rewrite(Path::new("out/main.mjs")).unwrap();
  assert!(!outcome.is_rewritten());
  assert_eq!(outcome.imports[0].resolution, Resolution::NonLocal);
  assert_eq!(rewriter.fs().writes.get(), 0);
  assert_eq!(rewriter.fs().text("out/main.mjs"), "import { g } from \"pkg\";");
}

#[test]
fn file_candidate_wins_over_directory_index() {
  assert_eq!(
    rewrite_main("import x from './x';", &["out/x.mjs", "out/x/index.mjs"]),
    "import x from './x.mjs';"
  );
}

#[test]
fn trailing_slash_is_not_doubled() {
  assert_eq!(
    rewrite_main("import d from './dir/';", &["out/dir/index.mjs", "out/dir/.mjs"]),
    "import d from './dir/index.mjs';"
  );
  assert_eq!(
    rewrite_main("import root from '.';", &["out/index.mjs"]),
    "import root from './index.mjs';"
  );
}

#[test]
fn resolves_relative_to_the_importing_module() {
  let rewriter = rewriter(&[
    ("out/pages/home.mjs", "import s from \"../shared\";\nimport l from \"./local\";"),
    ("out/shared.mjs", ""),
    ("out/pages/local.mjs", ""),
    ("local.mjs", ""),
  ]);
  rewriter.rewrite(Path::new("out/pages/home.mjs")).unwrap();
  assert_eq!(
    rewriter.fs().text("out/pages/home.mjs"),
    "import s from \"../shared.mjs\";\nimport l from \"./local.mjs\";"
  );
}

#[test]
fn untranspiled_directory_index_is_kept() {
  let rewriter = rewriter(&[
    ("out/main.mjs", "import lib from \"./lib\";"),
    ("out/lib/index.tsx", ""),
  ]);
  let outcome = rewriter.rewrite(Path::new("out/main.mjs")).unwrap();
  assert!(!outcome.is_rewritten());
  assert_eq!(outcome.imports[0].resolution, Resolution::KeptUntranspiledIndex);
}

#[test]
fn rewriting_twice_is_a_no_op() {
  let rewriter = rewriter(&[
    (
      "out/main.mjs",
      "import a from \"./a\";import b from \"./b/\";\nexport * from \"./a\";",
    ),
    ("out/a.mjs", ""),
    ("out/a.mjs.mjs", ""),
    ("out/b/index.mjs", ""),
  ]);
  let main = Path::new("out/main.mjs");
  let first = rewriter.rewrite(main).unwrap();
  assert_eq!(first.rewritten_imports(), 3);
  let once = rewriter.fs().text("out/main.mjs");
  assert_eq!(
    once,
    "import a from \"./a.mjs\";\nimport b from \"./b/index.mjs\";\nexport * from \"./a.mjs\";"
  );

  let second = rewriter.rewrite(main).unwrap();
  assert!(!second.is_rewritten());
  assert!(second
    .imports
    .iter()
    .all(|i| i.resolution == Resolution::AlreadyResolved));
  assert_eq!(rewriter.fs().text("out/main.mjs"), once);
  assert_eq!(rewriter.fs().writes.get(), 1);
}

#[test]
fn non_import_statements_are_preserved() {
  let source = "#!/usr/bin/env node\n// header\nimport { a } from \"./a\"\nconst  x = `t ${ a }`; /* keep */\nfunction f() { return import(\"./a\") }\nexport { x };\n";
  let rewriter = rewriter(&[("out/a.mjs", "")]);
  let outcome = rewriter.rewrite_text(Path::new("out/main.mjs"), source).unwrap();
  let output = outcome.text.unwrap();
  assert_eq!(output, source.replacen("\"./a\"\n", "\"./a.mjs\"\n", 1));

  let others = |text: &str| -> Vec<String> {
    inspect(text)
      .unwrap()
      .iter()
      .filter(|s| !s.is_import())
      .map(|s| text[s.loc.0..s.loc.1].to_string())
      .collect()
  };
  assert_eq!(others(output.as_str()), others(source));
}

#[test]
fn minify_controls_separator_between_adjacent_statements() {
  let source = "import a from \"./a\";import b from \"./b\";f();";
  let files = [("out/a.mjs", ""), ("out/b.mjs", "")];

  let pretty = rewriter(&files)
    .rewrite_text(Path::new("out/main.mjs"), source)
    .unwrap();
  assert_eq!(
    pretty.text.unwrap(),
    "import a from \"./a.mjs\";\nimport b from \"./b.mjs\";\nf();"
  );

  let minified = ImportRewriter::with_fs(FakeFs::new(&files), esm().with_minify(true))
    .rewrite_text(Path::new("out/main.mjs"), source)
    .unwrap();
  assert_eq!(
    minified.text.unwrap(),
    "import a from \"./a.mjs\";import b from \"./b.mjs\";f();"
  );
}

#[test]
fn unusual_statements_are_copied_verbatim() {
  let source = "import a from \"./\\u0061\";\nimport \"\";\nimport b from ' ./b ';\n";
  let rewriter = rewriter(&[("out/a.mjs", ""), ("out/b.mjs", "")]);
  let outcome = rewriter.rewrite_text(Path::new("out/main.mjs"), source).unwrap();
  assert_eq!(
    outcome.text.as_deref(),
    Some("import a from \"./\\u0061\";\nimport \"\";\nimport b from ' ./b.mjs ';\n")
  );
  assert_eq!(outcome.anomalies, vec![
    StatementRewriteAnomaly::EscapedSpecifier {
      specifier: "./\\u0061".to_string(),
    },
    StatementRewriteAnomaly::EmptySpecifier {
      statement: scan_js::span::Span(26, 36),
    },
  ]);
  assert_eq!(outcome.imports.len(), 1);
  assert_eq!(outcome.imports[0].specifier, "./b");
}

#[test]
fn suffix_goes_inside_whitespace_padded_quotes() {
  assert_eq!(
    rewrite_main("import { f } from \" ./util \";\n", &["out/util.mjs"]),
    "import { f } from \" ./util.mjs \";\n"
  );
}

#[test]
fn division_after_object_literal_does_not_block_rewrite() {
  let source = "import { f } from \"./util\";\nconst half = f() / 2;\nconst q = {n: 1} / 2;\n";
  assert_eq!(
    rewrite_main(source, &["out/util.mjs"]),
    "import { f } from \"./util.mjs\";\nconst half = f() / 2;\nconst q = {n: 1} / 2;\n"
  );
}

#[test]
fn unresolved_local_specifier_is_left_alone() {
  let rewriter = rewriter(&[]);
  let outcome = rewriter
    .rewrite_text(Path::new("out/main.mjs"), "import m from \"./missing\";")
    .unwrap();
  assert!(outcome.text.is_none());
  assert_eq!(outcome.imports[0].resolution, Resolution::Unresolved);
}

#[test]
fn parse_failure_names_the_file_and_leaves_it_untouched() {
  let rewriter = rewriter(&[("out/broken.mjs", "import a from \"./a\" oops"), ("out/a.mjs", "")]);
  let err = rewriter.rewrite(Path::new("out/broken.mjs")).unwrap_err();
  match &err {
    RewriteError::Parse(parse) => assert_eq!(parse.file, PathBuf::from("out/broken.mjs")),
    other => panic!("unexpected error {other:?}"),
  };
  assert!(err.to_string().starts_with("failed to parse out/broken.mjs: SC0006"));
  assert_eq!(rewriter.fs().writes.get(), 0);
}

#[test]
fn missing_module_is_a_file_system_error() {
  let err = rewriter(&[]).rewrite(Path::new("out/gone.mjs")).unwrap_err();
  assert!(matches!(err, RewriteError::FileSystem { .. }));
  assert!(err.to_string().starts_with("failed to read out/gone.mjs"));
}

#[test]
fn resolution_reports_candidate() {
  let fs = FakeFs::new(&[("out/x/index.mjs", "")]);
  assert_eq!(
    resolve(&fs, &esm(), Path::new("out"), "./x"),
    Resolution::Rewrite {
      specifier: "./x/index.mjs".to_string(),
      candidate: Candidate::DirectoryIndex,
    }
  );
  assert_eq!(
    resolve(&fs, &esm(), Path::new("out"), "/abs/x"),
    Resolution::NonLocal
  );
  assert_eq!(
    resolve(&fs, &esm(), Path::new("out"), "./x.mjs"),
    Resolution::AlreadyResolved
  );
}

#[test]
fn js_extension_output() {
  let rewriter = ImportRewriter::with_fs(
    FakeFs::new(&[("out/util.js", "")]),
    RewriteOptions::new(OutputExtension::Js),
  );
  let outcome = rewriter
    .rewrite_text(Path::new("out/main.js"), "export { f } from './util'")
    .unwrap();
  assert_eq!(outcome.text.as_deref(), Some("export { f } from './util.js'"));
}
