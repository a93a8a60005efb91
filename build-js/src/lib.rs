pub use build::build;
pub use build::build_with;
pub use build::fix_imports;
pub use build::BuildReport;
pub use compile::CompileJob;
pub use compile::Compiler;
pub use compile::Esbuild;
pub use config::BuildConfig;
pub use config::ModuleFormat;
pub use discover::SourceTree;

pub mod build;
pub mod compile;
pub mod config;
pub mod discover;
pub mod report;
