pub use error::FsOperation;
pub use error::ParseError;
pub use error::RewriteError;
pub use error::StatementRewriteAnomaly;
pub use fs::ModuleFs;
pub use fs::RealFs;
pub use options::OutputExtension;
pub use options::RewriteOptions;
pub use pass::rewrite_modules;
pub use pass::ModuleReport;
pub use pass::ModuleStatus;
pub use pass::RewriteReport;
pub use resolve::Candidate;
pub use resolve::Resolution;
pub use rewrite::ImportRewriter;
pub use rewrite::ResolvedImport;
pub use rewrite::RewriteOutcome;

pub mod error;
pub mod fs;
pub mod options;
pub mod pass;
pub mod resolve;
pub mod rewrite;
#[cfg(test)]
mod tests;
