//! CLI command handlers. Each command is in its own file.

mod bundle;
mod projects;
mod run;

pub use bundle::run_bundle;
pub use projects::run_projects;
pub use run::run_ingest;
