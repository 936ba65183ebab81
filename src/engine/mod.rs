//! Engine module: fingerprinting, persistence, evaluation, CLI plumbing.

pub mod arg_parser;
pub mod evaluator;
pub mod fingerprint;
pub mod handlers;
pub mod store;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::{Cli, Commands};
pub use evaluator::Evaluator;
pub use fingerprint::{Fingerprinter, digest_hex};
pub use handlers::handle_run;
pub use store::{IndexStore, StoreError};
pub use tools::{extension_of, mime_hint, path_to_db_string, relative_dir_of};
